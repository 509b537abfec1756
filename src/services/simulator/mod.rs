//! Synthetic catalog, users and interaction history for local runs.

use crate::config::SimulatorConfig;
use crate::error::RecResult;
use crate::models::*;
use crate::utils::days_before;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashSet;

const ADJECTIVES: &[&str] = &[
    "scalable", "seamless", "dynamic", "robust", "integrated", "proactive", "virtual", "strategic",
    "holistic", "agile", "smart", "compact", "modular", "premium", "wireless",
];
const NOUNS: &[&str] = &[
    "solutions", "platforms", "widgets", "systems", "networks", "devices", "kits", "bundles",
    "gadgets", "tools", "organizers", "speakers", "lamps", "chargers", "bottles",
];
const CATEGORIES: &[&str] = &[
    "electronics", "home", "garden", "kitchen", "sports", "toys", "books", "beauty", "office",
    "outdoors",
];
const COUNTRIES: &[&str] = &[
    "United States", "Canada", "Germany", "France", "India", "Brazil", "Japan", "Australia",
    "Nigeria", "Mexico",
];
const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Event mix of the generated log: mostly views, few purchases.
const EVENT_WEIGHTS: [(EventType, u32); 3] = [
    (EventType::View, 6),
    (EventType::AddToCart, 3),
    (EventType::Purchase, 1),
];

pub fn rng_from(config: &SimulatorConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

pub fn generate_products<R: Rng>(rng: &mut R, count: usize) -> Vec<NewProduct> {
    (0..count)
        .map(|_| {
            let name = [pick(rng, ADJECTIVES), pick(rng, ADJECTIVES), pick(rng, NOUNS)]
                .iter()
                .map(|w| title_case(w))
                .collect::<Vec<_>>()
                .join(" ");
            let price: f64 = rng.gen_range(10.0..=500.0);
            NewProduct {
                name,
                category: title_case(pick(rng, CATEGORIES)),
                price: (price * 100.0).round() / 100.0,
            }
        })
        .collect()
}

pub fn generate_users<R: Rng>(rng: &mut R, count: usize) -> Vec<NewUser> {
    let mut seen = HashSet::new();
    let mut users = Vec::with_capacity(count);

    while users.len() < count {
        let email = format!(
            "{}.{}{}@{}",
            pick(rng, ADJECTIVES),
            pick(rng, NOUNS),
            rng.gen_range(0..100_000),
            pick(rng, DOMAINS)
        );
        if !seen.insert(email.clone()) {
            continue;
        }
        users.push(NewUser {
            email,
            age: rng.gen_range(18..=65),
            country: pick(rng, COUNTRIES).to_string(),
        });
    }

    users
}

/// Random interactions spread over the `history_days` before `now`.
/// Empty when either id list is empty. Fails when `history_days` reaches
/// outside chrono's range.
pub fn generate_interactions<R: Rng>(
    rng: &mut R,
    user_ids: &[UserId],
    product_ids: &[ProductId],
    count: usize,
    history_days: i64,
    now: DateTime<Utc>,
) -> RecResult<Vec<Interaction>> {
    let history_days = history_days.max(0);
    let start = days_before(now, history_days)?;
    if user_ids.is_empty() || product_ids.is_empty() {
        return Ok(Vec::new());
    }

    let events = match WeightedIndex::new(EVENT_WEIGHTS.iter().map(|(_, w)| *w)) {
        Ok(events) => events,
        Err(_) => return Ok(Vec::new()),
    };
    let span = (now - start).num_seconds();

    Ok((0..count)
        .filter_map(|_| {
            let user_id = *user_ids.choose(rng)?;
            let product_id = *product_ids.choose(rng)?;
            let (event_type, _) = EVENT_WEIGHTS[events.sample(rng)];
            let offset = rng.gen_range(0..=span);
            Some(Interaction {
                user_id,
                product_id,
                event_type,
                timestamp: start + Duration::seconds(offset),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_products_are_well_formed() {
        let products = generate_products(&mut seeded(), 50);
        assert_eq!(products.len(), 50);
        for product in &products {
            assert!((10.0..=500.0).contains(&product.price));
            let cents = product.price * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
            assert!(product.name.chars().next().unwrap().is_uppercase());
            assert!(!product.category.is_empty());
        }
    }

    #[test]
    fn test_user_emails_are_unique() {
        let users = generate_users(&mut seeded(), 100);
        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 100);
        assert!(users.iter().all(|u| (18..=65).contains(&u.age)));
    }

    #[test]
    fn test_interactions_stay_in_window() {
        let now = Utc::now();
        let users: Vec<UserId> = (1..=10).map(UserId).collect();
        let products: Vec<ProductId> = (1..=5).map(ProductId).collect();
        let log = generate_interactions(&mut seeded(), &users, &products, 1000, 90, now).unwrap();

        assert_eq!(log.len(), 1000);
        for interaction in &log {
            assert!(interaction.timestamp <= now);
            assert!(interaction.timestamp >= now - Duration::days(90));
            assert!(users.contains(&interaction.user_id));
        }

        let views = log.iter().filter(|i| i.event_type == EventType::View).count();
        let purchases = log.iter().filter(|i| i.event_type == EventType::Purchase).count();
        assert!(views > purchases);
    }

    #[test]
    fn test_same_seed_same_data() {
        let now = Utc::now();
        let users = vec![UserId(1), UserId(2)];
        let products = vec![ProductId(1), ProductId(2)];
        let a = generate_interactions(&mut seeded(), &users, &products, 20, 30, now).unwrap();
        let b = generate_interactions(&mut seeded(), &users, &products, 20, 30, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_ids_no_interactions() {
        let log = generate_interactions(&mut seeded(), &[], &[ProductId(1)], 10, 90, Utc::now()).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_history_out_of_range_is_rejected() {
        let result = generate_interactions(&mut seeded(), &[UserId(1)], &[ProductId(1)], 10, i64::MAX, Utc::now());
        assert!(matches!(result, Err(crate::error::RecError::Config(_))));
    }
}
