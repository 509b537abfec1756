//! Daily sales roll-up over purchase events.

use crate::error::RecResult;
use crate::models::{PurchaseRow, SalesSummary, UserId};
use crate::services::store::SalesStore;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

#[derive(Default)]
struct DayTotals {
    total_sales: f64,
    customers: HashSet<UserId>,
    products_sold: i64,
}

/// Groups purchases by calendar date, earliest date first.
pub fn summarize_sales(purchases: &[PurchaseRow]) -> Vec<SalesSummary> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

    for purchase in purchases {
        let day = days.entry(purchase.sale_date).or_default();
        day.total_sales += purchase.price;
        day.customers.insert(purchase.user_id);
        day.products_sold += 1;
    }

    days.into_iter()
        .map(|(sale_date, day)| SalesSummary {
            sale_date,
            total_sales: day.total_sales,
            unique_customers: day.customers.len() as i64,
            total_products_sold: day.products_sold,
        })
        .collect()
}

/// Extracts purchases, rolls them up and upserts the result.
/// Returns the number of days written.
pub async fn run_etl(store: &dyn SalesStore) -> RecResult<usize> {
    let purchases = store.purchases().await?;
    if purchases.is_empty() {
        info!("No new purchase data to process.");
        return Ok(0);
    }

    let summaries = summarize_sales(&purchases);
    store.upsert_sales_summaries(&summaries).await?;

    info!(
        "Loaded {} rows into sales_summary from {} purchases",
        summaries.len(),
        purchases.len()
    );
    Ok(summaries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, Interaction, Product, ProductId};
    use crate::services::store::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn row(day: u32, price: f64, user: i64) -> PurchaseRow {
        PurchaseRow {
            sale_date: date(day),
            price,
            user_id: UserId(user),
        }
    }

    #[test]
    fn test_summarize_groups_by_day() {
        let summaries = summarize_sales(&[
            row(2, 10.0, 1),
            row(1, 5.5, 1),
            row(2, 20.0, 2),
            row(2, 1.0, 1),
        ]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].sale_date, date(1));
        assert_eq!(summaries[0].total_products_sold, 1);

        let busy = &summaries[1];
        assert_eq!(busy.sale_date, date(2));
        assert!((busy.total_sales - 31.0).abs() < 1e-9);
        assert_eq!(busy.unique_customers, 2);
        assert_eq!(busy.total_products_sold, 3);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize_sales(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_run_etl_without_purchases_writes_nothing() {
        let store = InMemoryStore::new();
        assert_eq!(run_etl(&store).await.unwrap(), 0);
        assert!(store.sales_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_etl_is_idempotent() {
        let at = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();
        let store = InMemoryStore::with_data(
            vec![Product::new(ProductId(1), "Kettle", "Kitchen", 40.0)],
            vec![
                Interaction::new(UserId(1), ProductId(1), EventType::Purchase).at(at),
                Interaction::new(UserId(2), ProductId(1), EventType::Purchase).at(at),
                Interaction::new(UserId(2), ProductId(1), EventType::View).at(at),
            ],
        );

        assert_eq!(run_etl(&store).await.unwrap(), 1);
        assert_eq!(run_etl(&store).await.unwrap(), 1);

        let stored = store.sales_summaries().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].sale_date, date(3));
        assert_eq!(stored[0].total_sales, 80.0);
        assert_eq!(stored[0].unique_customers, 2);
    }
}
