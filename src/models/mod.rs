use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    AddToCart,
    Purchase,
}

impl EventType {
    /// Fixed affinity weight of a single event.
    pub fn weight(self) -> u32 {
        match self {
            EventType::View => 1,
            EventType::AddToCart => 2,
            EventType::Purchase => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::View => "view",
            EventType::AddToCart => "add_to_cart",
            EventType::Purchase => "purchase",
        }
    }
}

impl FromStr for EventType {
    type Err = RecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EventType::View),
            "add_to_cart" => Ok(EventType::AddToCart),
            "purchase" => Ok(EventType::Purchase),
            other => Err(RecError::DataUnavailable(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
}

/// Catalog record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Personalized,
    Popularity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub user_id: UserId,
    pub source: RecommendationSource,
    pub products: Vec<Product>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.product_id).collect()
    }
}

/// One purchase joined with the price of the purchased product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRow {
    pub sale_date: NaiveDate,
    pub price: f64,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sale_date: NaiveDate,
    pub total_sales: f64,
    pub unique_customers: i64,
    pub total_products_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub age: i32,
    pub country: String,
}

impl Interaction {
    pub fn new(user_id: UserId, product_id: ProductId, event_type: EventType) -> Self {
        Self {
            user_id,
            product_id,
            event_type,
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Product {
    pub fn new(product_id: ProductId, name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            product_id,
            name: name.into(),
            category: category.into(),
            price,
        }
    }
}
