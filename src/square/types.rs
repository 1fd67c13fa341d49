//! Typed model of the Square catalog records this service consumes.
//!
//! The Square list endpoint returns loosely shaped JSON. Records are narrowed
//! into these tagged variants once, at the adapter boundary; everything
//! downstream works on the typed shape and never re-inspects raw JSON.

use serde::Deserialize;

/// The catalog object types we request from the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogObjectKind {
    Category,
    Item,
    SubscriptionPlan,
}

impl CatalogObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogObjectKind::Category => "CATEGORY",
            CatalogObjectKind::Item => "ITEM",
            CatalogObjectKind::SubscriptionPlan => "SUBSCRIPTION_PLAN",
        }
    }
}

/// A single catalog record, keyed on Square's `type` discriminator.
/// Payloads are optional because Square may return a bare envelope; mapping
/// code treats a missing payload as a droppable record, not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogObject {
    #[serde(rename = "ITEM")]
    Item {
        id: String,
        item_data: Option<ItemData>,
    },
    #[serde(rename = "CATEGORY")]
    Category {
        id: String,
        category_data: Option<CategoryData>,
    },
    #[serde(rename = "SUBSCRIPTION_PLAN")]
    SubscriptionPlan {
        id: String,
        subscription_plan_data: Option<SubscriptionPlanData>,
    },
}

impl CatalogObject {
    pub fn id(&self) -> &str {
        match self {
            CatalogObject::Item { id, .. } => id,
            CatalogObject::Category { id, .. } => id,
            CatalogObject::SubscriptionPlan { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub variations: Vec<ItemVariation>,
}

/// Square has shipped category assignments both as bare id strings and as
/// objects carrying an `id` field; accept either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Object { id: String },
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Id(id) => id,
            CategoryRef::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemVariation {
    pub item_variation_data: Option<ItemVariationData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemVariationData {
    pub price_money: Option<Money>,
    /// Service duration in milliseconds.
    pub service_duration: Option<i64>,
}

/// Square money amounts are integer minor currency units (cents).
#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryData {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionPlanData {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub subscription_phases: Vec<SubscriptionPhase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionPhase {
    pub recurring_price_money: Option<Money>,
}
