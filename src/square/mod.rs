pub mod client;
pub mod types;

pub use client::{CatalogSource, SquareCatalogClient};
pub use types::{
    CatalogObject, CatalogObjectKind, CategoryData, CategoryRef, ItemData, ItemVariation,
    ItemVariationData, Money, SubscriptionPhase, SubscriptionPlanData,
};
