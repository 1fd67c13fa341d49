//! Normalizes Square catalog items into the website's service view model,
//! grouped by category.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::config::SquareConfig;
use crate::error::{CatalogError, Result};
use crate::observability::metrics;
use crate::square::{CatalogObject, CatalogObjectKind, CatalogSource, ItemData};

use super::format::{extract_features, format_duration, format_price, slugify};
use super::{DEFAULT_SERVICE_DURATION_MS, UNCATEGORIZED};

/// Literal separator between an item's display description and its feature list.
const FEATURES_SEPARATOR: &str = "\n\nFeatures:";

const FALLBACK_BOOKING_BASE: &str = "https://n1nail.ca/book";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub duration: String,
    pub category: String,
    pub features: Vec<String>,
    pub booking_link: String,
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCategory {
    pub id: String,
    pub title: String,
    pub description: String,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalog {
    pub categories: Vec<ServiceCategory>,
    pub total: usize,
    pub last_updated: String,
}

struct CategoryInfo {
    name: String,
    description: String,
}

/// Fetches categories and items concurrently and produces the grouped
/// service catalog. A failure of either listing call fails the whole
/// request; per-item mapping failures only drop the offending item.
pub async fn build_service_catalog(
    source: &dyn CatalogSource,
    square: &SquareConfig,
) -> Result<ServiceCatalog> {
    let (category_objects, item_objects) = tokio::try_join!(
        source.list_objects(CatalogObjectKind::Category),
        source.list_objects(CatalogObjectKind::Item),
    )?;

    if item_objects.is_empty() {
        return Ok(ServiceCatalog {
            categories: Vec::new(),
            total: 0,
            last_updated: Utc::now().to_rfc3339(),
        });
    }

    let category_map = build_category_map(&category_objects);

    let mut services = Vec::new();
    for object in &item_objects {
        let CatalogObject::Item { id, item_data } = object else {
            continue;
        };
        match map_item(id, item_data.as_ref(), square) {
            Ok(service) => services.push(service),
            Err(e) => {
                warn!(record_id = %id, reason = %e, "dropping catalog item");
                metrics::catalog::record_dropped("item");
            }
        }
    }

    let total = services.len();
    let categories = group_by_category(services, &category_map);

    Ok(ServiceCatalog {
        categories,
        total,
        last_updated: Utc::now().to_rfc3339(),
    })
}

/// Maps category records to their display info. Records without a category
/// payload are skipped; items referencing them resolve to the unknown-
/// category fallback at grouping time.
fn build_category_map(objects: &[CatalogObject]) -> HashMap<String, CategoryInfo> {
    let mut map = HashMap::new();
    for object in objects {
        if let CatalogObject::Category {
            id,
            category_data: Some(data),
        } = object
        {
            map.insert(
                id.clone(),
                CategoryInfo {
                    name: data
                        .name
                        .clone()
                        .unwrap_or_else(|| "Untitled Category".to_string()),
                    description: data.description.clone().unwrap_or_default(),
                },
            );
        }
    }
    map
}

fn map_item(id: &str, item_data: Option<&ItemData>, square: &SquareConfig) -> Result<Service> {
    let data = item_data.ok_or_else(|| CatalogError::MissingField("item_data".to_string()))?;

    // Only the first variation is consulted; additional variations are ignored
    let variation = data
        .variations
        .first()
        .ok_or_else(|| CatalogError::MissingField("variations".to_string()))?;
    let variation_data = variation
        .item_variation_data
        .as_ref()
        .ok_or_else(|| CatalogError::MissingField("item_variation_data".to_string()))?;

    let price = variation_data
        .price_money
        .as_ref()
        .and_then(|money| money.amount)
        .unwrap_or(0);
    let duration = variation_data
        .service_duration
        .unwrap_or(DEFAULT_SERVICE_DURATION_MS);

    let full_description = data.description.clone().unwrap_or_default();
    let description = full_description
        .split(FEATURES_SEPARATOR)
        .next()
        .unwrap_or("")
        .to_string();
    let features = extract_features(&full_description);

    let title = data.name.clone().unwrap_or_default();
    let slug = slugify(&title);

    let category = data
        .categories
        .first()
        .map(|reference| reference.id().to_string())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let booking_link = match (&square.merchant_id, &square.location_id) {
        (Some(merchant), Some(location)) => format!(
            "https://book.squareup.com/appointments/{merchant}/location/{location}/services/{id}"
        ),
        _ => format!("{FALLBACK_BOOKING_BASE}?service={slug}"),
    };

    Ok(Service {
        id: slug,
        title,
        description,
        price: format_price(price),
        duration: format_duration(duration),
        category,
        features,
        booking_link,
        source_id: id.to_string(),
    })
}

/// Groups services by their raw category id, preserving first-seen order,
/// and resolves display names from the category map.
fn group_by_category(
    services: Vec<Service>,
    category_map: &HashMap<String, CategoryInfo>,
) -> Vec<ServiceCategory> {
    let mut categories: Vec<ServiceCategory> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for service in services {
        let slot = match index.get(&service.category) {
            Some(&slot) => slot,
            None => {
                let info = category_map.get(&service.category);
                categories.push(ServiceCategory {
                    id: service.category.clone(),
                    title: info
                        .map(|i| i.name.clone())
                        .unwrap_or_else(|| "Unknown Category".to_string()),
                    description: info.map(|i| i.description.clone()).unwrap_or_default(),
                    services: Vec::new(),
                });
                let slot = categories.len() - 1;
                index.insert(service.category.clone(), slot);
                slot
            }
        };
        categories[slot].services.push(service);
    }

    categories
}
