//! Normalizes Square subscription plans into the website's membership view
//! model, sorted by price.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::observability::metrics;
use crate::square::{CatalogObject, CatalogObjectKind, CatalogSource, SubscriptionPlanData};

use super::format::{extract_benefits, format_price, slugify};

/// Plan names like "Gold Membership" render as just "Gold".
const MEMBERSHIP_SUFFIX: &str = " Membership";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub title: String,
    pub yearly_price: String,
    pub benefits: Vec<String>,
    pub source_id: String,
    pub subscription_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipCatalog {
    pub memberships: Vec<Membership>,
    pub total: usize,
    pub last_updated: String,
}

/// Fetches subscription plans and produces the membership catalog. Per-plan
/// mapping failures drop the offending record only.
pub async fn build_membership_catalog(source: &dyn CatalogSource) -> Result<MembershipCatalog> {
    let plan_objects = source
        .list_objects(CatalogObjectKind::SubscriptionPlan)
        .await?;

    if plan_objects.is_empty() {
        return Ok(MembershipCatalog {
            memberships: Vec::new(),
            total: 0,
            last_updated: Utc::now().to_rfc3339(),
        });
    }

    let mut memberships = Vec::new();
    for object in &plan_objects {
        let CatalogObject::SubscriptionPlan {
            id,
            subscription_plan_data,
        } = object
        else {
            continue;
        };
        match map_plan(id, subscription_plan_data.as_ref()) {
            Ok(membership) => memberships.push(membership),
            Err(e) => {
                warn!(record_id = %id, reason = %e, "dropping subscription plan");
                metrics::catalog::record_dropped("subscription_plan");
            }
        }
    }

    // Ascending by price; "Free" parses to 0 and sorts first
    memberships.sort_by_key(|membership| price_value(&membership.yearly_price));

    let total = memberships.len();
    Ok(MembershipCatalog {
        memberships,
        total,
        last_updated: Utc::now().to_rfc3339(),
    })
}

fn map_plan(id: &str, plan_data: Option<&SubscriptionPlanData>) -> Result<Membership> {
    let data =
        plan_data.ok_or_else(|| CatalogError::MissingField("subscription_plan_data".to_string()))?;

    // Only the first phase is consulted, like the first item variation.
    let phase = data
        .subscription_phases
        .first()
        .ok_or_else(|| CatalogError::MissingField("subscription_phases".to_string()))?;
    let amount = phase
        .recurring_price_money
        .as_ref()
        .and_then(|money| money.amount)
        .unwrap_or(0);

    let name = data.name.clone().unwrap_or_default();
    let title = name.strip_suffix(MEMBERSHIP_SUFFIX).unwrap_or(&name).to_string();
    let benefits = extract_benefits(data.description.as_deref().unwrap_or(""));

    Ok(Membership {
        id: slugify(&title),
        title,
        yearly_price: format_price(amount),
        benefits,
        source_id: id.to_string(),
        subscription_url: format!(
            "https://squareup.com/dashboard/subscriptions/plans/{id}/subscribe"
        ),
    })
}

/// Numeric value of a formatted price, for sorting. Strips everything that
/// is not a digit; "Free" yields 0.
fn price_value(price: &str) -> i64 {
    let digits: String = price.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
