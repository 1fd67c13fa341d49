pub mod format;
pub mod memberships;
pub mod services;

/// Sentinel category id for items with no category assignment.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Square omits `service_duration` on some variations; default to one hour.
pub const DEFAULT_SERVICE_DURATION_MS: i64 = 3_600_000;

pub use memberships::{build_membership_catalog, Membership, MembershipCatalog};
pub use services::{build_service_catalog, Service, ServiceCatalog, ServiceCategory};
