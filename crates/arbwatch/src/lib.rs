//! arbwatch — locate firmware builds for a fixed device catalog and keep
//! per-device/region anti-rollback (ARB) history ledgers.

pub mod analysis;
pub mod catalog;
pub mod devices;
pub mod http;
pub mod ini;
pub mod ledger;
pub mod locator;
pub mod matcher;
pub mod matrix;
pub mod reconcile;
pub mod types;

pub use analysis::AnalysisReport;
pub use catalog::{extract_catalog, extract_result_url, FirmwareCatalog};
pub use devices::{normalize_device_id, DeviceCatalog};
pub use http::HttpSession;
pub use ledger::UpdateOutcome;
pub use locator::{ApiSource, FallbackLocator, FirmwareSource, LocatorConfig, ScrapeSource};
pub use reconcile::Reconciler;
pub use types::*;
