//! Extract the firmware catalog and form results from raw HTML.
//!
//! The scrape source embeds its whole catalog as JSON inside a tag
//! attribute and answers form submissions with a page carrying the signed
//! URL in another attribute. Both extractors fail soft: a missing element
//! or malformed payload yields an empty result, never an error.

use std::collections::HashMap;

use scraper::{Html, Selector};
use serde_json::Value;

/// Region label → versions, most relevant first.
pub type RegionVersions = HashMap<String, Vec<String>>;

/// Device label → region table.
pub type FirmwareCatalog = HashMap<String, RegionVersions>;

/// Element carrying the embedded catalog JSON.
pub const CATALOG_SELECTOR: &str = "[data-devices]";
pub const CATALOG_ATTR: &str = "data-devices";

/// Element carrying the signed download URL on the result page.
pub const RESULT_SELECTOR: &str = "#resultBox";
pub const RESULT_ATTR: &str = "data-url";

/// Recover the device → region → versions table from the landing page.
pub fn extract_catalog(html: &str) -> FirmwareCatalog {
    let Some(raw) = first_attr(html, CATALOG_SELECTOR, CATALOG_ATTR) else {
        tracing::debug!("No {CATALOG_ATTR} attribute on landing page");
        return FirmwareCatalog::new();
    };

    let devices = match serde_json::from_str::<HashMap<String, Value>>(&raw) {
        Ok(devices) => devices,
        Err(e) => {
            tracing::warn!("Embedded catalog is not valid JSON: {e}");
            return FirmwareCatalog::new();
        }
    };

    devices
        .into_iter()
        .filter_map(|(label, regions)| {
            let regions = region_table(&label, regions);
            (!regions.is_empty()).then_some((label, regions))
        })
        .collect()
}

/// Convert one device's region table, dropping regions that are not a
/// list of strings. Odd entries only cost the device/region they belong to.
fn region_table(label: &str, regions: Value) -> RegionVersions {
    let Value::Object(regions) = regions else {
        tracing::debug!("Catalog entry {label:?} is not a region table");
        return RegionVersions::new();
    };

    regions
        .into_iter()
        .filter_map(|(region, versions)| {
            match serde_json::from_value::<Vec<String>>(versions) {
                Ok(versions) => Some((region, versions)),
                Err(e) => {
                    tracing::debug!("Skipping {label:?} {region}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Pull the download URL out of the form-submission response.
///
/// Attribute values come back entity-decoded by the HTML parser, so
/// `a=1&amp;b=2` in the markup is returned as `a=1&b=2`.
pub fn extract_result_url(html: &str) -> Option<String> {
    first_attr(html, RESULT_SELECTOR, RESULT_ATTR)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

fn first_attr(html: &str, selector: &str, attr: &str) -> Option<String> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return None,
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .find_map(|el| el.value().attr(attr))
        .map(str::to_string)
}
