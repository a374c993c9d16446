//! Device metadata and upstream id translation tables.
//!
//! Components never read these tables from ambient state; a
//! [`DeviceCatalog`] is built once (built-in or from a JSON file) and passed
//! to the locator and reconciler.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{TrackerError, TrackerResult};

/// Model number used when a device/region has no known model.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Brand used for API ids that carry no `brand_` prefix.
pub const DEFAULT_BRAND: &str = "oneplus";

/// Region → model number for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionModel {
    pub region: String,
    pub model: String,
}

/// Static metadata for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
    pub models: Vec<RegionModel>,
}

/// Read-only device metadata plus upstream naming tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCatalog {
    pub devices: Vec<DeviceEntry>,
    /// Internal short id → API device id.
    #[serde(default)]
    pub api_ids: BTreeMap<String, String>,
    /// API device id → label used by the scrape source's catalog.
    #[serde(default)]
    pub scrape_labels: BTreeMap<String, String>,
}

impl DeviceCatalog {
    /// Load a catalog from a JSON file with the same shape as the built-in one.
    pub fn from_file(path: &Path) -> TrackerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&raw)?;
        if catalog.devices.is_empty() {
            return Err(TrackerError::InvalidInput(format!(
                "device catalog {} lists no devices",
                path.display()
            )));
        }
        Ok(catalog)
    }

    pub fn device(&self, device_id: &str) -> Option<&DeviceEntry> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    /// Human-readable name, falling back to `OnePlus {id}`.
    pub fn display_name(&self, device_id: &str) -> String {
        self.device(device_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("OnePlus {device_id}"))
    }

    /// Model number for a device/region, or [`UNKNOWN_MODEL`].
    pub fn model_number(&self, device_id: &str, region: &str) -> String {
        self.device(device_id)
            .and_then(|d| d.models.iter().find(|m| m.region == region))
            .map(|m| m.model.clone())
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string())
    }

    /// API device id. Unmapped ids pass through unchanged.
    pub fn api_id(&self, device_id: &str) -> String {
        self.api_ids
            .get(device_id)
            .cloned()
            .unwrap_or_else(|| device_id.to_string())
    }

    /// Label the scrape source uses for this device.
    pub fn scrape_label(&self, device_id: &str) -> String {
        self.scrape_labels
            .get(&self.api_id(device_id))
            .cloned()
            .unwrap_or_else(|| format!("OP {}", device_id.to_uppercase()))
    }

    /// Every (device_id, region) pair, in catalog order.
    pub fn targets(&self) -> Vec<(&str, &str)> {
        self.devices
            .iter()
            .flat_map(|d| d.models.iter().map(move |m| (d.id.as_str(), m.region.as_str())))
            .collect()
    }

    /// The built-in device table.
    pub fn builtin() -> Self {
        let devices = BUILTIN_DEVICES
            .iter()
            .map(|(id, name, models)| DeviceEntry {
                id: id.to_string(),
                name: name.to_string(),
                models: models
                    .iter()
                    .map(|(region, model)| RegionModel {
                        region: region.to_string(),
                        model: model.to_string(),
                    })
                    .collect(),
            })
            .collect();

        let pairs = |table: &[(&str, &str)]| {
            table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            devices,
            api_ids: pairs(BUILTIN_API_IDS),
            scrape_labels: pairs(BUILTIN_SCRAPE_LABELS),
        }
    }
}

/// Brand segment of an API device id (`oppo_find_x8` → `oppo`).
pub fn api_brand(api_id: &str) -> &str {
    match api_id.split_once('_') {
        Some((brand, _)) if !brand.is_empty() => brand,
        _ => DEFAULT_BRAND,
    }
}

/// Accept `oneplus_15` as well as `15`.
pub fn normalize_device_id(raw: &str) -> &str {
    raw.strip_prefix("oneplus_").unwrap_or(raw)
}

type DeviceRow = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

#[rustfmt::skip]
const BUILTIN_DEVICES: &[DeviceRow] = &[
    ("15", "OnePlus 15", &[("GLO", "CPH2747"), ("EU", "CPH2747"), ("IN", "CPH2745"), ("CN", "PLK110")]),
    ("15R", "OnePlus 15R", &[("GLO", "CPH2741"), ("EU", "CPH2741"), ("IN", "CPH2741")]),
    ("13", "OnePlus 13", &[("GLO", "CPH2649"), ("EU", "CPH2649"), ("IN", "CPH2649"), ("CN", "PJZ110")]),
    ("12", "OnePlus 12", &[("GLO", "CPH2573"), ("EU", "CPH2573"), ("IN", "CPH2573"), ("CN", "PJD110")]),
    ("12R", "OnePlus 12R", &[("GLO", "CPH2585"), ("EU", "CPH2609"), ("IN", "CPH2585")]),
    ("11", "OnePlus 11", &[("GLO", "CPH2449"), ("EU", "CPH2449"), ("IN", "CPH2447")]),
    ("11R", "OnePlus 11R", &[("IN", "CPH2487")]),
    ("10 Pro", "OnePlus 10 Pro", &[("GLO", "NE2215"), ("EU", "NE2213"), ("IN", "NE2211"), ("CN", "NE2210")]),
    ("10T", "OnePlus 10T", &[("GLO", "CPH2417"), ("EU", "CPH2415"), ("IN", "CPH2413")]),
    ("10R", "OnePlus 10R", &[("IN", "CPH2423")]),
    ("9 Pro", "OnePlus 9 Pro", &[("NA", "LE2125"), ("EU", "LE2123"), ("IN", "LE2121")]),
    ("9", "OnePlus 9", &[("NA", "LE2115"), ("EU", "LE2113"), ("IN", "LE2111")]),
    ("9RT", "OnePlus 9RT", &[("IN", "MT2111")]),
    ("9R", "OnePlus 9R", &[("IN", "LE2101")]),
    ("Ace 6T", "OnePlus Ace 6T", &[("CN", "PLR110")]),
    ("Ace 5", "OnePlus Ace 5", &[("CN", UNKNOWN_MODEL)]),
    ("Ace 5 Pro", "OnePlus Ace 5 Pro", &[("CN", UNKNOWN_MODEL)]),
    ("Ace 5 Ultimate", "OnePlus Ace 5 Ultimate", &[("CN", UNKNOWN_MODEL)]),
    ("Pad 2 Pro", "OnePlus Pad 2 Pro", &[("CN", UNKNOWN_MODEL)]),
    ("Pad 3", "OnePlus Pad 3", &[("GLO", UNKNOWN_MODEL), ("EU", UNKNOWN_MODEL), ("IN", UNKNOWN_MODEL)]),
    ("Pad 2", "OnePlus Pad 2", &[("GLO", UNKNOWN_MODEL), ("EU", UNKNOWN_MODEL), ("IN", UNKNOWN_MODEL)]),
    ("Find X8", "Oppo Find X8", &[("CN", UNKNOWN_MODEL), ("IN", UNKNOWN_MODEL)]),
    ("Find X8 Pro", "Oppo Find X8 Pro", &[("CN", UNKNOWN_MODEL), ("EU", UNKNOWN_MODEL), ("IN", UNKNOWN_MODEL)]),
    ("Find X8 Ultra", "Oppo Find X8 Ultra", &[("CN", UNKNOWN_MODEL)]),
    ("Find N3", "Oppo Find N3", &[("ID", "CPH2499"), ("IN", UNKNOWN_MODEL), ("MY", UNKNOWN_MODEL)]),
];

const BUILTIN_API_IDS: &[(&str, &str)] = &[
    ("15", "oneplus_15"),
    ("15R", "oneplus_15r"),
    ("13", "oneplus_13"),
    ("12", "oneplus_12"),
    ("12R", "oneplus_12r"),
    ("11", "oneplus_11"),
    ("11R", "oneplus_11r"),
    ("10 Pro", "oneplus_10_pro"),
    ("10T", "oneplus_10t"),
    ("10R", "oneplus_10r_80w"),
    ("9 Pro", "oneplus_9_pro"),
    ("9", "oneplus_9"),
    ("9RT", "oneplus_9rt"),
    ("9R", "oneplus_9r"),
    ("Ace 6T", "oneplus_ace_6t"),
    ("Ace 5", "oneplus_ace_5"),
    ("Ace 5 Pro", "oneplus_ace_5_pro"),
    ("Ace 5 Ultimate", "oneplus_ace_5_ultimate"),
    ("Pad 2 Pro", "oneplus_pad2_pro"),
    ("Pad 3", "oneplus_pad_3"),
    ("Pad 2", "oneplus_pad_2"),
    ("Find X8", "oppo_find_x8"),
    ("Find X8 Pro", "oppo_find_x8_pro"),
    ("Find X8 Ultra", "oppo_find_x8_ultra"),
    ("Find N3", "oppo_find_n3"),
];

const BUILTIN_SCRAPE_LABELS: &[(&str, &str)] = &[
    ("oneplus_15", "OP 15"),
    ("oneplus_15r", "OP 15R"),
    ("oneplus_11", "OP 11"),
    ("oneplus_11r", "OP 11R"),
    ("oneplus_10_pro", "OP 10 PRO"),
    ("oneplus_13", "OP 13"),
    ("oneplus_12", "OP 12"),
    ("oneplus_12r", "OP ACE 3"),
    ("oneplus_ace_6t", "OP ACE 6T"),
    ("oneplus_ace_5", "OP ACE 5"),
    ("oneplus_ace_5_pro", "OP ACE 5 PRO"),
    ("oneplus_ace_5_ultimate", "OP ACE 5 ULTRA"),
    ("oneplus_pad2_pro", "OP PAD2 PRO"),
    ("oneplus_pad_3", "OP PAD3"),
    ("oneplus_pad_2", "OP PAD2"),
    ("oppo_find_x8", "OPPO FIND X8"),
    ("oppo_find_x8_pro", "OPPO FIND X8 PRO"),
    ("oppo_find_x8_ultra", "OPPO FIND X8 ULTRA"),
];
