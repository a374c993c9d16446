//! Extract recent builds from the upstream INI history dump.
//!
//! Sections look like `[OP 15 CN]`; inside a section, each `url=` line is
//! paired with the `version=` line that follows it.

use regex::Regex;
use serde::Serialize;

use crate::devices::DeviceCatalog;

pub const DEFAULT_MAX_VERSIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IniBuild {
    pub version: String,
    pub url: String,
}

/// Section header used for a device/region, e.g. `OP 15 CN`.
pub fn ini_section_name(catalog: &DeviceCatalog, device_id: &str, region: &str) -> String {
    format!("{} {}", catalog.scrape_label(device_id), region)
}

/// Collect up to `max_versions` distinct builds from one section, in file order.
pub fn parse_ini_section(content: &str, section: &str, max_versions: usize) -> Vec<IniBuild> {
    let Ok(header) = Regex::new(&format!(r"(?im)^\[{}\]", regex::escape(section))) else {
        return Vec::new();
    };
    let Some(found) = header.find(content) else {
        return Vec::new();
    };

    let rest = &content[found.end()..];
    let block = match Regex::new(r"(?m)^\[").ok().and_then(|re| re.find(rest)) {
        Some(next) => &rest[..next.start()],
        None => rest,
    };

    let Ok(pair) = Regex::new(r"(?m)^(\w+)=(.*)$") else {
        return Vec::new();
    };

    let mut builds: Vec<IniBuild> = Vec::new();
    let mut pending_url: Option<String> = None;
    for caps in pair.captures_iter(block) {
        let value = caps[2].trim();
        match caps[1].to_ascii_lowercase().as_str() {
            "url" => pending_url = Some(value.to_string()),
            "version" => {
                let Some(url) = pending_url.take() else {
                    continue;
                };
                if value.is_empty() || url.is_empty() {
                    continue;
                }
                if builds.iter().all(|b| b.version != value) {
                    builds.push(IniBuild {
                        version: value.to_string(),
                        url,
                    });
                }
                if builds.len() >= max_versions {
                    break;
                }
            }
            _ => {}
        }
    }
    builds
}
