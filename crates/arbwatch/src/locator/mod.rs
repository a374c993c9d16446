//! Firmware location across heterogeneous upstream sources.
//!
//! Each upstream is a [`FirmwareSource`]. Sources never raise: every network,
//! validation or lookup failure is logged and reported as `None`, so a
//! [`FallbackLocator`] can walk its sources uniformly. Source ordering and
//! the version-pinning short-circuit live only in the fallback composition.

pub mod api;
pub mod scrape;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::devices::DeviceCatalog;
use crate::http::DEFAULT_USER_AGENT;
use crate::types::FirmwareDescriptor;

pub use api::ApiSource;
pub use scrape::ScrapeSource;

pub const DEFAULT_API_BASE: &str = "https://oosdownloader-gui.fly.dev/api";
pub const DEFAULT_SCRAPE_URL: &str = "https://roms.danielspringer.at/index.php?view=ota";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and client settings shared by both sources.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub api_base: String,
    pub scrape_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            scrape_url: DEFAULT_SCRAPE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Something that can turn (device, region[, version]) into a download.
#[async_trait]
pub trait FirmwareSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the source can serve a specific historical version.
    fn supports_target_version(&self) -> bool;

    /// Resolve a firmware descriptor, or `None` on any failure.
    async fn resolve(
        &self,
        device_id: &str,
        region: &str,
        target_version: Option<&str>,
    ) -> Option<FirmwareDescriptor>;
}

/// Ordered composition of sources: first success wins.
///
/// When a target version is requested, sources that cannot pin a version
/// are skipped without being contacted.
pub struct FallbackLocator {
    sources: Vec<Box<dyn FirmwareSource>>,
}

impl FallbackLocator {
    pub fn new(sources: Vec<Box<dyn FirmwareSource>>) -> Self {
        Self { sources }
    }

    /// API first, scrape second.
    pub fn standard(config: &LocatorConfig, catalog: Arc<DeviceCatalog>) -> Self {
        Self::new(vec![
            Box::new(ApiSource::new(config.clone(), Arc::clone(&catalog))),
            Box::new(ScrapeSource::new(config.clone(), catalog)),
        ])
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(
        &self,
        device_id: &str,
        region: &str,
        target_version: Option<&str>,
    ) -> Option<FirmwareDescriptor> {
        for source in &self.sources {
            if target_version.is_some() && !source.supports_target_version() {
                tracing::debug!("Skipping {} source: cannot pin a version", source.name());
                continue;
            }

            if let Some(found) = source.resolve(device_id, region, target_version).await {
                tracing::info!(
                    "Resolved {device_id} {region} via {}: {}",
                    source.name(),
                    found.version
                );
                return Some(found);
            }
            tracing::info!("{} source found nothing for {device_id} {region}", source.name());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        pins: bool,
        answer: Option<FirmwareDescriptor>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FirmwareSource for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn supports_target_version(&self) -> bool {
            self.pins
        }
        async fn resolve(
            &self,
            _device_id: &str,
            _region: &str,
            _target_version: Option<&str>,
        ) -> Option<FirmwareDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn descriptor(url: &str, version: &str) -> FirmwareDescriptor {
        FirmwareDescriptor {
            url: url.to_string(),
            version: version.to_string(),
        }
    }

    fn fixed(
        name: &'static str,
        pins: bool,
        answer: Option<FirmwareDescriptor>,
    ) -> (Box<dyn FirmwareSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Fixed {
            name,
            pins,
            answer,
            calls: Arc::clone(&calls),
        };
        (Box::new(source), calls)
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (api, api_calls) = fixed("api", false, Some(descriptor("https://a/fw.zip", "A")));
        let scraped = descriptor("https://s/fw.zip", "S");
        let (scrape, scrape_calls) = fixed("scrape", true, Some(scraped));
        let locator = FallbackLocator::new(vec![api, scrape]);

        let found = locator.resolve("15", "GLO", None).await.unwrap();
        assert_eq!(found.version, "A");
        assert_eq!(api_calls.load(Ordering::SeqCst), 1);
        assert_eq!(scrape_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let (api, _) = fixed("api", false, None);
        let scraped = descriptor("https://s/fw.zip", "S");
        let (scrape, scrape_calls) = fixed("scrape", true, Some(scraped));
        let locator = FallbackLocator::new(vec![api, scrape]);

        let found = locator.resolve("15", "GLO", None).await.unwrap();
        assert_eq!(found.url, "https://s/fw.zip");
        assert_eq!(scrape_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_target_version_skips_unpinnable_sources() {
        let (api, api_calls) = fixed("api", false, Some(descriptor("https://a/fw.zip", "A")));
        let (scrape, _) = fixed("scrape", true, Some(descriptor("https://s/fw.zip", "Pinned")));
        let locator = FallbackLocator::new(vec![api, scrape]);

        let found = locator.resolve("15", "GLO", Some("Pinned")).await.unwrap();
        assert_eq!(found.version, "Pinned");
        assert_eq!(api_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let (api, _) = fixed("api", false, None);
        let (scrape, _) = fixed("scrape", true, None);
        let locator = FallbackLocator::new(vec![api, scrape]);
        assert!(locator.resolve("15", "GLO", None).await.is_none());
    }

    #[test]
    fn test_standard_ordering() {
        let catalog = Arc::new(DeviceCatalog::builtin());
        let locator = FallbackLocator::standard(&LocatorConfig::default(), catalog);
        assert_eq!(locator.source_names(), vec!["api", "scrape"]);
    }
}
