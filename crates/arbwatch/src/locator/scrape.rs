//! Fallback source: an HTML form-driven download site.
//!
//! The landing page embeds the whole catalog; the signed URL is only handed
//! out in response to a form submission made from the same session.

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{extract_catalog, extract_result_url, FirmwareCatalog};
use crate::devices::DeviceCatalog;
use crate::http::HttpSession;
use crate::matcher;
use crate::types::{FirmwareDescriptor, TrackerResult};

use super::{FirmwareSource, LocatorConfig};

pub struct ScrapeSource {
    config: LocatorConfig,
    catalog: Arc<DeviceCatalog>,
}

impl ScrapeSource {
    pub fn new(config: LocatorConfig, catalog: Arc<DeviceCatalog>) -> Self {
        Self { config, catalog }
    }

    /// Versions listed for a device/region, most relevant first.
    pub async fn list_versions(&self, device_id: &str, region: &str) -> Option<Vec<String>> {
        let result: TrackerResult<Option<Vec<String>>> = async {
            let session = self.session()?;
            let upstream = self.fetch_catalog(&session).await?;
            Ok(self.candidates(&upstream, device_id, region).cloned())
        }
        .await;

        match result {
            Ok(versions) => versions,
            Err(e) => {
                tracing::warn!("Catalog fetch failed for {device_id} {region}: {e}");
                None
            }
        }
    }

    fn session(&self) -> TrackerResult<HttpSession> {
        HttpSession::new(&self.config.user_agent, self.config.timeout)
    }

    async fn fetch_catalog(&self, session: &HttpSession) -> TrackerResult<FirmwareCatalog> {
        let page = session.get_text(&self.config.scrape_url).await?;
        Ok(extract_catalog(&page))
    }

    fn candidates<'a>(
        &self,
        upstream: &'a FirmwareCatalog,
        device_id: &str,
        region: &str,
    ) -> Option<&'a Vec<String>> {
        let label = self.catalog.scrape_label(device_id);
        let Some(regions) = upstream.get(&label) else {
            tracing::debug!("Label {label:?} not in upstream catalog");
            return None;
        };
        let versions = regions.get(region);
        if versions.is_none() {
            tracing::debug!("Region {region} not listed under {label:?}");
        }
        versions
    }

    async fn try_resolve(
        &self,
        device_id: &str,
        region: &str,
        target_version: Option<&str>,
    ) -> TrackerResult<Option<FirmwareDescriptor>> {
        let session = self.session()?;
        let upstream = self.fetch_catalog(&session).await?;

        let Some(candidates) = self.candidates(&upstream, device_id, region) else {
            return Ok(None);
        };
        let Some(version) = matcher::select(candidates, target_version) else {
            tracing::debug!("No version matching {target_version:?} for {device_id} {region}");
            return Ok(None);
        };

        let label = self.catalog.scrape_label(device_id);
        let form = [
            ("device", label.as_str()),
            ("region", region),
            ("version", version),
        ];
        let body = session.post_form(&self.config.scrape_url, &form).await?;

        let Some(url) = extract_result_url(&body) else {
            tracing::debug!("Form response carried no download URL");
            return Ok(None);
        };
        if !url.starts_with("http") {
            tracing::debug!("Form response URL is not http: {url:?}");
            return Ok(None);
        }

        Ok(Some(FirmwareDescriptor {
            url,
            version: version.to_string(),
        }))
    }
}

#[async_trait]
impl FirmwareSource for ScrapeSource {
    fn name(&self) -> &'static str {
        "scrape"
    }

    fn supports_target_version(&self) -> bool {
        true
    }

    async fn resolve(
        &self,
        device_id: &str,
        region: &str,
        target_version: Option<&str>,
    ) -> Option<FirmwareDescriptor> {
        match self.try_resolve(device_id, region, target_version).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Scrape lookup failed for {device_id} {region}: {e}");
                None
            }
        }
    }
}
