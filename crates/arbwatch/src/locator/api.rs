//! Primary source: a JSON-ish API answering with bare text bodies.

use std::sync::Arc;

use async_trait::async_trait;

use crate::devices::{api_brand, DeviceCatalog};
use crate::http::HttpSession;
use crate::types::{FirmwareDescriptor, TrackerError, TrackerResult};

use super::{FirmwareSource, LocatorConfig};

/// Resolves the latest build through two text endpoints: one for the signed
/// URL, one for the version string.
pub struct ApiSource {
    config: LocatorConfig,
    catalog: Arc<DeviceCatalog>,
}

impl ApiSource {
    pub fn new(config: LocatorConfig, catalog: Arc<DeviceCatalog>) -> Self {
        Self { config, catalog }
    }

    /// Endpoint for one field of a device/region (`full` or `version`).
    pub fn endpoint(&self, device_id: &str, region: &str, field: &str) -> String {
        let api_id = self.catalog.api_id(device_id);
        format!(
            "{}/{}/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            api_brand(&api_id),
            api_id,
            region,
            field
        )
    }

    async fn try_resolve(
        &self,
        device_id: &str,
        region: &str,
    ) -> TrackerResult<FirmwareDescriptor> {
        let session = HttpSession::new(&self.config.user_agent, self.config.timeout)?;

        let url = session
            .get_text(&self.endpoint(device_id, region, "full"))
            .await?
            .trim()
            .to_string();
        if !url.starts_with("http") {
            return Err(TrackerError::Upstream(format!("not a download URL: {url:?}")));
        }

        let version = session
            .get_text(&self.endpoint(device_id, region, "version"))
            .await?
            .trim()
            .to_string();
        if version.is_empty() {
            return Err(TrackerError::Upstream("empty version string".to_string()));
        }

        Ok(FirmwareDescriptor { url, version })
    }
}

#[async_trait]
impl FirmwareSource for ApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    fn supports_target_version(&self) -> bool {
        false
    }

    async fn resolve(
        &self,
        device_id: &str,
        region: &str,
        target_version: Option<&str>,
    ) -> Option<FirmwareDescriptor> {
        if let Some(target) = target_version {
            tracing::debug!("API cannot serve pinned version {target}");
            return None;
        }

        match self.try_resolve(device_id, region).await {
            Ok(found) => Some(found),
            Err(e) => {
                tracing::warn!("API lookup failed for {device_id} {region}: {e}");
                None
            }
        }
    }
}
