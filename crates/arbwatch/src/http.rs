//! Session-scoped HTTP client wrapping reqwest.
//!
//! One [`HttpSession`] owns one cookie jar. The scrape source relies on this:
//! the landing page sets state that the form submission must carry back.
//! Requests are never retried; a timeout is just another failure.

use std::time::Duration;

use crate::types::TrackerResult;

/// Desktop Chrome user agent; the scrape source rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";

/// An HTTP client with its own cookie store and a bounded per-request timeout.
#[derive(Clone)]
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    pub fn new(user_agent: &str, timeout: Duration) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL and return its body. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> TrackerResult<String> {
        tracing::debug!("GET {url}");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }

    /// POST url-encoded form fields and return the response body.
    pub async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> TrackerResult<String> {
        tracing::debug!("POST {url} ({} fields)", fields.len());
        let resp = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}
