//! Stale-path notifications for the separately-hosted frontend.
//!
//! The serving layer caches rendered pages; after a mutation we tell it
//! which paths went stale. The ping is best-effort: a frontend that is
//! down or unconfigured never blocks or fails the mutation that fired it.

use serde_json::json;

#[derive(Clone)]
pub struct Revalidator {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl Revalidator {
    pub fn new(endpoint: Option<String>) -> Self {
        if endpoint.is_none() {
            tracing::info!("no revalidation endpoint configured, stale-path pings disabled");
        }

        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub async fn revalidate(&self, path: &str) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };

        match self
            .client
            .post(endpoint)
            .json(&json!({ "path": path }))
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(path, status = %response.status(), "revalidation was refused");
            }
            Ok(_) => {
                tracing::debug!(path, "revalidated");
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "failed to reach the revalidation endpoint");
            }
        }
    }

    pub async fn revalidate_all(&self, paths: &[&str]) {
        for path in paths {
            self.revalidate(path).await;
        }
    }
}
