//! Mirror server discovery and selection
//!
//! Metadata is served by a pool of interchangeable Invidious mirrors. The
//! pool is discovered from the public instance directory at most once per
//! process and reused until restart; a dead mirror is handled by the retry
//! loop resampling, not by evicting it here.

use rand::seq::SliceRandom;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::client::Fetch;

const INSTANCES_URL: &str = "https://api.invidious.io/instances.json?pretty=1&sort_by=type,users";

/// One entry of the instance directory: `[hostname, {flags...}]`.
#[derive(Debug, Deserialize)]
struct InstanceInfo {
    #[serde(default)]
    api: Option<bool>,
    uri: String,
}

#[derive(Debug)]
pub struct ServerDirectory {
    override_url: Option<String>,
    pool: OnceCell<Vec<String>>,
}

impl ServerDirectory {
    /// `override_url`, when set, pins every pick to one mirror and disables
    /// discovery entirely.
    pub fn new(override_url: Option<String>) -> Self {
        Self {
            override_url: override_url.map(|url| url.trim_end_matches('/').to_string()),
            pool: OnceCell::new(),
        }
    }

    /// A mirror base URL to try, or `None` when no mirror is usable.
    ///
    /// Picks uniformly at random from the pool; discovery runs lazily on the
    /// first call and exactly once even under concurrent callers.
    pub async fn pick<C: Fetch>(&self, client: &C) -> Option<String> {
        if let Some(ref url) = self.override_url {
            return Some(url.clone());
        }

        let pool = self
            .pool
            .get_or_init(|| async { discover_servers(client).await })
            .await;

        pool.choose(&mut rand::thread_rng()).cloned()
    }
}

/// Fetch the instance directory and keep the API-capable mirrors.
///
/// Fails soft: any transport, status or parse problem yields an empty pool.
pub async fn discover_servers<C: Fetch>(client: &C) -> Vec<String> {
    let response = match client.get(INSTANCES_URL).await {
        Ok(response) => response,
        Err(e) => {
            warn!("instance discovery failed: {e}");
            return Vec::new();
        }
    };

    if !response.is_success() {
        warn!("instance discovery returned status {}", response.status);
        return Vec::new();
    }

    let instances: Vec<(String, InstanceInfo)> = match serde_json::from_str(&response.body) {
        Ok(instances) => instances,
        Err(e) => {
            warn!("malformed instance directory: {e}");
            return Vec::new();
        }
    };

    let servers: Vec<String> = instances
        .into_iter()
        .filter(|(_, info)| info.api == Some(true))
        .map(|(_, info)| info.uri.trim_end_matches('/').to_string())
        .collect();

    debug!("discovered {} usable mirrors", servers.len());
    servers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClient;

    const INSTANCES: &str = r#"[
        ["yewtu.be", {"api": true, "uri": "https://yewtu.be/"}],
        ["vid.example", {"api": false, "uri": "https://vid.example"}],
        ["inv.example", {"api": null, "uri": "https://inv.example"}],
        ["iv.example", {"api": true, "uri": "https://iv.example"}]
    ]"#;

    #[tokio::test]
    async fn discovery_keeps_api_capable_instances() {
        let client = MockClient::new().route(INSTANCES_URL, 200, INSTANCES);
        let servers = discover_servers(&client).await;
        assert_eq!(servers, vec!["https://yewtu.be", "https://iv.example"]);
    }

    #[tokio::test]
    async fn discovery_fails_soft_on_bad_status() {
        let client = MockClient::new().route(INSTANCES_URL, 503, "unavailable");
        assert!(discover_servers(&client).await.is_empty());
    }

    #[tokio::test]
    async fn discovery_fails_soft_on_malformed_body() {
        let client = MockClient::new().route(INSTANCES_URL, 200, "not json");
        assert!(discover_servers(&client).await.is_empty());
    }

    #[tokio::test]
    async fn pick_prefers_the_override() {
        let client = MockClient::new();
        let directory = ServerDirectory::new(Some("https://fixed.example/".to_string()));
        assert_eq!(
            directory.pick(&client).await.as_deref(),
            Some("https://fixed.example")
        );
        // Discovery never ran
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn pick_draws_from_the_discovered_pool() {
        let client = MockClient::new().route(INSTANCES_URL, 200, INSTANCES);
        let directory = ServerDirectory::new(None);
        let picked = directory.pick(&client).await.unwrap();
        assert!(picked == "https://yewtu.be" || picked == "https://iv.example");
    }

    #[tokio::test]
    async fn discovery_runs_once_per_directory() {
        let client = MockClient::new().route(INSTANCES_URL, 200, INSTANCES);
        let directory = ServerDirectory::new(None);
        directory.pick(&client).await;
        directory.pick(&client).await;
        directory.pick(&client).await;
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn empty_pool_yields_no_pick() {
        let client = MockClient::new().route(INSTANCES_URL, 200, "[]");
        let directory = ServerDirectory::new(None);
        assert_eq!(directory.pick(&client).await, None);
    }
}
