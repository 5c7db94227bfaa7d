use crate::config::RunConfig;
use crate::metrics::MetricError;
use crate::model::{Category, Target};
use async_trait::async_trait;
use core::time::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

const LOG_TARGET: &str = "hub";

/// Maximum retry attempts on top of the original request.
const MAX_RETRY_ATTEMPTS: u32 = 2;

/// Base delay for exponential backoff between retries.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Typed artifact metadata returned by the hub for one target.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDescriptor {
    pub readme: Option<String>,
    pub license: Option<String>,
    pub downloads: u64,
    pub likes: u64,
    pub tags: Vec<String>,
}

/// One file in an artifact's snapshot manifest.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    pub size_bytes: u64,
}

impl FileEntry {
    /// Lowercased extension of the file path, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Hosted-repository metadata service consumed by the metric plugins.
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Fetch the artifact descriptor (card metadata + README) for a target.
    async fn descriptor(&self, target: &Target) -> Result<ArtifactDescriptor, MetricError>;

    /// Fetch the file manifest (paths and sizes) for a target.
    async fn file_manifest(&self, target: &Target) -> Result<Vec<FileEntry>, MetricError>;
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    siblings: Vec<Sibling>,
    #[serde(default, rename = "cardData")]
    card_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Production [`HubClient`] talking to a hugging-face-style REST API.
///
/// Every request runs under a fixed total timeout covering the body read,
/// with bounded retries on transient failures. Parsed info payloads and
/// assembled descriptors are cached in memory because several plugins
/// consume the same metadata while scoring one target.
pub struct HttpHubClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    infos: Mutex<HashMap<String, Arc<RepoInfo>>>,
    descriptors: Mutex<HashMap<String, ArtifactDescriptor>>,
}

impl core::fmt::Debug for HttpHubClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpHubClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl HttpHubClient {
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be constructed.
    pub fn new(config: &RunConfig) -> crate::Result<Self> {
        use ohno::IntoAppError;

        // The client-level timeout bounds the whole request, headers through
        // body completion; a server that stalls mid-body cannot pin a task.
        let client = reqwest::Client::builder()
            .user_agent(concat!("model-rank/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()
            .into_app_err("could not construct HTTP client")?;

        Ok(Self {
            client,
            base_url: config.hub_url.clone(),
            timeout: config.http_timeout,
            infos: Mutex::new(HashMap::new()),
            descriptors: Mutex::new(HashMap::new()),
        })
    }

    /// API info path for a target, e.g. `api/models/{name}`.
    fn info_url(&self, target: &Target) -> Result<Url, MetricError> {
        let kind = match target.category() {
            Category::Model => "models",
            Category::Dataset => "datasets",
            Category::Code => {
                return Err(MetricError::validation("hub", format!("code repository '{}' has no hub descriptor", target.name())));
            }
        };

        self.base_url
            .join(&format!("api/{kind}/{}?blobs=true", target.name()))
            .map_err(|e| MetricError::validation("hub", format!("could not build hub URL for '{}': {e}", target.name())))
    }

    /// Raw README path for a target.
    fn readme_url(&self, target: &Target) -> Result<Url, MetricError> {
        let prefix = match target.category() {
            Category::Dataset => "datasets/",
            _ => "",
        };

        self.base_url
            .join(&format!("{prefix}{}/raw/main/README.md", target.name()))
            .map_err(|e| MetricError::validation("hub", format!("could not build README URL for '{}': {e}", target.name())))
    }

    /// Send a GET request with bounded retries on timeouts, network errors,
    /// and 5xx responses. The total-request timeout lives on the client.
    async fn get_with_retry(&self, url: Url) -> Result<reqwest::Response, MetricError> {
        let mut attempt = 0;
        loop {
            let outcome = self.client.get(url.clone()).send().await;

            let retryable = match outcome {
                Err(e) if e.is_timeout() => {
                    log::debug!(target: LOG_TARGET, "request to '{url}' timed out after {}s", self.timeout.as_secs());
                    None
                }
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "request to '{url}' failed: {e}");
                    Some(e.to_string())
                }
                Ok(response) if response.status().is_server_error() => {
                    log::debug!(target: LOG_TARGET, "request to '{url}' returned {}", response.status());
                    Some(format!("server returned {}", response.status()))
                }
                Ok(response) => return Ok(response),
            };

            if attempt >= MAX_RETRY_ATTEMPTS {
                return Err(match retryable {
                    Some(reason) => MetricError::service("hub", None, reason),
                    None => MetricError::timeout("hub", format!("request to '{url}' exceeded {}s", self.timeout.as_secs())),
                });
            }

            attempt += 1;
            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.saturating_pow(attempt - 1)).await;
        }
    }

    /// Fetch and parse the info payload for a target, consulting the cache
    /// first so `descriptor` and `file_manifest` share one request.
    async fn fetch_info(&self, target: &Target) -> Result<Arc<RepoInfo>, MetricError> {
        let cache_key = cache_key(target);
        if let Some(cached) = self.infos.lock().await.get(&cache_key) {
            return Ok(Arc::clone(cached));
        }

        let url = self.info_url(target)?;
        let response = self.get_with_retry(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricError::service(
                "hub",
                Some(status.as_u16()),
                format!("could not fetch metadata for '{}'", target.name()),
            ));
        }

        let info = response.json::<RepoInfo>().await.map_err(|e| {
            if e.is_timeout() {
                MetricError::timeout("hub", format!("metadata body for '{}' exceeded {}s", target.name(), self.timeout.as_secs()))
            } else {
                MetricError::service("hub", None, format!("malformed metadata for '{}': {e}", target.name()))
            }
        })?;

        let info = Arc::new(info);
        let _ = self.infos.lock().await.insert(cache_key, Arc::clone(&info));
        Ok(info)
    }

    /// Best-effort README fetch; a missing README is data, not a failure.
    async fn fetch_readme(&self, target: &Target) -> Result<Option<String>, MetricError> {
        let url = self.readme_url(target)?;
        let response = self.get_with_retry(url).await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        match response.text().await {
            Ok(text) if !text.trim().is_empty() => Ok(Some(text)),
            Ok(_) => Ok(None),
            Err(e) => {
                log::debug!(target: LOG_TARGET, "could not read README body for '{}': {e}", target.name());
                Ok(None)
            }
        }
    }
}

/// Extract a license identifier from card metadata, which stores it either
/// as a plain string or a list.
fn license_from_card(card_data: Option<&serde_json::Value>) -> Option<String> {
    let license = card_data?.get("license")?;
    match license {
        serde_json::Value::String(s) => Some(s.to_ascii_lowercase()),
        serde_json::Value::Array(values) => values.first().and_then(|v| v.as_str()).map(str::to_ascii_lowercase),
        _ => None,
    }
}

/// Fall back to the `license:x` convention in the tag list.
fn license_from_tags(tags: &[String]) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix("license:"))
        .map(str::to_ascii_lowercase)
}

fn cache_key(target: &Target) -> String {
    format!("{}/{}", target.category(), target.name())
}

#[async_trait]
impl HubClient for HttpHubClient {
    async fn descriptor(&self, target: &Target) -> Result<ArtifactDescriptor, MetricError> {
        let cache_key = cache_key(target);
        if let Some(cached) = self.descriptors.lock().await.get(&cache_key) {
            return Ok(cached.clone());
        }

        let info = self.fetch_info(target).await?;
        let readme = self.fetch_readme(target).await?;

        let descriptor = ArtifactDescriptor {
            readme,
            license: license_from_card(info.card_data.as_ref()).or_else(|| license_from_tags(&info.tags)),
            downloads: info.downloads,
            likes: info.likes,
            tags: info.tags.clone(),
        };

        let _ = self.descriptors.lock().await.insert(cache_key, descriptor.clone());
        Ok(descriptor)
    }

    async fn file_manifest(&self, target: &Target) -> Result<Vec<FileEntry>, MetricError> {
        let info = self.fetch_info(target).await?;

        Ok(info
            .siblings
            .iter()
            .filter_map(|sibling| {
                sibling.size.map(|size_bytes| FileEntry {
                    path: sibling.rfilename.clone(),
                    size_bytes,
                })
            })
            .collect())
    }
}
