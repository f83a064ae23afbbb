//! HTTP access for remote sources.
//!
//! Remote services only need two things: the body of a URL, and the target
//! of a redirect without following it. Both go through the [`Fetcher`] trait
//! so sources can be exercised offline.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("placeholder-gen/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("No redirect returned by {url}")]
    MissingRedirect { url: String },
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

pub trait Fetcher: Send + Sync {
    /// Body of a successful GET, following redirects.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Absolute `Location` of the redirect `url` answers with.
    fn resolve_redirect(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetcher`] backed by blocking `reqwest` clients.
pub struct HttpFetcher {
    client: Client,
    no_redirect: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let build = |policy: Policy| {
            Client::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .redirect(policy)
                .build()
                .map_err(FetchError::Client)
        };
        Ok(Self {
            client: build(Policy::default())?,
            no_redirect: build(Policy::none())?,
        })
    }
}

fn network(url: &str) -> impl FnOnce(reqwest::Error) -> FetchError + '_ {
    move |source| FetchError::Network {
        url: url.to_string(),
        source,
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "fetching remote image");
        let resp = self.client.get(url).send().map_err(network(url))?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let bytes = resp.bytes().map_err(network(url))?;
        Ok(bytes.to_vec())
    }

    fn resolve_redirect(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "resolving redirect");
        let resp = self.no_redirect.get(url).send().map_err(network(url))?;
        let status = resp.status();
        if !status.is_redirection() {
            return Err(if status.is_success() {
                FetchError::MissingRedirect {
                    url: url.to_string(),
                }
            } else {
                FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                }
            });
        }
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| FetchError::MissingRedirect {
                url: url.to_string(),
            })?;
        // Location may be relative to the request URL.
        let target = resp
            .url()
            .join(location)
            .map_err(|e| FetchError::InvalidUrl {
                url: location.to_string(),
                message: e.to_string(),
            })?;
        Ok(target.into())
    }
}
