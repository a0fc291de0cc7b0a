//! Retrieval of CGE documents from files and game servers.
//!
//! A game locator is either a filesystem path, a `file://` URL, an
//! `http://` or `https://` game URL, or a bare `host[:port][/path]`. Game
//! servers publish their schema at `/api/cge` below the game URL, so that
//! endpoint is appended to every HTTP locator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::SchemaError;

const FETCH_TARGET: &str = "cg_module_cge::fetch";
const USER_AGENT: &str = concat!("cg-module/", env!("CARGO_PKG_VERSION"));

/// Path below a game URL that serves the game's CGE document.
pub const CGE_ENDPOINT: &str = "/api/cge";

/// A parsed game locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A document on the local filesystem.
    File(PathBuf),
    /// The CGE endpoint of a game server, over HTTP or HTTPS.
    Http(Url),
}

impl Locator {
    /// Interprets a game locator.
    ///
    /// Existing filesystem paths and anything named like a schema file
    /// (`.cge`/`.json`) are files; other bare names are game server hosts.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Fetch`] for schemes other than `file`, `http`
    /// and `https`, or for URLs without a host.
    pub fn parse(locator: &str) -> Result<Self, SchemaError> {
        let trimmed = locator.trim();
        // `host:port` parses as an opaque URL with the host as its scheme.
        if let Ok(url) = Url::parse(trimmed)
            && !url.cannot_be_a_base()
        {
            return Self::from_url(locator, &url);
        }
        if names_file(trimmed) || !is_host_like(trimmed) {
            return Ok(Self::File(PathBuf::from(trimmed)));
        }
        match Url::parse(&format!("http://{trimmed}")) {
            Ok(url) => Self::from_url(locator, &url),
            Err(_) => Ok(Self::File(PathBuf::from(trimmed))),
        }
    }

    /// Builds the locator of the CGE endpoint below `game_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Fetch`] when the URL has no host.
    pub fn endpoint(locator: &str, mut game_url: Url) -> Result<Self, SchemaError> {
        if game_url.host_str().is_none_or(str::is_empty) {
            return Err(SchemaError::Fetch {
                locator: locator.to_owned(),
                message: String::from("URL has no host"),
            });
        }
        let base = game_url.path().trim_end_matches('/');
        if !base.ends_with(CGE_ENDPOINT) {
            let path = format!("{base}{CGE_ENDPOINT}");
            game_url.set_path(&path);
        }
        game_url.set_fragment(None);
        Ok(Self::Http(game_url))
    }

    fn from_url(locator: &str, url: &Url) -> Result<Self, SchemaError> {
        match url.scheme() {
            "file" => url.to_file_path().map(Self::File).map_err(|()| SchemaError::Fetch {
                locator: locator.to_owned(),
                message: String::from("file URL does not name a local path"),
            }),
            "http" | "https" => Self::endpoint(locator, url.clone()),
            other => Err(SchemaError::Fetch {
                locator: locator.to_owned(),
                message: format!("unsupported locator scheme '{other}'"),
            }),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url.as_str()),
        }
    }
}

fn names_file(candidate: &str) -> bool {
    let lowered = candidate.to_ascii_lowercase();
    Path::new(candidate).exists()
        || candidate.starts_with(['.', '/', '\\', '~'])
        || lowered.ends_with(".cge")
        || lowered.ends_with(".json")
}

fn is_host_like(candidate: &str) -> bool {
    let host = candidate.split(['/', '?']).next().unwrap_or_default();
    !host.is_empty()
        && host
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | ':' | '[' | ']'))
}

/// Source of raw CGE documents.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentFetcher {
    /// Retrieves the document named by `locator`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] describing why the document is unavailable.
    fn fetch(&self, locator: &Locator) -> Result<String, SchemaError>;
}

/// Reads local files and requests game server endpoints over HTTP(S).
#[derive(Clone)]
pub struct DefaultFetcher {
    timeout: Duration,
    agent: ureq::Agent,
}

impl DefaultFetcher {
    /// Creates a fetcher whose network operations give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { timeout, agent }
    }

    /// Returns the network timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn get(&self, locator: &Locator, url: &Url) -> Result<String, SchemaError> {
        debug!(target: FETCH_TARGET, %url, "requesting CGE document");
        let response = match self.agent.request_url("GET", url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(SchemaError::HttpStatus {
                    locator: locator.to_string(),
                    status,
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(SchemaError::Fetch {
                    locator: locator.to_string(),
                    message: transport.to_string(),
                });
            }
        };
        debug!(target: FETCH_TARGET, status = response.status(), "received CGE response");
        response.into_string().map_err(|source| SchemaError::FetchIo {
            locator: locator.to_string(),
            source: Arc::new(source),
        })
    }
}

impl fmt::Debug for DefaultFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DocumentFetcher for DefaultFetcher {
    fn fetch(&self, locator: &Locator) -> Result<String, SchemaError> {
        match locator {
            Locator::File(path) => {
                debug!(target: FETCH_TARGET, path = %path.display(), "reading CGE file");
                std::fs::read_to_string(path).map_err(|source| SchemaError::FetchIo {
                    locator: locator.to_string(),
                    source: Arc::new(source),
                })
            }
            Locator::Http(url) => self.get(locator, url),
        }
    }
}

#[cfg(test)]
mod tests;
