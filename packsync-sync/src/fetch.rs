//! Remote artifact retrieval.
//!
//! [`RemoteFetcher`] is the I/O boundary between the sync engine and the
//! remote source of truth. It has no retry logic: every failure comes back as
//! a single [`SyncError::Network`] and the caller decides what it aborts.
//! Closures of the right shape are fetchers too, which keeps tests offline.

use std::io::Read;
use std::time::Duration;

use packsync_core::ArtifactName;

use crate::error::SyncError;

/// Upper bound on the buffer reserved up front from `Content-Length`. The
/// header is server-controlled; larger bodies still grow the buffer as read.
const MAX_PREALLOC: usize = 1 << 20;

/// Retrieves the currently published bytes for a named artifact.
pub trait RemoteFetcher {
    fn fetch(&self, name: &ArtifactName) -> Result<Vec<u8>, SyncError>;

    /// Where `name` would be fetched from, for log lines and errors.
    fn describe(&self, name: &ArtifactName) -> String {
        name.to_string()
    }
}

impl<F> RemoteFetcher for F
where
    F: Fn(&ArtifactName) -> Result<Vec<u8>, SyncError>,
{
    fn fetch(&self, name: &ArtifactName) -> Result<Vec<u8>, SyncError> {
        self(name)
    }
}

// ---------------------------------------------------------------------------
// Endpoint template
// ---------------------------------------------------------------------------

/// Remote address template, e.g. `https://packs.example.net/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    pub const PLACEHOLDER: &'static str = "{name}";

    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitute `name` into the template.
    ///
    /// A template without a placeholder is treated as a base URL and the name
    /// is appended as the last path segment.
    pub fn url_for(&self, name: &ArtifactName) -> String {
        if self.0.contains(Self::PLACEHOLDER) {
            self.0.replace(Self::PLACEHOLDER, name.as_str())
        } else {
            format!("{}/{}", self.0.trim_end_matches('/'), name)
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// `GET <template>` fetcher using a blocking `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
    template: EndpointTemplate,
}

impl HttpFetcher {
    /// `timeout` of `None` keeps ureq's transport defaults.
    pub fn new(template: EndpointTemplate, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            template,
        }
    }

    pub fn template(&self) -> &EndpointTemplate {
        &self.template
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, name: &ArtifactName) -> Result<Vec<u8>, SyncError> {
        let url = self.template.url_for(name);
        let network = |reason: String| SyncError::Network {
            name: name.to_string(),
            url: url.clone(),
            reason,
        };

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| network(describe_ureq_error(&e)))?;

        let announced = response
            .header("Content-Length")
            .and_then(|v| v.trim().parse::<usize>().ok());

        let mut bytes = Vec::with_capacity(announced.map_or(0, |n| n.min(MAX_PREALLOC)));
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| network(format!("reading body: {e}")))?;

        if let Some(expected) = announced {
            if bytes.len() != expected {
                return Err(network(format!(
                    "truncated body: got {} of {expected} bytes",
                    bytes.len()
                )));
            }
        }

        tracing::debug!("fetched {} bytes for {name} from {url}", bytes.len());
        Ok(bytes)
    }

    fn describe(&self, name: &ArtifactName) -> String {
        self.template.url_for(name)
    }
}

fn describe_ureq_error(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("HTTP {code} {}", response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
