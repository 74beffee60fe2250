//! Egress proxy rotation.
//!
//! A fixed, ordered pool of proxy endpoints with a cyclic cursor.
//! Rotation is a single atomic operation: concurrent callers each get
//! the next element of the cyclic sequence, never a repeat or a skip.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

/// Reserved config value meaning "connect directly, no proxy".
const DIRECT: &str = "direct";

/// Legacy spelling of the direct entry, still accepted.
const DIRECT_LEGACY: &str = "localhost";

#[derive(Debug, Error)]
pub enum ProxyPoolError {
    #[error("proxy pool cannot be empty")]
    Empty,
}

/// One slot of the rotation list: either a proxy URL or the reserved
/// direct-connection marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEndpoint {
    Direct,
    Url(String),
}

impl ProxyEndpoint {
    /// Parse a configured rotation entry.
    pub fn parse(raw: &str) -> Self {
        match raw {
            DIRECT | DIRECT_LEGACY => ProxyEndpoint::Direct,
            url => ProxyEndpoint::Url(url.to_string()),
        }
    }

    /// The proxy URL to route through, or None for a direct connection.
    pub fn url(&self) -> Option<&str> {
        match self {
            ProxyEndpoint::Direct => None,
            ProxyEndpoint::Url(url) => Some(url),
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyEndpoint::Direct => f.write_str(DIRECT),
            ProxyEndpoint::Url(url) => f.write_str(url),
        }
    }
}

/// Round-robin pool over a non-empty endpoint list. The list is
/// immutable after construction; only the cursor moves.
#[derive(Debug)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
    cursor: AtomicUsize,
}

impl ProxyPool {
    pub fn new(entries: &[String]) -> Result<Self, ProxyPoolError> {
        if entries.is_empty() {
            return Err(ProxyPoolError::Empty);
        }
        Ok(Self {
            endpoints: entries.iter().map(|e| ProxyEndpoint::parse(e)).collect(),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the endpoint under the cursor and advance it, as one
    /// indivisible operation. The read-then-write must not be split
    /// across two steps or concurrent callers lose rotations.
    pub fn next(&self) -> &ProxyEndpoint {
        let index = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| {
                Some((i + 1) % self.endpoints.len())
            })
            .expect("cursor update never fails");
        let endpoint = &self.endpoints[index];
        tracing::debug!(proxy = %endpoint, "Rotated proxy");
        endpoint
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
