//! Request context: the value object the macro expander reads from.
//!
//! Built and owned by the caller driving one SPF evaluation; the core only
//! reads it (and, between directive evaluations, the caller appends to the
//! requested-domain trail).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A domain name with the IP address it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    labels: Vec<String>,
    /// The address this domain resolved to (resolution is the caller's job).
    pub ip: IpAddr,
}

impl Domain {
    /// Create a domain from its dotted name.
    pub fn new(name: &str, ip: IpAddr) -> Self {
        Self {
            labels: name.split('.').map(str::to_string).collect(),
            ip,
        }
    }

    /// The dotted name.
    pub fn name(&self) -> String {
        self.labels.join(".")
    }

    /// The individual labels, most significant last.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The envelope sender: local part plus domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// The part before the `@`.
    pub local: String,
    /// The part after the `@`.
    pub domain: Domain,
}

impl Sender {
    /// Create a sender from its parts.
    pub fn new(local: impl Into<String>, domain: Domain) -> Self {
        Self {
            local: local.into(),
            domain,
        }
    }

    /// Split a `local@domain` address. Returns `None` without an `@`.
    pub fn from_address(address: &str, ip: IpAddr) -> Option<Self> {
        let (local, domain) = address.rsplit_once('@')?;
        Some(Self::new(local, Domain::new(domain, ip)))
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

/// Everything the macro expander may interpolate: sender, requester, and the
/// trail of domains requested so far in this evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The envelope sender under evaluation.
    pub sender: Sender,
    /// The domain (and address) of the party requesting the check.
    pub requester: Domain,
    requested: Vec<Domain>,
}

impl RequestContext {
    /// Create a context with an empty requested-domain trail.
    pub fn new(sender: Sender, requester: Domain) -> Self {
        Self {
            sender,
            requester,
            requested: Vec::new(),
        }
    }

    /// Append a domain to the trail. Append-only by design: entries are
    /// never removed or reordered during an evaluation pass.
    pub fn push_requested(&mut self, domain: Domain) {
        self.requested.push(domain);
    }

    /// The requested-domain trail, oldest first.
    pub fn requested(&self) -> &[Domain] {
        &self.requested
    }

    /// The domain currently being evaluated: the most recently requested
    /// one, falling back to the sender domain before any request was made.
    pub fn current_domain(&self) -> &Domain {
        self.requested.last().unwrap_or(&self.sender.domain)
    }
}
