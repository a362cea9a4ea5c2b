//! AgentDNS address parsing and normalization.
//!
//! Addresses are hierarchical identifiers of the form
//! `agentdns://organization[/name]`:
//! - `agentdns://acme` names an organization
//! - `agentdns://acme/translator` names an agent within it
//!
//! Tokens are case-sensitive and opaque; the parser only enforces the
//! grammar. Parsing has no side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// URI scheme prefix for all AgentDNS addresses.
pub const SCHEME: &str = "agentdns://";

/// A parsed AgentDNS address.
///
/// Immutable once constructed; re-serialize with [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentAddress {
    /// Organization token (never empty, never contains `/`).
    pub organization: String,
    /// Agent name token, absent for organization addresses.
    pub name: Option<String>,
}

impl AgentAddress {
    /// Parse an address string.
    ///
    /// Accepts exactly `agentdns://org` or `agentdns://org/name`. Empty
    /// tokens, missing scheme, or extra path segments are rejected with
    /// [`Error::MalformedAddress`].
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| Error::MalformedAddress(s.to_string()))?;

        let mut segments = rest.split('/');
        let organization = segments.next().unwrap_or_default();
        let name = segments.next();

        if organization.is_empty()
            || name.is_some_and(str::is_empty)
            || segments.next().is_some()
        {
            return Err(Error::MalformedAddress(s.to_string()));
        }

        Ok(Self {
            organization: organization.to_string(),
            name: name.map(String::from),
        })
    }

    /// Whether this address names an organization (no agent segment).
    pub fn is_organization(&self) -> bool {
        self.name.is_none()
    }
}

impl fmt::Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}{}/{}", SCHEME, self.organization, name),
            None => write!(f, "{}{}", SCHEME, self.organization),
        }
    }
}

/// Prefix the `agentdns://` scheme when absent.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    if s.starts_with(SCHEME) {
        s.to_string()
    } else {
        format!("{}{}", SCHEME, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_address() {
        let addr = AgentAddress::parse("agentdns://acme/translator").unwrap();
        assert_eq!(addr.organization, "acme");
        assert_eq!(addr.name.as_deref(), Some("translator"));
        assert!(!addr.is_organization());
    }

    #[test]
    fn test_parse_organization_address() {
        let addr = AgentAddress::parse("agentdns://acme").unwrap();
        assert_eq!(addr.organization, "acme");
        assert!(addr.is_organization());
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["agentdns://acme", "agentdns://acme/translator"] {
            let addr = AgentAddress::parse(s).unwrap();
            assert_eq!(addr.to_string(), normalize(s));
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in [
            "not-an-address",
            "agentdns://",
            "agentdns:///agent",
            "agentdns://org/",
            "agentdns://org/agent/extra",
            "http://acme/translator",
            "",
        ] {
            assert!(
                matches!(AgentAddress::parse(s), Err(Error::MalformedAddress(_))),
                "expected malformed: {:?}",
                s
            );
        }
    }

    #[test]
    fn test_normalize_prefixes_scheme() {
        assert_eq!(normalize("acme/translator"), "agentdns://acme/translator");
        assert_eq!(
            normalize("acme/translator"),
            normalize("agentdns://acme/translator")
        );
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("acme");
        assert_eq!(normalize(&once), once);
    }
}
