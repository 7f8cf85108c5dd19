//! Host and port
//!
//! Peer addresses as they appear in replication documents: `host`,
//! `host:port`, or `[ipv6]:port`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WireError};

/// A peer address with an optional port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAndPort {
    host: String,
    port: Option<u16>,
}

impl HostAndPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn from_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn port_or(&self, default_port: u16) -> u16 {
        self.port.unwrap_or(default_port)
    }

    /// Same host, with `default_port` filled in when no port was given
    pub fn with_default_port(&self, default_port: u16) -> Self {
        Self {
            host: self.host.clone(),
            port: Some(self.port_or(default_port)),
        }
    }

    fn parse_port(text: &str, input: &str) -> Result<u16> {
        text.parse::<u16>().map_err(|_| {
            WireError::BadValue(format!("Invalid port in host string \"{}\"", input))
        })
    }
}

impl FromStr for HostAndPort {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(WireError::BadValue("Empty host string".to_string()));
        }

        // Bracketed IPv6: "[::1]" or "[::1]:27017"
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| {
                WireError::BadValue(format!("Unclosed bracket in host string \"{}\"", s))
            })?;
            return match tail {
                "" => Ok(Self::from_host(host)),
                _ => match tail.strip_prefix(':') {
                    Some(port) => Ok(Self::new(host, Self::parse_port(port, s)?)),
                    None => Err(WireError::BadValue(format!(
                        "Unexpected characters after host in \"{}\"",
                        s
                    ))),
                },
            };
        }

        match s.split_once(':') {
            // More than one colon without brackets is a bare IPv6 address
            Some((_, rest)) if rest.contains(':') => Ok(Self::from_host(s)),
            Some(("", _)) => Err(WireError::BadValue(format!(
                "Missing host in host string \"{}\"",
                s
            ))),
            Some((host, port)) => Ok(Self::new(host, Self::parse_port(port, s)?)),
            None => Ok(Self::from_host(s)),
        }
    }
}

impl fmt::Display for HostAndPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.host.contains(':');
        match (bracket, self.port) {
            (true, Some(port)) => write!(f, "[{}]:{}", self.host, port),
            (true, None) => write!(f, "[{}]", self.host),
            (false, Some(port)) => write!(f, "{}:{}", self.host, port),
            (false, None) => f.write_str(&self.host),
        }
    }
}
