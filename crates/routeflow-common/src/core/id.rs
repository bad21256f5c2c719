// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::api::error::{Result, RouteflowError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertex identifier (depot, hub, delivery zone).
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VertexId {
    type Err = RouteflowError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| RouteflowError::invalid_input(format!("Invalid vertex id '{}': {}", s, e)))
    }
}

/// Persisted route identifier. Routes created without a backend id carry `None`
/// and cannot be edited by id.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RouteId(pub u64);

impl RouteId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RouteId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RouteId {
    type Err = RouteflowError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| RouteflowError::invalid_input(format!("Invalid route id '{}': {}", s, e)))
    }
}

/// Directed `(origin, destination)` pair. Parallel routes share one key, so
/// blocking a key blocks all of them.
///
/// Canonical string form is `"{origin}-{destination}"`.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct RouteKey {
    pub origin: VertexId,
    pub destination: VertexId,
}

impl RouteKey {
    pub fn new(origin: VertexId, destination: VertexId) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.destination)
    }
}

impl FromStr for RouteKey {
    type Err = RouteflowError;

    /// Parses `"origin-destination"`.
    fn from_str(s: &str) -> Result<Self> {
        let (origin, destination) = s.split_once('-').ok_or_else(|| {
            RouteflowError::invalid_input(format!(
                "Invalid route key '{}': expected 'origin-destination'",
                s
            ))
        })?;
        Ok(Self::new(origin.parse()?, destination.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_from_str() {
        let key: RouteKey = "3-14".parse().unwrap();
        assert_eq!(key.origin, VertexId(3));
        assert_eq!(key.destination, VertexId(14));
        assert_eq!(key.to_string(), "3-14");

        assert!("314".parse::<RouteKey>().is_err());
        assert!("a-1".parse::<RouteKey>().is_err());
        assert!("1-2-3".parse::<RouteKey>().is_err());
    }

    #[test]
    fn test_vertex_id_from_str() {
        assert_eq!(" 7 ".parse::<VertexId>().unwrap(), VertexId(7));

        let err = "-1".parse::<VertexId>().unwrap_err();
        assert!(err.is_invalid_input());
    }
}
