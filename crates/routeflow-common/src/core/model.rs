// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Vertex and route records of the distribution network.

use crate::api::error::{Result, RouteflowError};
use crate::core::id::{RouteId, RouteKey, VertexId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification tag for a vertex.
///
/// Only default source/sink selection depends on it: depots are implicit
/// sources, delivery zones implicit sinks.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    Depot,
    Hub,
    DeliveryZone,
    #[default]
    Generic,
}

impl VertexKind {
    /// Lenient, case-insensitive parse used by bulk import. Unknown labels map
    /// to `Generic`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "depot" | "storage" | "deposito" => Self::Depot,
            "hub" => Self::Hub,
            "delivery_zone" | "deliveryzone" | "zone" | "zonaentrega" => Self::DeliveryZone,
            _ => Self::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depot => "depot",
            Self::Hub => "hub",
            Self::DeliveryZone => "delivery_zone",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub name: String,
    pub kind: VertexKind,
}

impl Vertex {
    pub fn new(id: impl Into<VertexId>, name: impl Into<String>, kind: VertexKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn depot(id: impl Into<VertexId>, name: impl Into<String>) -> Self {
        Self::new(id, name, VertexKind::Depot)
    }

    pub fn hub(id: impl Into<VertexId>, name: impl Into<String>) -> Self {
        Self::new(id, name, VertexKind::Hub)
    }

    pub fn delivery_zone(id: impl Into<VertexId>, name: impl Into<String>) -> Self {
        Self::new(id, name, VertexKind::DeliveryZone)
    }
}

/// Route priority in `[1, 5]`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RouteflowError::invalid_input(format!(
                "Priority {} out of range [{}, {}]",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Priority {
    type Error = RouteflowError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

/// Capacitated directed route. Owned by the adjacency bucket of its origin;
/// endpoints are referenced by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: Option<RouteId>,
    pub origin: VertexId,
    pub destination: VertexId,
    pub capacity: u64,
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub priority: Priority,
}

impl Route {
    pub fn new(origin: impl Into<VertexId>, destination: impl Into<VertexId>, capacity: u64) -> Self {
        Self {
            id: None,
            origin: origin.into(),
            destination: destination.into(),
            capacity,
            usage: 0,
            priority: Priority::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RouteId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_usage(mut self, usage: u64) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.origin, self.destination)
    }
}

/// Partial update for a route. Only supplied fields change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEdit {
    #[serde(default)]
    pub capacity: Option<u64>,
    #[serde(default)]
    pub usage: Option<u64>,
    #[serde(default)]
    pub priority: Option<u8>,
}

impl RouteEdit {
    pub fn usage(usage: u64) -> Self {
        Self {
            usage: Some(usage),
            ..Self::default()
        }
    }

    pub fn priority(priority: u8) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn capacity(capacity: u64) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.capacity.is_none() && self.usage.is_none() && self.priority.is_none()
    }

    /// Validates every supplied field, then applies them. A rejected edit
    /// leaves `route` untouched.
    pub fn apply_to(&self, route: &mut Route) -> Result<()> {
        if self.capacity == Some(0) {
            return Err(RouteflowError::invalid_input(
                "Route capacity must be positive",
            ));
        }
        let priority = self.priority.map(Priority::new).transpose()?;

        if let Some(capacity) = self.capacity {
            route.capacity = capacity;
        }
        if let Some(usage) = self.usage {
            route.usage = usage;
        }
        if let Some(priority) = priority {
            route.priority = priority;
        }
        Ok(())
    }
}
