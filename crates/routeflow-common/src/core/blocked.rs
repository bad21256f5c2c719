// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Blocked-route overlay.
//!
//! Blocking is orthogonal to the graph data: a blocked route keeps its capacity
//! and usage, it is only excluded from flow computation and classification.

use crate::core::id::{RouteKey, VertexId};
use crate::core::model::Route;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockedSet {
    keys: BTreeSet<RouteKey>,
}

impl BlockedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `key`. Returns `true` if the key is now blocked.
    pub fn toggle(&mut self, key: RouteKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    /// Returns `true` if the key was newly blocked.
    pub fn block(&mut self, key: RouteKey) -> bool {
        self.keys.insert(key)
    }

    /// Returns `true` if the key was blocked before.
    pub fn unblock(&mut self, key: RouteKey) -> bool {
        self.keys.remove(&key)
    }

    #[inline]
    pub fn contains(&self, key: RouteKey) -> bool {
        self.keys.contains(&key)
    }

    #[inline]
    pub fn is_blocked(&self, origin: VertexId, destination: VertexId) -> bool {
        self.contains(RouteKey::new(origin, destination))
    }

    /// A route is active for flow purposes iff its key is not blocked.
    #[inline]
    pub fn is_active(&self, route: &Route) -> bool {
        !self.contains(route.key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Keys in ascending `(origin, destination)` order.
    pub fn iter(&self) -> impl Iterator<Item = RouteKey> + '_ {
        self.keys.iter().copied()
    }

    /// Canonical `"origin-destination"` strings, sorted by key.
    pub fn to_strings(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.to_string()).collect()
    }
}

impl FromIterator<RouteKey> for BlockedSet {
    fn from_iter<I: IntoIterator<Item = RouteKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
