// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Identity mapping between sparse vertex ids and dense algorithm slots.
//!
//! Residual networks are dense `(V+2) x (V+2)` structures indexed by slot. The
//! network graph keys vertices by arbitrary `u64` ids, so every projection
//! carries a map between the two. Slots follow ascending id order, which keeps
//! BFS tie-breaking (and therefore path output) independent of hash order.

use routeflow_common::core::id::VertexId;

/// Sorted, deduplicated vertex ids. A vertex's slot is its rank.
///
/// # Example
///
/// ```ignore
/// let map: IdMap = [VertexId(20), VertexId(10), VertexId(20)].into_iter().collect();
///
/// assert_eq!(map.to_slot(VertexId(10)), Some(0));
/// assert_eq!(map.to_vertex(1), Some(VertexId(20)));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    slot_to_vertex: Vec<VertexId>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binary search; `None` for ids outside the projection.
    #[inline]
    pub fn to_slot(&self, id: VertexId) -> Option<u32> {
        self.slot_to_vertex
            .binary_search(&id)
            .ok()
            .map(|slot| slot as u32)
    }

    #[inline]
    pub fn to_vertex(&self, slot: u32) -> Option<VertexId> {
        self.slot_to_vertex.get(slot as usize).copied()
    }

    /// Panics if out of bounds.
    #[inline]
    pub fn to_vertex_unchecked(&self, slot: u32) -> VertexId {
        self.slot_to_vertex[slot as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slot_to_vertex.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot_to_vertex.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: VertexId) -> bool {
        self.to_slot(id).is_some()
    }

    /// (slot, id) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, VertexId)> + '_ {
        (0u32..).zip(self.slot_to_vertex.iter().copied())
    }
}

impl FromIterator<VertexId> for IdMap {
    fn from_iter<I: IntoIterator<Item = VertexId>>(iter: I) -> Self {
        let mut slot_to_vertex: Vec<VertexId> = iter.into_iter().collect();
        slot_to_vertex.sort_unstable();
        slot_to_vertex.dedup();
        Self { slot_to_vertex }
    }
}
