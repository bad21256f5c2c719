// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::core::id::{RouteId, VertexId};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteflowError {
    /// Rejected before any mutation: bad capacity, missing endpoint, malformed id.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Vertex '{id}' not found")]
    VertexNotFound { id: VertexId },

    /// Also returned for routes that were never assigned a persisted id.
    #[error("Route '{id}' not found")]
    RouteNotFound { id: RouteId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RouteflowError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// True for both vertex and route lookups that missed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VertexNotFound { .. } | Self::RouteNotFound { .. }
        )
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, RouteflowError>;
