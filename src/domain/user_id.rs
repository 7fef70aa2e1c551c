//! Opaque reference to the user owning diary entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest identifier accepted from the upstream auth layer.
pub const MAX_USER_ID_LEN: usize = 128;

/// Owner of a diary entry; the partition key for every query.
///
/// The diary never interprets the value. It arrives already authenticated
/// from the layer in front of the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Accepts a trimmed, non-empty identifier of at most
    /// [`MAX_USER_ID_LEN`] characters.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_USER_ID_LEN {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Borrowed identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
