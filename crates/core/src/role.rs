use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Roles a user can hold. Only signers may register a signature image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Signer,
    Viewer,
}

impl Role {
    /// Parse a role from a string, ignoring case.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "signer" => Some(Self::Signer),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Signer => "signer",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role may upload or replace a signature image.
    #[must_use]
    pub fn can_sign(self) -> bool {
        matches!(self, Self::Signer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| ParseError::Role(s.to_owned()))
    }
}
