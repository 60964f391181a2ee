use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = i64))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Return the raw database identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

newtype_id!(UserId, "Identifies a registered user.");
newtype_id!(DocumentId, "Identifies an uploaded source document.");
newtype_id!(SignatureId, "Identifies a signer's signature image.");
newtype_id!(RoundId, "Identifies a signing round (one edited document snapshot).");
newtype_id!(StatusId, "Identifies a single signer's status row within a round.");
newtype_id!(LogId, "Identifies a verification log entry.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_i64() {
        let id = RoundId::from(42);
        assert_eq!(id.get(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn id_displays_raw_value() {
        assert_eq!(SignatureId::new(7).to_string(), "7");
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&StatusId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: StatusId = serde_json::from_str("3").unwrap();
        assert_eq!(back, StatusId::new(3));
    }
}
