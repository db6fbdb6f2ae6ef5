//! Entity identifiers
//!
//! Every entity is keyed by a UUIDv7, which sorts chronologically and needs no
//! coordination to generate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its UUID string form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid {} '{}': {}", stringify!($name), s, e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_string(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id! {
    /// Identifier of an uploaded document
    DocumentId
}

define_id! {
    /// Identifier of a user-authored extraction schema
    SchemaId
}

define_id! {
    /// Identifier of a processing job
    JobId
}

define_id! {
    /// Identifier of a schema suggestion request
    SuggestionId
}
