//! Identity types.
//!
//! All identifiers are strings that are:
//! - Unique within their namespace
//! - Ordered lexicographically (evaluation and report order depend on it)
//! - Supplied by configuration or input data, never generated

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an entity instance in one run's graph.
    EntityId
);

string_id!(
    /// Identifier of an ontology class.
    ClassId
);

string_id!(
    /// Canonical identifier of a property definition.
    PropertyId
);

string_id!(
    /// Identifier of a constraint intent.
    ConstraintId
);

string_id!(
    /// Identifier of a requirement set.
    RequirementSetId
);

string_id!(
    /// Name of a quantity kind (power, torque, rotational_speed, ...).
    QuantityKind
);
