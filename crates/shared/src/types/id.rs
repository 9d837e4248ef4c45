//! Typed IDs for type-safe entity references.
//!
//! Every entity is keyed by a store-assigned integer. Wrapping the key prevents
//! accidentally passing a `UserId` where a `TenantId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw store key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw store key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant (the unit of data isolation).");
typed_id!(UserId, "Unique identifier for a user.");
typed_id!(VoucherId, "Unique identifier for a voucher.");
typed_id!(PostingId, "Unique identifier for a posting.");
typed_id!(ProjectId, "Unique identifier for a project.");
typed_id!(ActivityId, "Unique identifier for an activity.");
typed_id!(TimesheetEntryId, "Unique identifier for a timesheet entry.");
