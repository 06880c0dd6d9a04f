//! Identifier newtypes for the weekly task domain.
//!
//! Users and task types belong to the external organisational catalog; the
//! core only carries their identifiers as opaque foreign keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $subject:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $subject, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $subject, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a weekly task record.
    TaskId,
    "task"
);

uuid_identifier!(
    /// Unique identifier for a task review.
    ReviewId,
    "review"
);

uuid_identifier!(
    /// Identifier of a person in the external organisational catalog.
    UserId,
    "user"
);

uuid_identifier!(
    /// Identifier of a standard task type in the external responsibility
    /// catalog.
    TaskTypeId,
    "task type"
);

uuid_identifier!(
    /// Unique identifier for a manager's comment on a weekly report.
    CommentId,
    "comment"
);
