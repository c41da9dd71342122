//! Typed string identifiers.
//!
//! Identifiers are opaque strings minted by an `IdGenerator` (or supplied by
//! seed data). Each entity gets its own newtype so a `StudentId` can never be
//! passed where a `TeacherId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the raw identifier string.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Returns whether the identifier is empty after trimming.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// School identifier.
    SchoolId
);
string_id!(
    /// Grade (year level) identifier.
    GradeId
);
string_id!(
    /// Class identifier.
    ClassId
);
string_id!(
    /// Teacher identifier.
    TeacherId
);
string_id!(
    /// Student identifier.
    StudentId
);
string_id!(
    /// Test identifier.
    TestId
);
string_id!(
    /// Question identifier.
    QuestionId
);
string_id!(
    /// Answer identifier.
    AnswerId
);
string_id!(
    /// Grading result identifier.
    ResultId
);

#[cfg(test)]
mod tests {
    use super::{StudentId, TestId};

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = TestId::new("test-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"test-1\"");
        let back: TestId = serde_json::from_str("\"test-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn blank_detection_trims_whitespace() {
        assert!(StudentId::new("  ").is_blank());
        assert!(!StudentId::new(" s1 ").is_blank());
    }
}
