use crate::error::{ModelError, Result};

use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Builds the identifier, rejecting blank input.
            pub fn parse(raw: impl Into<String>) -> Result<Self> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(ModelError::EmptyIdentifier($kind));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier assigned to a camera by the camera registry (`cam_01`).
    CameraId,
    "camera"
);

string_id!(
    /// Identifier of a single inbound event.
    EventId,
    "event"
);

string_id!(
    /// Identifier of a triage queue item.
    TaskId,
    "task"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert_eq!(
            CameraId::parse("   "),
            Err(ModelError::EmptyIdentifier("camera"))
        );
        assert!(TaskId::parse("task_123").is_ok());
    }

    #[test]
    fn ids_can_be_looked_up_by_str() {
        let mut map = HashMap::new();
        map.insert(CameraId::from("cam_01"), 1);
        assert_eq!(map.get("cam_01"), Some(&1));
    }
}
