//! Domain types for the Routemaster API.
//!
//! # Design
//! Identifiers are string newtypes so a state machine name cannot be passed
//! where a label name is expected. They serialize transparently, so they read
//! and write as plain JSON strings. Every type here is a value: equality is
//! structural and nothing is mutated after construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A decoded JSON object, passed through without interpretation.
pub type Json = serde_json::Map<String, serde_json::Value>;

/// Arbitrary JSON object attached to a label. The client enforces no schema.
pub type Metadata = Json;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

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
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_newtype!(
    /// Name of a label within a state machine.
    LabelName
);

string_newtype!(
    /// Name of a state machine known to the server.
    StateMachine
);

string_newtype!(
    /// A state in a state machine's graph. Always supplied by the server and
    /// taken as-is: an empty string is not rejected.
    State
);

/// Identity of a label: its name plus the state machine it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelRef {
    pub name: LabelName,
    pub state_machine: StateMachine,
}

impl LabelRef {
    pub fn new(name: impl Into<LabelName>, state_machine: impl Into<StateMachine>) -> Self {
        Self {
            name: name.into(),
            state_machine: state_machine.into(),
        }
    }
}

impl fmt::Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state_machine, self.name)
    }
}

/// Snapshot of a label's server-side state at the time of a fetch or mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub label_ref: LabelRef,
    pub metadata: Metadata,
    pub state: State,
}

/// Request payload for creating or updating a label.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MetadataBody<'a> {
    pub metadata: &'a Metadata,
}

/// Body of a single-label response.
#[derive(Debug, Deserialize)]
pub(crate) struct LabelBody {
    pub metadata: Metadata,
    pub state: State,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedEntry<T> {
    pub name: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateMachineList {
    #[serde(rename = "state-machines")]
    pub state_machines: Vec<NamedEntry<StateMachine>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelList {
    pub labels: Vec<NamedEntry<LabelName>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_refs_compare_structurally() {
        let a = LabelRef::new("foo", "machine");
        let b = LabelRef::new(LabelName::new("foo"), StateMachine::new("machine"));
        assert_eq!(a, b);
        assert_ne!(a, LabelRef::new("foo", "other-machine"));
        assert_ne!(a, LabelRef::new("bar", "machine"));
    }

    #[test]
    fn label_ref_display() {
        assert_eq!(LabelRef::new("foo", "machine").to_string(), "machine/foo");
    }

    #[test]
    fn newtypes_serialize_as_plain_strings() {
        let json = serde_json::to_value(StateMachine::new("m1")).unwrap();
        assert_eq!(json, serde_json::json!("m1"));
        let back: LabelName = serde_json::from_str(r#""first-label""#).unwrap();
        assert_eq!(back, "first-label");
    }

    #[test]
    fn state_machine_list_ignores_extra_keys() {
        let list: StateMachineList = serde_json::from_str(
            r#"{"state-machines":[{"name":"m1","labels":"/state-machines/m1/labels"}]}"#,
        )
        .unwrap();
        assert_eq!(list.state_machines.len(), 1);
        assert_eq!(list.state_machines[0].name, "m1");
    }
}
