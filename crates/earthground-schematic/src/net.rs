use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::component::Pin;

slotmap::new_key_type! {
    /// Stable handle to a [`Net`] inside one design's arena. Survives renames.
    pub struct NetId;
}

/// One electrical node: a name plus the set of pins on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    name: String,
    connections: BTreeSet<Pin>,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connections: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connections(&self) -> &BTreeSet<Pin> {
        &self.connections
    }

    pub fn contains(&self, pin: &Pin) -> bool {
        self.connections.contains(pin)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn insert(&mut self, pin: Pin) -> bool {
        self.connections.insert(pin)
    }

    pub(crate) fn absorb(&mut self, other: Net) {
        self.connections.extend(other.connections);
    }
}

impl std::fmt::Display for Net {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
