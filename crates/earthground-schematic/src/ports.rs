use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bus::Bus;
use crate::component::Pin;
use crate::error::{Result, SchematicError};

/// What a port is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortBinding {
    Pin(Pin),
    Bus(Bus),
}

impl PortBinding {
    fn label(&self) -> &'static str {
        match self {
            PortBinding::Pin(_) => "pin",
            PortBinding::Bus(_) => "bus",
        }
    }

    /// Every pin behind this binding.
    pub fn pins(&self) -> Vec<&Pin> {
        match self {
            PortBinding::Pin(pin) => vec![pin],
            PortBinding::Bus(bus) => bus.pins().collect(),
        }
    }
}

impl From<Pin> for PortBinding {
    fn from(pin: Pin) -> Self {
        PortBinding::Pin(pin)
    }
}

impl From<&Pin> for PortBinding {
    fn from(pin: &Pin) -> Self {
        PortBinding::Pin(pin.clone())
    }
}

impl From<Bus> for PortBinding {
    fn from(bus: Bus) -> Self {
        PortBinding::Bus(bus)
    }
}

/// The external interface of a design: a closed set of port names declared at
/// construction, each optionally bound to a pin or bus.
///
/// Names are case-insensitive and stored lower-case. Bindings can only be set
/// through [`crate::Design::set_port`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ports {
    names: Vec<String>,
    bindings: HashMap<String, PortBinding>,
}

impl Ports {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut declared: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().to_lowercase();
            if !declared.contains(&name) {
                declared.push(name);
            }
        }
        Self {
            names: declared,
            bindings: HashMap::new(),
        }
    }

    /// Declared port names, in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn key(&self, name: &str) -> Result<String> {
        let key = name.to_lowercase();
        if self.names.contains(&key) {
            Ok(key)
        } else {
            Err(SchematicError::UnknownPort {
                name: name.to_owned(),
                options: self.names.clone(),
            })
        }
    }

    /// The binding for `name`, or `None` if the port is declared but unset.
    pub fn get(&self, name: &str) -> Result<Option<&PortBinding>> {
        let key = self.key(name)?;
        Ok(self.bindings.get(&key))
    }

    fn bound(&self, name: &str) -> Result<&PortBinding> {
        self.get(name)?
            .ok_or_else(|| SchematicError::UnboundPort(name.to_lowercase()))
    }

    pub fn pin(&self, name: &str) -> Result<&Pin> {
        match self.bound(name)? {
            PortBinding::Pin(pin) => Ok(pin),
            other => Err(SchematicError::PortKind {
                name: name.to_lowercase(),
                expected: "pin",
                found: other.label(),
            }),
        }
    }

    pub fn bus(&self, name: &str) -> Result<&Bus> {
        match self.bound(name)? {
            PortBinding::Bus(bus) => Ok(bus),
            other => Err(SchematicError::PortKind {
                name: name.to_lowercase(),
                expected: "bus",
                found: other.label(),
            }),
        }
    }

    /// Declared ports with their bindings, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&PortBinding>)> {
        self.names
            .iter()
            .map(|name| (name.as_str(), self.bindings.get(name)))
    }

    pub(crate) fn bind(&mut self, name: &str, binding: PortBinding) -> Result<()> {
        let key = self.key(name)?;
        self.bindings.insert(key, binding);
        Ok(())
    }

    /// Binding keys that were never declared, sorted.
    pub(crate) fn undeclared(&self) -> Vec<String> {
        let mut extra: Vec<String> = self
            .bindings
            .keys()
            .filter(|key| !self.names.contains(key))
            .cloned()
            .collect();
        extra.sort();
        extra
    }

    #[cfg(test)]
    pub(crate) fn bindings_mut(&mut self) -> &mut HashMap<String, PortBinding> {
        &mut self.bindings
    }
}
