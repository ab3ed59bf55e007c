use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchematicError};
use crate::footprint::{Footprint, PassiveKind};
use crate::values::SiValue;

/// Reference designator, e.g. `R1` or `U3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Refdes {
    pub prefix: String,
    pub index: u32,
}

impl Refdes {
    pub fn new(prefix: impl Into<String>, index: u32) -> Self {
        Self {
            prefix: prefix.into(),
            index,
        }
    }
}

impl std::fmt::Display for Refdes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.prefix, self.index)
    }
}

/// Hands out reference designators, one counter per prefix.
///
/// Cloning yields another handle to the *same* counters, so a parent design
/// and the generators building its modules can share one numbering space.
#[derive(Debug, Clone, Default)]
pub struct RefdesRegistry {
    counters: Arc<Mutex<HashMap<String, u32>>>,
}

impl RefdesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate the next designator for `prefix`, starting at 1.
    pub fn next(&self, prefix: &str) -> Refdes {
        let mut counters = self.counters();
        let counter = counters.entry(prefix.to_owned()).or_default();
        *counter += 1;
        Refdes::new(prefix, *counter)
    }

    /// Number of designators handed out so far for `prefix`.
    pub fn count(&self, prefix: &str) -> u32 {
        self.counters().get(prefix).copied().unwrap_or(0)
    }

    /// Whether two handles share the same counters.
    pub fn same_as(&self, other: &RefdesRegistry) -> bool {
        Arc::ptr_eq(&self.counters, &other.counters)
    }
}

/// Physical key of a pin on its package: a pad number or a label like `M1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinIndex {
    Number(u32),
    Label(String),
}

impl std::fmt::Display for PinIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinIndex::Number(n) => write!(f, "{n}"),
            PinIndex::Label(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for PinIndex {
    fn from(n: u32) -> Self {
        PinIndex::Number(n)
    }
}

impl From<&str> for PinIndex {
    fn from(s: &str) -> Self {
        PinIndex::Label(s.to_owned())
    }
}

impl From<String> for PinIndex {
    fn from(s: String) -> Self {
        PinIndex::Label(s)
    }
}

/// A terminal of exactly one component.
///
/// Equality, ordering and hashing only consider `(owner, name)`: two handles
/// with the same name on the same component are the same electrical pin,
/// whatever their index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    name: String,
    index: PinIndex,
    owner: Refdes,
}

impl Pin {
    pub fn new(name: impl Into<String>, index: impl Into<PinIndex>, owner: &Refdes) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
            owner: owner.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &PinIndex {
        &self.index
    }

    pub fn owner(&self) -> &Refdes {
        &self.owner
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl Eq for Pin {}

impl Hash for Pin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Pin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.owner
            .cmp(&other.owner)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} ({})", self.owner, self.index, self.name)
    }
}

/// The pins of one component, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinContainer {
    owner: Option<Refdes>,
    pins: Vec<Pin>,
}

impl PinContainer {
    /// Build from `(index, name)` pairs.
    pub fn from_pairs<I, K, N>(owner: &Refdes, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<PinIndex>,
        N: Into<String>,
    {
        Self {
            owner: Some(owner.clone()),
            pins: pairs
                .into_iter()
                .map(|(index, name)| Pin::new(name, index, owner))
                .collect(),
        }
    }

    /// Build from a list of names; indices count up from 0.
    pub fn from_names<I, N>(owner: &Refdes, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::from_pairs(
            owner,
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (i as u32, name)),
        )
    }

    /// `count` pins named and numbered `1..=count`.
    pub fn from_count(owner: &Refdes, count: u32) -> Self {
        Self::from_pairs(owner, (1..=count).map(|i| (i, i.to_string())))
    }

    fn owner_label(&self) -> String {
        self.owner
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "<no owner>".to_owned())
    }

    /// Look a pin up by name. With duplicated names the last one wins.
    pub fn by_name(&self, name: &str) -> Result<&Pin> {
        self.pins
            .iter()
            .rev()
            .find(|p| p.name == name)
            .ok_or_else(|| SchematicError::UnknownPin {
                component: self.owner_label(),
                key: name.to_owned(),
                options: self.pins.iter().map(|p| p.name.clone()).collect(),
            })
    }

    /// Look a pin up by index. With duplicated indices the last one wins.
    pub fn by_index(&self, index: impl Into<PinIndex>) -> Result<&Pin> {
        let index = index.into();
        self.pins
            .iter()
            .rev()
            .find(|p| p.index == index)
            .ok_or_else(|| SchematicError::UnknownPin {
                component: self.owner_label(),
                key: index.to_string(),
                options: self.pins.iter().map(|p| p.index.to_string()).collect(),
            })
    }

    /// All pins whose name is one of `names`.
    pub fn all_with_name<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a Pin> + 'a {
        self.pins.iter().filter(move |p| names.contains(&p.name.as_str()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pin> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<'a> IntoIterator for &'a PinContainer {
    type Item = &'a Pin;
    type IntoIter = std::slice::Iter<'a, Pin>;

    fn into_iter(self) -> Self::IntoIter {
        self.pins.iter()
    }
}

/// What sort of part a [`Component`] is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    Generic,
    Resistor { resistance: SiValue },
    Capacitor { capacitance: SiValue, voltage: SiValue },
}

impl ComponentKind {
    pub fn passive_kind(&self) -> Option<PassiveKind> {
        match self {
            ComponentKind::Generic => None,
            ComponentKind::Resistor { .. } => Some(PassiveKind::Resistor),
            ComponentKind::Capacitor { .. } => Some(PassiveKind::Capacitor),
        }
    }
}

/// A device placed in a design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    refdes: Refdes,
    name: String,
    kind: ComponentKind,
    mpn: Option<String>,
    description: Option<String>,
    parameters: BTreeMap<String, String>,
    pins: PinContainer,
    footprint: Option<Footprint>,
    parent: Option<String>,
}

impl Component {
    /// A generic part with the next designator for `prefix` and no pins yet.
    pub fn new(registry: &RefdesRegistry, prefix: &str) -> Self {
        let refdes = registry.next(prefix);
        Self {
            pins: PinContainer {
                owner: Some(refdes.clone()),
                pins: Vec::new(),
            },
            refdes,
            name: String::new(),
            kind: ComponentKind::Generic,
            mpn: None,
            description: None,
            parameters: BTreeMap::new(),
            footprint: None,
            parent: None,
        }
    }

    /// A two-pin resistor named `RES_<value>`.
    pub fn resistor(registry: &RefdesRegistry, resistance: SiValue) -> Self {
        let name = format!("RES_{resistance}");
        let mut component = Self::new(registry, "R")
            .with_name(name.clone())
            .with_description(name)
            .with_pin_count(2);
        component.kind = ComponentKind::Resistor { resistance };
        component
    }

    /// A two-pin capacitor named `CAP_<value>_<voltage>`.
    pub fn capacitor(registry: &RefdesRegistry, capacitance: SiValue, voltage: SiValue) -> Self {
        let name = format!("CAP_{capacitance}_{voltage}");
        let mut component = Self::new(registry, "C")
            .with_name(name.clone())
            .with_description(name)
            .with_pin_count(2);
        component.kind = ComponentKind::Capacitor {
            capacitance,
            voltage,
        };
        component
    }

    // Builder-style mutators ---------------------------------------------------

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mpn(mut self, mpn: impl Into<String>) -> Self {
        self.mpn = Some(mpn.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Replace the pins with `(index, name)` pairs.
    pub fn with_pin_map<I, K, N>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<PinIndex>,
        N: Into<String>,
    {
        self.pins = PinContainer::from_pairs(&self.refdes, pairs);
        self
    }

    /// Replace the pins with `names`, indexed from 0.
    pub fn with_pin_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.pins = PinContainer::from_names(&self.refdes, names);
        self
    }

    /// Replace the pins with `count` pins named and numbered from 1.
    pub fn with_pin_count(mut self, count: u32) -> Self {
        self.pins = PinContainer::from_count(&self.refdes, count);
        self
    }

    // Accessors ----------------------------------------------------------------

    pub fn refdes(&self) -> &Refdes {
        &self.refdes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn mpn(&self) -> Option<&str> {
        self.mpn.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn pins(&self) -> &PinContainer {
        &self.pins
    }

    pub fn pin(&self, name: &str) -> Result<&Pin> {
        self.pins.by_name(name)
    }

    pub fn pin_at(&self, index: impl Into<PinIndex>) -> Result<&Pin> {
        self.pins.by_index(index)
    }

    pub fn footprint(&self) -> Option<&Footprint> {
        self.footprint.as_ref()
    }

    pub fn set_footprint(&mut self, footprint: Footprint) {
        self.footprint = Some(footprint);
    }

    pub fn is_passive(&self) -> bool {
        self.kind.passive_kind().is_some()
    }

    /// Name of the design this component was admitted to, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, design: &str) {
        self.parent = Some(design.to_owned());
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{}>", self.name, self.refdes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_counts_per_prefix() {
        let registry = RefdesRegistry::new();
        assert_eq!(registry.next("R").to_string(), "R1");
        assert_eq!(registry.next("R").to_string(), "R2");
        assert_eq!(registry.next("U").to_string(), "U1");
        assert_eq!(registry.count("R"), 2);

        let shared = registry.clone();
        assert!(shared.same_as(&registry));
        assert_eq!(shared.next("R").to_string(), "R3");

        // A separate registry starts from scratch.
        assert_eq!(RefdesRegistry::new().next("R").to_string(), "R1");
    }

    #[test]
    fn pin_identity_ignores_index() {
        let owner = Refdes::new("U", 1);
        let a = Pin::new("GND", 12u32, &owner);
        let b = Pin::new("GND", 25u32, &owner);
        let other = Pin::new("GND", 12u32, &Refdes::new("U", 2));
        assert_eq!(a, b);
        assert_ne!(a, other);

        let set: HashSet<Pin> = [a, b, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn pin_lookup_reports_options() {
        let registry = RefdesRegistry::new();
        let part = Component::new(&registry, "U").with_pin_map([(1u32, "VCC"), (2, "GND")]);
        assert_eq!(part.pin("GND").unwrap().index(), &PinIndex::Number(2));
        assert_eq!(part.pin_at(1u32).unwrap().name(), "VCC");

        match part.pin("SDA") {
            Err(SchematicError::UnknownPin { key, options, .. }) => {
                assert_eq!(key, "SDA");
                assert_eq!(options, vec!["VCC".to_owned(), "GND".to_owned()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(part.pin_at("M1").is_err());
    }

    #[test]
    fn pin_containers() {
        let owner = Refdes::new("J", 1);
        let counted = PinContainer::from_count(&owner, 3);
        assert_eq!(counted.len(), 3);
        assert_eq!(counted.by_index(3u32).unwrap().name(), "3");

        let named = PinContainer::from_names(&owner, ["A", "B", "A"]);
        assert_eq!(named.by_name("A").unwrap().index(), &PinIndex::Number(2));
        assert_eq!(named.all_with_name(&["A"]).count(), 2);

        let remapped = PinContainer::from_pairs(&owner, [(1u32, "EN"), (2, "OUT"), (1, "SHDN")]);
        assert_eq!(remapped.by_index(1u32).unwrap().name(), "SHDN");
        assert_eq!(remapped.by_name("SHDN").unwrap().index(), &PinIndex::Number(1));
    }

    #[test]
    fn passives() {
        let registry = RefdesRegistry::new();
        let r = Component::resistor(&registry, SiValue::ohms("1k").unwrap());
        assert_eq!(r.refdes().to_string(), "R1");
        assert_eq!(r.name(), "RES_1kΩ");
        assert!(r.is_passive());
        assert_eq!(r.pins().len(), 2);

        let c = Component::capacitor(
            &registry,
            SiValue::farads("1u").unwrap(),
            SiValue::volts("10").unwrap(),
        );
        assert_eq!(c.refdes().to_string(), "C1");
        assert_eq!(c.name(), "CAP_1uF_10V");
        assert_eq!(c.kind().passive_kind(), Some(PassiveKind::Capacitor));
    }
}
