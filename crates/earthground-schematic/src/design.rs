use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use slotmap::SlotMap;

use crate::bus::{Bus, BusKind};
use crate::component::{Component, Pin, Refdes, RefdesRegistry};
use crate::config::DesignConfig;
use crate::error::{Result, SchematicError};
use crate::footprint::{Footprint, PassiveSize};
use crate::net::{Net, NetId};
use crate::ports::{PortBinding, Ports};
use crate::values::{SiValue, OHM};

/// One schematic page: components, the nets joining their pins, and any
/// embedded child designs.
///
/// Nets live in an arena addressed by [`NetId`]; the name table only maps
/// names to handles, so renaming never invalidates a handle. Every pin is a
/// member of at most one net of a given design.
#[derive(Debug, Clone)]
pub struct Design {
    name: String,
    short_name: String,
    registry: RefdesRegistry,
    components: BTreeMap<Refdes, Component>,
    nets: SlotMap<NetId, Net>,
    net_names: BTreeMap<String, NetId>,
    pin_to_net: HashMap<Pin, NetId>,
    modules: Vec<Design>,
    bus_counters: HashMap<BusKind, u32>,
    module_counters: HashMap<String, u32>,
    default_passive_size: Option<PassiveSize>,
    ground: String,
    port: Ports,
}

/// The value or part to place with [`Design::add_series_res`].
#[derive(Debug, Clone)]
pub enum SeriesResistor {
    Value(SiValue),
    Part(Component),
}

impl From<SiValue> for SeriesResistor {
    fn from(value: SiValue) -> Self {
        SeriesResistor::Value(value)
    }
}

impl From<Component> for SeriesResistor {
    fn from(part: Component) -> Self {
        SeriesResistor::Part(part)
    }
}

impl From<u32> for SeriesResistor {
    fn from(ohms: u32) -> Self {
        SeriesResistor::Value(SiValue::new(ohms as f64, OHM))
    }
}

impl From<f64> for SeriesResistor {
    fn from(ohms: f64) -> Self {
        SeriesResistor::Value(SiValue::new(ohms, OHM))
    }
}

/// Fluent constructor for [`Design`].
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    name: String,
    short_name: Option<String>,
    ports: Vec<String>,
    registry: Option<RefdesRegistry>,
    config: DesignConfig,
}

impl DesignBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            ports: Vec::new(),
            registry: None,
            config: DesignConfig::default(),
        }
    }

    /// Prefix used for this design's nets when it is embedded as a module.
    /// Defaults to the name.
    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ports = ports.into_iter().map(Into::into).collect();
        self
    }

    /// Share designator counters with another design.
    pub fn registry(mut self, registry: &RefdesRegistry) -> Self {
        self.registry = Some(registry.clone());
        self
    }

    pub fn config(mut self, config: DesignConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_passive_size(mut self, size: PassiveSize) -> Self {
        self.config.default_passive_size = Some(size);
        self
    }

    pub fn build(self) -> Design {
        let short_name = self.short_name.unwrap_or_else(|| self.name.clone());
        let ground = self.config.ground_net().to_owned();
        let mut design = Design {
            name: self.name,
            short_name,
            registry: self.registry.unwrap_or_default(),
            components: BTreeMap::new(),
            nets: SlotMap::with_key(),
            net_names: BTreeMap::new(),
            pin_to_net: HashMap::new(),
            modules: Vec::new(),
            bus_counters: HashMap::new(),
            module_counters: HashMap::new(),
            default_passive_size: self.config.default_passive_size,
            ground: ground.clone(),
            port: Ports::new(&self.ports),
        };
        design.add_net(&ground);
        design
    }
}

impl From<DesignBuilder> for Design {
    fn from(builder: DesignBuilder) -> Self {
        builder.build()
    }
}

impl Design {
    /// A design with no ports and a fresh designator registry.
    pub fn new(name: impl Into<String>) -> Self {
        DesignBuilder::new(name).build()
    }

    pub fn builder(name: impl Into<String>) -> DesignBuilder {
        DesignBuilder::new(name)
    }

    // Inspection ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn registry(&self) -> &RefdesRegistry {
        &self.registry
    }

    /// Components owned directly by this design, ordered by designator.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component(&self, refdes: &Refdes) -> Option<&Component> {
        self.components.get(refdes)
    }

    /// This design's components followed by those of every nested module.
    pub fn all_components(&self) -> Vec<&Component> {
        let mut all: Vec<&Component> = self.components.values().collect();
        for module in &self.modules {
            all.extend(module.all_components());
        }
        all
    }

    /// Nets of this design's own table, ordered by name.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.net_names
            .values()
            .filter_map(|id| self.nets.get(*id))
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.net_id(name).and_then(|id| self.nets.get(id))
    }

    pub fn net_id(&self, name: &str) -> Option<NetId> {
        self.net_names.get(name).copied()
    }

    pub fn net_by_id(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id)
    }

    /// The net `pin` belongs to in this design's tables.
    pub fn net_of(&self, pin: &Pin) -> Option<&Net> {
        self.pin_to_net.get(pin).and_then(|id| self.nets.get(*id))
    }

    pub fn pin_to_net(&self) -> impl Iterator<Item = (&Pin, &Net)> {
        self.pin_to_net
            .iter()
            .filter_map(|(pin, id)| self.nets.get(*id).map(|net| (pin, net)))
    }

    pub fn modules(&self) -> &[Design] {
        &self.modules
    }

    /// Name of the net decoupling capacitors return to.
    pub fn ground(&self) -> &str {
        &self.ground
    }

    pub fn port(&self) -> &Ports {
        &self.port
    }

    pub fn default_passive_size(&self) -> Option<PassiveSize> {
        self.default_passive_size
    }

    pub fn set_default_passive_size(&mut self, size: Option<PassiveSize>) {
        self.default_passive_size = size;
    }

    // Admission ----------------------------------------------------------------

    /// Whether a component with this designator lives here or in a nested module.
    pub fn contains_component(&self, refdes: &Refdes) -> bool {
        self.components.contains_key(refdes)
            || self.modules.iter().any(|m| m.contains_component(refdes))
    }

    /// The component with this designator, here or in a nested module.
    pub fn find_component(&self, refdes: &Refdes) -> Option<&Component> {
        self.components
            .get(refdes)
            .or_else(|| self.modules.iter().find_map(|m| m.find_component(refdes)))
    }

    /// `pin` must be one of the pins of an admitted component. A pin whose
    /// name exists under another index belongs to a different part that
    /// happens to share the designator.
    fn ensure_admitted(&self, pin: &Pin) -> Result<()> {
        let component = self
            .find_component(pin.owner())
            .ok_or_else(|| SchematicError::FloatingPart(pin.owner().clone()))?;
        if component
            .pins()
            .iter()
            .any(|p| p.name() == pin.name() && p.index() == pin.index())
        {
            return Ok(());
        }
        component.pin(pin.name())?;
        Err(SchematicError::FloatingPart(pin.owner().clone()))
    }

    fn admitted(&self, refdes: &Refdes) -> Result<&Component> {
        self.components
            .get(refdes)
            .ok_or_else(|| SchematicError::FloatingPart(refdes.clone()))
    }

    /// Take ownership of `component`. Passive parts without a footprint get
    /// the default package when a size policy is set.
    pub fn add_component(&mut self, mut component: Component) -> Result<&Component> {
        if let Some(design) = component.parent() {
            return Err(SchematicError::AlreadyAdded {
                refdes: component.refdes().clone(),
                design: design.to_owned(),
            });
        }
        if self.components.contains_key(component.refdes()) {
            return Err(SchematicError::DuplicateComponent {
                refdes: component.refdes().clone(),
                design: self.name.clone(),
            });
        }
        if let Some(size) = self.default_passive_size {
            assign_passive_footprint(&mut component, size)?;
        }

        info!("Adding component {component} to {}", self.name);
        component.set_parent(&self.name);
        let refdes = component.refdes().clone();
        Ok(self.components.entry(refdes).or_insert(component))
    }

    /// Embed `child` as a module.
    ///
    /// The child's short name becomes `<short_name><n>`, where `n` counts
    /// earlier modules with the same short name, and each of its nets is
    /// renamed to `<prefix>_<name>`. The child's nets stay in its own table.
    ///
    /// If the child holds a passive the default package size cannot cover,
    /// nothing changes and the child comes back in
    /// [`SchematicError::RejectedModule`].
    pub fn add_module(&mut self, mut child: Design) -> Result<&Design> {
        if let Some(size) = self.default_passive_size {
            if let Err(source) = child.check_passive_packages(size) {
                return Err(SchematicError::RejectedModule {
                    name: child.name.clone(),
                    source: Box::new(source),
                    module: Box::new(child),
                });
            }
            child.assign_passive_footprints(size)?;
        }

        let count = self
            .module_counters
            .entry(child.short_name.clone())
            .or_default();
        let prefix = format!("{}{}", child.short_name, count);
        *count += 1;

        child.prefix_nets(&prefix);
        child.short_name = prefix;

        info!(
            "Adding module {} ({}) to {}",
            child.short_name, child.name, self.name
        );
        let index = self.modules.len();
        self.modules.push(child);
        Ok(&self.modules[index])
    }

    fn check_passive_packages(&self, size: PassiveSize) -> Result<()> {
        for component in self.all_components() {
            if component.footprint().is_some() {
                continue;
            }
            if let Some(kind) = component.kind().passive_kind() {
                Footprint::passive_smd(kind, size)?;
            }
        }
        Ok(())
    }

    fn assign_passive_footprints(&mut self, size: PassiveSize) -> Result<()> {
        for component in self.components.values_mut() {
            assign_passive_footprint(component, size)?;
        }
        for module in &mut self.modules {
            module.assign_passive_footprints(size)?;
        }
        Ok(())
    }

    fn prefix_nets(&mut self, prefix: &str) {
        let names = std::mem::take(&mut self.net_names);
        for (name, id) in names {
            let renamed = format!("{prefix}_{name}");
            if let Some(net) = self.nets.get_mut(id) {
                net.rename(renamed.clone());
            }
            self.net_names.insert(renamed, id);
        }
        self.ground = format!("{prefix}_{}", self.ground);
    }

    /// Bind a declared port to a pin or bus of this design.
    pub fn set_port(&mut self, name: &str, binding: impl Into<PortBinding>) -> Result<()> {
        let binding = binding.into();
        for pin in binding.pins() {
            self.ensure_admitted(pin)?;
        }
        self.port.bind(name, binding)
    }

    // Nets ---------------------------------------------------------------------

    /// Get or create the net called `name`.
    pub fn add_net(&mut self, name: &str) -> NetId {
        if let Some(id) = self.net_names.get(name) {
            return *id;
        }
        let id = self.nets.insert(Net::new(name));
        self.net_names.insert(name.to_owned(), id);
        id
    }

    /// Put `pin` on the net called `net_name`, creating it if needed.
    ///
    /// If the pin already sits on another net, that whole net is renamed to
    /// `net_name` and merged with whatever was already there.
    pub fn join_net(&mut self, pin: &Pin, net_name: &str) -> Result<NetId> {
        self.ensure_admitted(pin)?;
        let target = self.add_net(net_name);

        match self.pin_to_net.get(pin).copied() {
            None => {
                if let Some(net) = self.nets.get_mut(target) {
                    net.insert(pin.clone());
                }
                self.pin_to_net.insert(pin.clone(), target);
                Ok(target)
            }
            Some(current) if current == target => Ok(target),
            Some(current) => Ok(self.rename_net(current, net_name)),
        }
    }

    /// Rename a net. If `new_name` is taken, the two nets are merged.
    pub fn change_net_name(&mut self, old_name: &str, new_name: &str) -> Result<NetId> {
        let id = self
            .net_id(old_name)
            .ok_or_else(|| SchematicError::UnknownNet {
                name: old_name.to_owned(),
                options: self.net_names.keys().cloned().collect(),
            })?;
        Ok(self.rename_net(id, new_name))
    }

    fn rename_net(&mut self, id: NetId, new_name: &str) -> NetId {
        let old_name = match self.nets.get(id) {
            Some(net) if net.name() != new_name => net.name().to_owned(),
            _ => return id,
        };
        warn!("Overwriting net {old_name} to {new_name}");

        self.net_names.remove(&old_name);
        if let Some(existing) = self.net_names.insert(new_name.to_owned(), id) {
            if existing != id {
                if let Some(absorbed) = self.nets.remove(existing) {
                    for pin in absorbed.connections() {
                        self.pin_to_net.insert(pin.clone(), id);
                    }
                    if let Some(net) = self.nets.get_mut(id) {
                        net.absorb(absorbed);
                    }
                }
            }
        }
        if let Some(net) = self.nets.get_mut(id) {
            net.rename(new_name);
        }
        if self.ground == old_name {
            self.ground = new_name.to_owned();
        }
        id
    }

    /// Name of the net `pin` is on, or the name `connect` would invent for it.
    pub fn net_name_for(&self, pin: &Pin) -> String {
        self.net_of(pin)
            .map(|net| net.name().to_owned())
            .unwrap_or_else(|| auto_net_name(pin))
    }

    /// Put all `pins` on one net.
    ///
    /// Without a name, the net of the first already-connected pin is used,
    /// falling back to `AutoNet_<first pin name>`.
    pub fn connect<'p, I>(&mut self, pins: I, net_name: Option<&str>) -> Result<NetId>
    where
        I: IntoIterator<Item = &'p Pin>,
    {
        let pins: Vec<&Pin> = pins.into_iter().collect();
        let (first, rest) = pins
            .split_first()
            .ok_or(SchematicError::EmptyConnection("pins"))?;
        for pin in &pins {
            self.ensure_admitted(pin)?;
        }

        let name = match net_name {
            Some(name) => name.to_owned(),
            None => pins
                .iter()
                .find_map(|pin| self.net_of(pin))
                .map(|net| net.name().to_owned())
                .unwrap_or_else(|| auto_net_name(first)),
        };

        let mut id = self.join_net(first, &name)?;
        for pin in rest {
            id = self.join_net(pin, &name)?;
        }
        Ok(id)
    }

    /// Wire buses of one kind together on nets `<KIND><n>_<SIGNAL>`.
    ///
    /// Without an explicit index, the index of the first bus already on such
    /// a net is reused; otherwise the next free index for the kind is taken.
    pub fn connect_bus(&mut self, buses: &[Bus], bus_index: Option<u32>) -> Result<u32> {
        let first = buses
            .first()
            .ok_or(SchematicError::EmptyConnection("buses"))?;
        let kind = first.kind();
        if let Some(other) = buses.iter().find(|bus| bus.kind() != kind) {
            return Err(SchematicError::BusMismatch {
                expected: kind,
                found: other.kind(),
            });
        }
        for pin in buses.iter().flat_map(Bus::pins) {
            self.ensure_admitted(pin)?;
        }

        let index = match bus_index {
            Some(index) => index,
            None => match buses.iter().find_map(|bus| self.bus_index_of(bus)) {
                Some(index) => {
                    debug!("Reusing bus {kind}{index}");
                    index
                }
                None => self.next_bus_index(kind),
            },
        };

        for bus in buses {
            for (signal, pin) in bus.signals() {
                self.join_net(pin, &bus_net_name(kind, index, signal))?;
            }
        }
        Ok(index)
    }

    fn bus_index_of(&self, bus: &Bus) -> Option<u32> {
        let signals = bus.signals();
        let (signal, pin) = signals.first()?;
        let net = self.net_of(pin)?;
        let (tag, index, net_signal) = parse_bus_net(net.name())?;
        (tag == bus.kind().tag() && net_signal == signal.to_uppercase()).then_some(index)
    }

    fn next_bus_index(&mut self, kind: BusKind) -> u32 {
        let mut index = self.bus_counters.get(&kind).copied().unwrap_or(0);
        loop {
            let prefix = format!("{}{}_", kind.tag(), index);
            if !self.net_names.keys().any(|name| name.starts_with(&prefix)) {
                break;
            }
            index += 1;
        }
        self.bus_counters.insert(kind, index + 1);
        debug!("Allocated bus {kind}{index}");
        index
    }

    // Passive helpers ----------------------------------------------------------

    /// Add `capacitor` between `pin`'s net and ground.
    ///
    /// The net is `net_name` if given, else the pin's current net, else
    /// `AutoNet_<pin name>`.
    pub fn add_decoupling_cap(
        &mut self,
        pin: &Pin,
        capacitor: Component,
        net_name: Option<&str>,
    ) -> Result<&Component> {
        self.ensure_admitted(pin)?;
        let supply_side = capacitor.pin_at(1u32)?.clone();
        let ground_side = capacitor.pin_at(2u32)?.clone();
        let net = net_name
            .map(str::to_owned)
            .unwrap_or_else(|| self.net_name_for(pin));

        let refdes = capacitor.refdes().clone();
        self.add_component(capacitor)?;
        self.join_net(pin, &net)?;
        self.join_net(&supply_side, &net)?;
        let ground = self.ground.clone();
        self.join_net(&ground_side, &ground)?;
        self.admitted(&refdes)
    }

    /// Place a resistor between `pin1` and `pin2`.
    ///
    /// `pin1` and resistor pin 1 share `net_name` (or `pin1`'s net). Resistor
    /// pin 2 joins `pin2`'s net, or `<net>_R` when `pin2` is unconnected.
    pub fn add_series_res(
        &mut self,
        pin1: &Pin,
        resistor: impl Into<SeriesResistor>,
        pin2: &Pin,
        net_name: Option<&str>,
    ) -> Result<&Component> {
        self.ensure_admitted(pin1)?;
        self.ensure_admitted(pin2)?;
        let resistor = match resistor.into() {
            SeriesResistor::Part(part) => part,
            SeriesResistor::Value(value) => Component::resistor(&self.registry, value),
        };
        let near = resistor.pin_at(1u32)?.clone();
        let far = resistor.pin_at(2u32)?.clone();
        let net = net_name
            .map(str::to_owned)
            .unwrap_or_else(|| self.net_name_for(pin1));

        let refdes = resistor.refdes().clone();
        self.add_component(resistor)?;
        self.join_net(pin1, &net)?;
        self.join_net(&near, &net)?;

        let next = self
            .net_of(pin2)
            .map(|n| n.name().to_owned())
            .unwrap_or_else(|| format!("{net}_R"));
        self.join_net(&far, &next)?;
        self.join_net(pin2, &next)?;
        self.admitted(&refdes)
    }

    #[cfg(test)]
    pub(crate) fn port_mut(&mut self) -> &mut Ports {
        &mut self.port
    }
}

fn assign_passive_footprint(component: &mut Component, size: PassiveSize) -> Result<()> {
    if component.footprint().is_some() {
        return Ok(());
    }
    if let Some(kind) = component.kind().passive_kind() {
        component.set_footprint(Footprint::passive_smd(kind, size)?);
    }
    Ok(())
}

fn auto_net_name(pin: &Pin) -> String {
    format!("AutoNet_{}", pin.name())
}

fn bus_net_name(kind: BusKind, index: u32, signal: &str) -> String {
    format!("{}{}_{}", kind.tag(), index, signal.to_uppercase())
}

static BUS_NET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<tag>I2C|SPI|UART)(?P<idx>[0-9]+)_(?P<signal>[A-Z0-9]+)$")
        .expect("failed to compile bus net regex")
});

/// Split a net named by [`Design::connect_bus`] into kind tag, index and signal.
fn parse_bus_net(name: &str) -> Option<(&str, u32, &str)> {
    let captures = BUS_NET.captures(name)?;
    let index = captures.name("idx")?.as_str().parse().ok()?;
    Some((
        captures.name("tag")?.as_str(),
        index,
        captures.name("signal")?.as_str(),
    ))
}
