//! Flattened, read-only view of a design hierarchy for exporters.
//!
//! Each design keeps its own net table, so a module pin wired into a parent
//! net shows up in two tables. Flattening unions every net that shares a pin
//! into one electrical node. Nodes take the first name met in a parent-first
//! walk and keep the others as aliases.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::component::Pin;
use crate::design::Design;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    pub design: String,
    pub components: Vec<NetlistComponent>,
    pub nets: Vec<NetlistNet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistComponent {
    pub refdes: String,
    pub name: String,
    /// Slash-separated module path, `None` for the top-level design.
    pub module: Option<String>,
    pub footprint: Option<String>,
    pub pads: Vec<NetlistPad>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistPad {
    pub pad: String,
    pub pin: String,
    pub net: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistNet {
    pub name: String,
    pub aliases: Vec<String>,
    pub nodes: Vec<NetlistNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlistNode {
    pub refdes: String,
    pub pin: String,
}

/// Union-find over net entries; the lower index is always kept as root.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}

/// A design in walk order with its module path.
fn walk<'a>(design: &'a Design, path: Option<String>, out: &mut Vec<(Option<String>, &'a Design)>) {
    out.push((path.clone(), design));
    for module in design.modules() {
        let child = match &path {
            Some(path) => format!("{path}/{}", module.short_name()),
            None => module.short_name().to_owned(),
        };
        walk(module, Some(child), out);
    }
}

impl Netlist {
    pub fn from_design(design: &Design) -> Self {
        let mut designs = Vec::new();
        walk(design, None, &mut designs);

        let entries: Vec<(&str, Vec<&Pin>)> = designs
            .iter()
            .flat_map(|&(_, design)| design.nets())
            .map(|net| (net.name(), net.connections().iter().collect()))
            .collect();

        let mut uf = UnionFind::new(entries.len());
        let mut first_seen: HashMap<&Pin, usize> = HashMap::new();
        for (i, (_, pins)) in entries.iter().enumerate() {
            for &pin in pins {
                match first_seen.get(pin) {
                    Some(&j) => uf.union(i, j),
                    None => {
                        first_seen.insert(pin, i);
                    }
                }
            }
        }

        // Group entries by root, keeping walk order.
        let mut roots: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, (Vec<&str>, BTreeSet<&Pin>)> = HashMap::new();
        for (i, (name, pins)) in entries.iter().enumerate() {
            let name: &str = name;
            let root = uf.find(i);
            let group = groups.entry(root).or_insert_with(|| {
                roots.push(root);
                (Vec::new(), BTreeSet::new())
            });
            if !group.0.contains(&name) {
                group.0.push(name);
            }
            group.1.extend(pins.iter().copied());
        }

        let mut used: HashSet<String> = HashSet::new();
        let mut nets = Vec::new();
        let mut pin_net: HashMap<&Pin, String> = HashMap::new();
        for root in roots {
            let Some((names, pins)) = groups.remove(&root) else {
                continue;
            };
            if pins.is_empty() {
                continue;
            }
            let Some((primary, aliases)) = names.split_first() else {
                continue;
            };
            let name = unique_name(primary, &mut used);
            for &pin in &pins {
                pin_net.insert(pin, name.clone());
            }
            nets.push(NetlistNet {
                name,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                nodes: pins
                    .iter()
                    .map(|pin| NetlistNode {
                        refdes: pin.owner().to_string(),
                        pin: pin.name().to_owned(),
                    })
                    .collect(),
            });
        }

        let components = designs
            .iter()
            .flat_map(|(path, design)| design.components().map(move |c| (path, c)))
            .map(|(path, component)| NetlistComponent {
                refdes: component.refdes().to_string(),
                name: component.name().to_owned(),
                module: path.clone(),
                footprint: component.footprint().map(|fp| fp.name.clone()),
                pads: component
                    .pins()
                    .iter()
                    .map(|pin| NetlistPad {
                        pad: pin.index().to_string(),
                        pin: pin.name().to_owned(),
                        net: pin_net.get(pin).cloned(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            design: design.name().to_owned(),
            components,
            nets,
        }
    }

    pub fn net(&self, name: &str) -> Option<&NetlistNet> {
        self.nets.iter().find(|net| net.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut name = base.to_owned();
    let mut n = 1;
    while used.contains(&name) {
        name = format!("{base}_{n}");
        n += 1;
    }
    used.insert(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;

    #[test]
    fn module_nets_merge_through_shared_pins() {
        let mut child = Design::builder("Child").short_name("CH").build();
        let u = child
            .add_component(Component::new(child.registry(), "U").with_pin_names(["VCC", "OUT"]))
            .unwrap()
            .clone();
        child.join_net(u.pin("VCC").unwrap(), "VCC").unwrap();
        child.join_net(u.pin("OUT").unwrap(), "OUT").unwrap();

        let mut top = Design::new("Top");
        let j = top
            .add_component(Component::new(top.registry(), "J").with_pin_count(1))
            .unwrap()
            .clone();
        top.add_module(child).unwrap();
        top.connect([u.pin("VCC").unwrap(), j.pin("1").unwrap()], Some("3V3"))
            .unwrap();

        let netlist = Netlist::from_design(&top);
        let supply = netlist.net("3V3").unwrap();
        assert_eq!(supply.aliases, ["CH0_VCC"]);
        assert_eq!(supply.nodes.len(), 2);
        assert!(netlist.net("CH0_OUT").is_some());
        // Empty ground nets are dropped.
        assert!(netlist.net("GND").is_none());

        let child_part = netlist
            .components
            .iter()
            .find(|c| c.refdes == "U1")
            .unwrap();
        assert_eq!(child_part.module.as_deref(), Some("CH0"));
        assert_eq!(child_part.pads[0].net.as_deref(), Some("3V3"));

        let json = netlist.to_json().unwrap();
        assert!(json.contains("\"CH0_VCC\""));
    }

    #[test]
    fn clashing_names_get_suffixes() {
        let mut used = HashSet::new();
        assert_eq!(unique_name("VCC", &mut used), "VCC");
        assert_eq!(unique_name("VCC", &mut used), "VCC_1");
        assert_eq!(unique_name("VCC", &mut used), "VCC_2");
    }
}
