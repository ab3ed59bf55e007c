//! Plain-text views of a design for quick inspection.

use std::fmt;

use itertools::Itertools;

use crate::component::Pin;
use crate::design::Design;
use crate::ports::PortBinding;

const NO_CONNECTION: &str = "<NO CONNECTION>";

/// Each component as a box of pins with the net every pin is on, followed by
/// the symbol of each module.
impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in self.components() {
            let pad = component
                .pins()
                .iter()
                .map(|p| p.name().len())
                .max()
                .unwrap_or(0)
                + 2;
            writeln!(f, "{} ({})", component.refdes(), component.name())?;
            writeln!(f, ".{}.", "-".repeat(pad))?;
            for pin in component.pins().iter().sorted_by(|a, b| a.name().cmp(b.name())) {
                writeln!(f, "|{:>pad$}|-- {}", pin.name(), net_label(self, pin))?;
            }
            writeln!(f, "'{}'", "-".repeat(pad))?;
            writeln!(f)?;
        }
        for module in self.modules() {
            write!(f, "{}", Symbol(module))?;
        }
        Ok(())
    }
}

fn net_label<'a>(design: &'a Design, pin: &Pin) -> &'a str {
    design.net_of(pin).map_or(NO_CONNECTION, |net| net.name())
}

/// A design's ports and what each is wired to.
pub struct Symbol<'a>(pub &'a Design);

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let design = self.0;
        let Some(pad) = design.port().names().iter().map(|n| n.len()).max() else {
            return Ok(());
        };
        let pad = pad + 2;
        writeln!(f, "{} ({})", design.short_name(), design.name())?;
        writeln!(f, ".{}.", "-".repeat(pad))?;
        for (name, binding) in design.port().iter() {
            let connection = match binding {
                None => NO_CONNECTION.to_owned(),
                Some(PortBinding::Pin(pin)) => net_label(design, pin).to_owned(),
                Some(PortBinding::Bus(bus)) => {
                    let nets = bus.pins().map(|pin| net_label(design, pin)).join(", ");
                    format!("{} [{nets}]", bus.kind())
                }
            };
            writeln!(f, "|{:>pad$}|-- {connection}", name.to_uppercase())?;
        }
        writeln!(f, "'{}'", "-".repeat(pad))?;
        writeln!(f)
    }
}

impl Design {
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn print(&self) {
        print!("{self}");
    }

    pub fn render_symbol(&self) -> String {
        Symbol(self).to_string()
    }

    pub fn print_symbol(&self) {
        print!("{}", Symbol(self));
    }
}
