#![allow(dead_code)]

use earthground_schematic::{Component, Design};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Add a generic part with the given pin names and return a copy of it.
pub fn add_part(design: &mut Design, prefix: &str, pins: &[&str]) -> Component {
    let part = Component::new(design.registry(), prefix)
        .with_name(format!("{prefix}_PART"))
        .with_pin_names(pins.iter().copied());
    design.add_component(part).unwrap().clone()
}

/// Every net of `design` as `name: refdes.pin, ...`, one per line.
pub fn dump_nets(design: &Design) -> String {
    design
        .nets()
        .map(|net| {
            let pins: Vec<String> = net
                .connections()
                .iter()
                .map(|pin| format!("{}.{}", pin.owner(), pin.name()))
                .collect();
            format!("{}: [{}]", net.name(), pins.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
