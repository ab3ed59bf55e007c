#![allow(dead_code)]

use earthground_schematic::Design;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every net of `design` as `name: [refdes.pin, ...]`, one per line.
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
