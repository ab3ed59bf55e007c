use anyhow::{bail, Result};

use earthground_schematic::{Bus, Component, PinIndex, RefdesRegistry};

use crate::footprints::{jst_sh, pin_header, JstEntry};

/// SparkFun Qwiic connector (JST SH, 4 pin, side entry).
pub fn qwiic(registry: &RefdesRegistry) -> Component {
    Component::new(registry, "J")
        .with_name("PRT-14417")
        .with_mpn("PRT-14417")
        .with_description("QWIIC CONNECTOR SMD 4-PIN")
        .with_parameter("Manufacturer", "SparkFun Electronics")
        .with_parameter("For Use With/Related Products", "Qwiic")
        .with_pin_map([
            (PinIndex::from(1), "GND"),
            (PinIndex::from(2), "VCC"),
            (PinIndex::from(3), "SDA"),
            (PinIndex::from(4), "SCL"),
            (PinIndex::from("M1"), "MOUNTING1"),
            (PinIndex::from("M2"), "MOUNTING2"),
        ])
        .with_footprint(jst_sh(4, JstEntry::Side))
}

pub fn qwiic_i2c(part: &Component) -> Result<Bus> {
    Ok(Bus::i2c(part.pin("SDA")?, part.pin("SCL")?))
}

/// 0.1" through-hole header with pins named and numbered `1..=pin_count`.
pub fn standard_header(registry: &RefdesRegistry, pin_count: u32, rows: u32) -> Result<Component> {
    if rows == 0 || pin_count % rows != 0 {
        bail!("Unbalanced connector! {pin_count} pins in {rows} rows");
    }
    let per_row = pin_count / rows;
    let name = format!("CONNECTOR_{per_row}x{rows}");
    Ok(Component::new(registry, "J")
        .with_name(name.clone())
        .with_description(name)
        .with_pin_count(pin_count)
        .with_footprint(pin_header(per_row, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwiic_pins_match_the_cable() {
        let part = qwiic(&RefdesRegistry::new());
        assert_eq!(part.refdes().to_string(), "J1");
        assert_eq!(part.pin_at(1u32).unwrap().name(), "GND");
        assert_eq!(part.pin_at("M2").unwrap().name(), "MOUNTING2");
        let bus = qwiic_i2c(&part).unwrap();
        assert_eq!(bus.pins().map(|p| p.name()).collect::<Vec<_>>(), ["SDA", "SCL"]);
    }

    #[test]
    fn header_must_be_balanced() {
        let registry = RefdesRegistry::new();
        let header = standard_header(&registry, 40, 2).unwrap();
        assert_eq!(header.name(), "CONNECTOR_20x2");
        assert_eq!(header.pins().len(), 40);
        assert_eq!(header.footprint().unwrap().pads.len(), 40);

        let err = standard_header(&registry, 5, 2).unwrap_err();
        assert_eq!(err.to_string(), "Unbalanced connector! 5 pins in 2 rows");
    }
}
