//! TI TCA9535 16-bit I²C I/O expander and a module wrapping it.

use anyhow::{bail, Context, Result};
use log::debug;

use earthground_schematic::{
    Aperture, Bus, Component, Design, Pin, RefdesRegistry, SiValue,
};

use crate::footprints::{tssop, TssopWidth};
use crate::logic::ElectricalBool;

pub const GPIO_COUNT: u32 = 16;

/// Base of the 7-bit bus address; A2..A0 fill the low three bits.
pub const BASE_ADDRESS: u8 = 0x20;

const ADDRESS_PINS: [&str; 3] = ["A0", "A1", "A2"];

pub fn tca9535pwr(registry: &RefdesRegistry) -> Result<Component> {
    Ok(Component::new(registry, "U")
        .with_name("TCA9535PWR")
        .with_mpn("TCA9535PWR")
        .with_description("IC XPND 400KHZ I2C SMBUS 24TSSOP")
        .with_parameter("Manufacturer", "Texas Instruments")
        .with_parameter("Output Type", "Push-Pull")
        .with_parameter("Number of I/O", "16")
        .with_parameter("Voltage - Supply", "1.65V ~ 5.5V")
        .with_parameter("Clock Frequency", "400 kHz")
        .with_parameter("Interrupt Output", "Yes")
        .with_parameter("Supplier Device Package", "24-TSSOP")
        .with_pin_map([
            (21u32, "A0"),
            (2, "A1"),
            (3, "A2"),
            (12, "GND"),
            (1, "INT"),
            (4, "P00"),
            (5, "P01"),
            (6, "P02"),
            (7, "P03"),
            (8, "P04"),
            (9, "P05"),
            (10, "P06"),
            (11, "P07"),
            (13, "P10"),
            (14, "P11"),
            (15, "P12"),
            (16, "P13"),
            (17, "P14"),
            (18, "P15"),
            (19, "P16"),
            (20, "P17"),
            (22, "SCL"),
            (23, "SDA"),
            (24, "VCC"),
        ])
        .with_footprint(tssop(
            24,
            TssopWidth::W4_4mm,
            0.65,
            Aperture::Rectangle {
                width: 1.475,
                height: 0.4,
                corner_ratio: 0.25,
            },
        )?))
}

pub fn i2c(part: &Component) -> Result<Bus> {
    Ok(Bus::i2c(part.pin("SDA")?, part.pin("SCL")?))
}

/// GPIO `index` counted across both ports: 0-7 are `P00..P07`, 8-15 `P10..P17`.
pub fn gpio(part: &Component, index: u32) -> Result<&Pin> {
    if index >= GPIO_COUNT {
        bail!("Invalid GPIO {index}; range 0-{}", GPIO_COUNT - 1);
    }
    Ok(part.pin(&format!("P{}{}", index / 8, index % 8))?)
}

/// Read the strapped bus address back from the nets on A0-A2.
pub fn address(design: &Design, part: &Component) -> Result<u8> {
    let net_of = |name: &str| -> Result<String> {
        let pin = part.pin(name)?;
        design
            .net_of(pin)
            .map(|net| net.name().to_owned())
            .with_context(|| format!("{} is not connected in {}", pin, design.name()))
    };
    let converter = ElectricalBool::new(net_of("VCC")?, net_of("GND")?);

    let mut address = BASE_ADDRESS;
    for (bit, name) in ADDRESS_PINS.into_iter().enumerate() {
        if converter.to_bool(&net_of(name)?)? {
            address |= 1 << bit;
        }
    }
    Ok(address)
}

#[derive(Debug, Clone)]
pub struct Tca9535Options {
    /// Value of A2..A0, 0-7.
    pub address: u8,
    /// Pull-up from INT to VCC; `None` leaves INT open.
    pub interrupt_pullup: Option<SiValue>,
    pub decoupling_capacitance: SiValue,
    pub decoupling_voltage: SiValue,
}

impl Default for Tca9535Options {
    fn default() -> Self {
        Self {
            address: 0,
            interrupt_pullup: Some(SiValue::new(10e3, earthground_schematic::values::OHM)),
            decoupling_capacitance: SiValue::new(1e-6, earthground_schematic::values::FARAD),
            decoupling_voltage: SiValue::new(10.0, earthground_schematic::values::VOLT),
        }
    }
}

/// A TCA9535 with decoupling, address straps and optional INT pull-up,
/// exposing `IO0..IO15`, `VCC`, `GND`, `I2C` and `INT` ports.
pub fn generate_design(registry: &RefdesRegistry, options: &Tca9535Options) -> Result<Design> {
    if options.address > 7 {
        bail!("Invalid address {}; range 0-7", options.address);
    }

    let ports = (0..GPIO_COUNT)
        .map(|i| format!("IO{i}"))
        .chain(["VCC", "GND", "I2C", "INT"].map(String::from));
    let mut design = Design::builder("Tca9535Design")
        .short_name("EXPANDER")
        .ports(ports)
        .registry(registry)
        .build();
    let ground = design.ground().to_owned();

    let expander = design.add_component(tca9535pwr(registry)?)?.clone();
    design.join_net(expander.pin("VCC")?, "VCC")?;
    design.join_net(expander.pin("GND")?, &ground)?;

    let converter = ElectricalBool::new("VCC", ground.as_str());
    for (bit, name) in ADDRESS_PINS.into_iter().enumerate() {
        let high = (options.address >> bit) & 1 == 1;
        design.join_net(expander.pin(name)?, converter.to_net(high))?;
    }
    debug!("{} strapped to address {}", expander, options.address);

    let capacitor = Component::capacitor(
        registry,
        options.decoupling_capacitance.clone(),
        options.decoupling_voltage.clone(),
    );
    design.add_decoupling_cap(expander.pin("VCC")?, capacitor, None)?;
    if let Some(pullup) = &options.interrupt_pullup {
        design.add_series_res(
            expander.pin("INT")?,
            pullup.clone(),
            expander.pin("VCC")?,
            Some("I2C_INT"),
        )?;
    }

    for name in ["VCC", "GND", "INT"] {
        design.set_port(name, expander.pin(name)?)?;
    }
    for index in 0..GPIO_COUNT {
        design.set_port(&format!("IO{index}"), gpio(&expander, index)?)?;
    }
    design.set_port("I2C", i2c(&expander)?)?;
    Ok(design)
}
