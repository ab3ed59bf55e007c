//! Complete boards assembled from the parts and modules in this crate.

use anyhow::Result;
use log::info;

use earthground_schematic::{Design, PassiveSize, Pin};

use crate::parts::connectors::{qwiic, qwiic_i2c, standard_header};
use crate::parts::tca9535::{self, Tca9535Options, GPIO_COUNT};

const EXPANDERS: u32 = 2;
const HEADER_PINS: u32 = 40;

/// Two TCA9535 expanders sharing a Qwiic I²C bus, with all 32 GPIOs broken
/// out to a 2x20 header. Header pins 1-4 and 37-40 are ground.
pub fn io_expander_board() -> Result<Design> {
    let mut design = Design::builder("IO Expander Example")
        .short_name("IOExample")
        .default_passive_size(PassiveSize::S0603)
        .build();
    let registry = design.registry().clone();
    let ground = design.ground().to_owned();

    let mut expanders = Vec::new();
    for address in 0..EXPANDERS {
        let options = Tca9535Options {
            address: address as u8,
            ..Default::default()
        };
        let module = design.add_module(tca9535::generate_design(&registry, &options)?)?;
        let ports = module.port().clone();
        design.join_net(ports.pin("VCC")?, "VCC")?;
        design.join_net(ports.pin("GND")?, &ground)?;
        expanders.push(ports);
    }

    let connector = design.add_component(qwiic(&registry))?.clone();
    design.join_net(connector.pin("VCC")?, "VCC")?;
    design.join_net(connector.pin("GND")?, &ground)?;
    let mut buses = vec![qwiic_i2c(&connector)?];
    for ports in &expanders {
        buses.push(ports.bus("I2C")?.clone());
    }
    let bus = design.connect_bus(&buses, None)?;
    info!("Expanders share I2C{bus}");

    let header = design
        .add_component(standard_header(&registry, HEADER_PINS, 2)?)?
        .clone();
    for (i, ports) in (0u32..).zip(&expanders) {
        for pin in 0..GPIO_COUNT {
            let io = ports.pin(&format!("IO{pin}"))?;
            let out = header.pin_at(i * GPIO_COUNT + pin + 5)?;
            let name = format!("IO{}_P{pin:03}_OUT", i + 1);
            design.connect([io, out], Some(name.as_str()))?;
        }
    }
    let grounds: Vec<&Pin> = (1..=4)
        .chain(HEADER_PINS - 3..=HEADER_PINS)
        .map(|index| header.pin_at(index))
        .collect::<earthground_schematic::Result<_>>()?;
    design.connect(grounds, Some(ground.as_str()))?;

    Ok(design)
}
