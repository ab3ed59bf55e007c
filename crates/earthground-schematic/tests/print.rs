mod common;

use common::add_part;
use earthground_schematic::{Bus, Design};

fn sensor(top: &Design) -> Design {
    let mut design = Design::builder("Sensor")
        .short_name("SNS")
        .ports(["VCC", "I2C", "INT"])
        .registry(top.registry())
        .build();
    let part = add_part(&mut design, "U", &["VCC", "SDA", "SCL", "INT"]);
    design.join_net(part.pin("VCC").unwrap(), "VCC").unwrap();
    let bus = Bus::i2c(part.pin("SDA").unwrap(), part.pin("SCL").unwrap());
    design.connect_bus(&[bus.clone()], None).unwrap();
    design.set_port("vcc", part.pin("VCC").unwrap()).unwrap();
    design.set_port("i2c", bus).unwrap();
    design
}

#[test]
fn components_render_with_their_nets() {
    let mut design = Design::new("Top");
    let u1 = add_part(&mut design, "U", &["VCC", "GND", "SDA"]);
    design.join_net(u1.pin("VCC").unwrap(), "3V3").unwrap();
    design.join_net(u1.pin("GND").unwrap(), "GND").unwrap();

    insta::assert_snapshot!(design.render().trim_end(), @r"
    U1 (U_PART)
    .-----.
    |  GND|-- GND
    |  SDA|-- <NO CONNECTION>
    |  VCC|-- 3V3
    '-----'
    ");
}

#[test]
fn symbol_shows_ports_and_buses() {
    let mut top = Design::new("Top");
    let child = sensor(&top);
    let module = top.add_module(child).unwrap();

    insta::assert_snapshot!(module.render_symbol().trim_end(), @r"
    SNS0 (Sensor)
    .-----.
    |  VCC|-- SNS0_VCC
    |  I2C|-- I2C [SNS0_I2C0_SDA, SNS0_I2C0_SCL]
    |  INT|-- <NO CONNECTION>
    '-----'
    ");
}

#[test]
fn modules_render_as_symbols() {
    let mut top = Design::new("Top");
    let child = sensor(&top);
    top.add_module(child).unwrap();

    assert_eq!(top.render(), top.modules()[0].render_symbol());
    // Without ports there is nothing to draw.
    assert_eq!(top.render_symbol(), "");
}
