mod common;

use common::{add_part, dump_nets, init_logger};
use earthground_schematic::{
    Component, Design, DesignConfig, PassiveSize, RefdesRegistry, SchematicError, SiValue,
};

fn cap(design: &Design) -> Component {
    Component::capacitor(
        design.registry(),
        SiValue::farads("100n").unwrap(),
        SiValue::volts("16").unwrap(),
    )
}

#[test]
fn series_resistor_splits_the_net() {
    init_logger();
    let mut design = Design::new("Top");
    let u1 = add_part(&mut design, "U", &["OUT"]);
    let u2 = add_part(&mut design, "U", &["IN"]);

    let resistor = design
        .add_series_res(
            u1.pin("OUT").unwrap(),
            1000u32,
            u2.pin("IN").unwrap(),
            Some("NET_A"),
        )
        .unwrap()
        .clone();

    assert_eq!(resistor.name(), "RES_1kΩ");
    assert_eq!(resistor.refdes().to_string(), "R1");
    insta::assert_snapshot!(dump_nets(&design), @r"
    GND: []
    NET_A: [R1.1, U1.OUT]
    NET_A_R: [R1.2, U2.IN]
    ");
}

#[test]
fn series_resistor_joins_an_existing_far_net() {
    let mut design = Design::new("Top");
    let u1 = add_part(&mut design, "U", &["INT", "VCC"]);
    design.join_net(u1.pin("VCC").unwrap(), "3V3").unwrap();

    design
        .add_series_res(
            u1.pin("INT").unwrap(),
            SiValue::ohms("10k").unwrap(),
            u1.pin("VCC").unwrap(),
            None,
        )
        .unwrap();

    insta::assert_snapshot!(dump_nets(&design), @r"
    3V3: [R1.2, U1.VCC]
    AutoNet_INT: [R1.1, U1.INT]
    GND: []
    ");
}

#[test]
fn series_resistor_accepts_a_prebuilt_part() {
    let mut design = Design::builder("Top")
        .default_passive_size(PassiveSize::S0402)
        .build();
    let u1 = add_part(&mut design, "U", &["TX", "RX"]);
    let part = Component::resistor(design.registry(), SiValue::ohms("33").unwrap())
        .with_mpn("RC0402FR-0733RL");

    let placed = design
        .add_series_res(u1.pin("TX").unwrap(), part, u1.pin("RX").unwrap(), Some("LOOP"))
        .unwrap();

    assert_eq!(placed.mpn(), Some("RC0402FR-0733RL"));
    assert_eq!(placed.footprint().unwrap().name, "R0402");
    assert_eq!(placed.parent(), Some("Top"));
}

#[test]
fn decoupling_cap_goes_to_ground() {
    let mut design = Design::new("Top");
    let u1 = add_part(&mut design, "U", &["VCC"]);
    design.join_net(u1.pin("VCC").unwrap(), "3V3").unwrap();

    let capacitor = cap(&design);
    design
        .add_decoupling_cap(u1.pin("VCC").unwrap(), capacitor, None)
        .unwrap();

    insta::assert_snapshot!(dump_nets(&design), @r"
    3V3: [C1.1, U1.VCC]
    GND: [C1.2]
    ");
}

#[test]
fn decoupling_cap_on_a_fresh_pin() {
    let config = DesignConfig::from_toml_str(
        r#"
        default-passive-size = "0805"
        ground-net = "VSS"
        "#,
    )
    .unwrap();
    let mut design = Design::builder("Top").config(config).build();
    let u1 = add_part(&mut design, "U", &["VDD", "AVDD"]);

    let capacitor = cap(&design);
    let placed = design
        .add_decoupling_cap(u1.pin("VDD").unwrap(), capacitor, None)
        .unwrap();
    assert_eq!(placed.footprint().unwrap().name, "C0805");

    let capacitor = cap(&design);
    design
        .add_decoupling_cap(u1.pin("AVDD").unwrap(), capacitor, Some("VDDA"))
        .unwrap();

    insta::assert_snapshot!(dump_nets(&design), @r"
    AutoNet_VDD: [C1.1, U1.VDD]
    VDDA: [C2.1, U1.AVDD]
    VSS: [C1.2, C2.2]
    ");
}

#[test]
fn default_size_applies_on_admission() {
    let mut design = Design::new("Top");
    design.set_default_passive_size(Some(PassiveSize::S1206));

    let r = Component::resistor(design.registry(), SiValue::ohms("4.7k").unwrap());
    let placed = design.add_component(r).unwrap();
    let footprint = placed.footprint().unwrap();
    assert_eq!(footprint.name, "R1206");
    assert_eq!(
        footprint.description.as_deref(),
        Some("PASSIVE SMD R1206, IPC_7351 nominal")
    );

    // Non-passives are left alone.
    let u = add_part(&mut design, "U", &["A"]);
    assert!(u.footprint().is_none());
}

#[test]
fn components_are_admitted_once() {
    let mut design = Design::new("Top");
    let admitted = add_part(&mut design, "U", &["A"]);

    let mut other = Design::new("Other");
    let err = other.add_component(admitted).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Component U1 was already added to design 'Top'"
    );

    let registry = RefdesRegistry::new();
    let twin = Component::new(&registry, "U");
    let err = design.add_component(twin).unwrap_err();
    assert!(matches!(err, SchematicError::DuplicateComponent { .. }));
}
