//! Opaque footprint handle plus the IPC-7351 nominal two-pad passive packages.
//!
//! The net-graph only checks whether a component *has* a footprint; the pad
//! map is carried through for exporters.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::component::PinIndex;
use crate::error::{Result, SchematicError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aperture {
    Rectangle {
        width: f64,
        height: f64,
        /// Corner radius as a fraction of the shorter side.
        corner_ratio: f64,
    },
    Circle {
        diameter: f64,
        hole: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad centre in millimetres relative to the footprint origin.
    pub location: (f64, f64),
    pub aperture: Aperture,
}

impl Pad {
    pub fn new(x: f64, y: f64, aperture: Aperture) -> Self {
        Self {
            location: (x, y),
            aperture,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub name: String,
    pub description: Option<String>,
    pub pads: BTreeMap<PinIndex, Pad>,
}

impl Footprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            pads: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_pad(mut self, index: impl Into<PinIndex>, pad: Pad) -> Self {
        self.pads.insert(index.into(), pad);
        self
    }

    /// Two-pad SMD land pattern for a passive of the given kind and size.
    pub fn passive_smd(kind: PassiveKind, size: PassiveSize) -> Result<Self> {
        let params = passive_package(kind, size).ok_or(SchematicError::UnsupportedPackage {
            kind: kind.label(),
            size: size.code().to_owned(),
        })?;
        let name = format!("{}{}", kind.refdes_prefix(), size.code());
        let aperture = Aperture::Rectangle {
            width: params.w,
            height: params.h,
            corner_ratio: params.r,
        };
        Ok(Footprint::new(name.clone())
            .with_description(format!("PASSIVE SMD {name}, IPC_7351 nominal"))
            .with_pad(1u32, Pad::new(-params.x, 0.0, aperture.clone()))
            .with_pad(2u32, Pad::new(params.x, 0.0, aperture)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassiveKind {
    Resistor,
    Capacitor,
}

impl PassiveKind {
    pub fn refdes_prefix(&self) -> &'static str {
        match self {
            PassiveKind::Resistor => "R",
            PassiveKind::Capacitor => "C",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PassiveKind::Resistor => "resistor",
            PassiveKind::Capacitor => "capacitor",
        }
    }
}

/// Imperial chip size code such as `0603`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PassiveSize {
    S0402,
    S0504,
    S0603,
    S0612,
    S0805,
    S0815,
    S1020,
    S1206,
    S1210,
    S1218,
    S1812,
    S1825,
    S2010,
    S2220,
    S2225,
    S2512,
    S2816,
    S3640,
    S4020,
}

impl PassiveSize {
    pub const ALL: [PassiveSize; 19] = [
        PassiveSize::S0402,
        PassiveSize::S0504,
        PassiveSize::S0603,
        PassiveSize::S0612,
        PassiveSize::S0805,
        PassiveSize::S0815,
        PassiveSize::S1020,
        PassiveSize::S1206,
        PassiveSize::S1210,
        PassiveSize::S1218,
        PassiveSize::S1812,
        PassiveSize::S1825,
        PassiveSize::S2010,
        PassiveSize::S2220,
        PassiveSize::S2225,
        PassiveSize::S2512,
        PassiveSize::S2816,
        PassiveSize::S3640,
        PassiveSize::S4020,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PassiveSize::S0402 => "0402",
            PassiveSize::S0504 => "0504",
            PassiveSize::S0603 => "0603",
            PassiveSize::S0612 => "0612",
            PassiveSize::S0805 => "0805",
            PassiveSize::S0815 => "0815",
            PassiveSize::S1020 => "1020",
            PassiveSize::S1206 => "1206",
            PassiveSize::S1210 => "1210",
            PassiveSize::S1218 => "1218",
            PassiveSize::S1812 => "1812",
            PassiveSize::S1825 => "1825",
            PassiveSize::S2010 => "2010",
            PassiveSize::S2220 => "2220",
            PassiveSize::S2225 => "2225",
            PassiveSize::S2512 => "2512",
            PassiveSize::S2816 => "2816",
            PassiveSize::S3640 => "3640",
            PassiveSize::S4020 => "4020",
        }
    }
}

impl std::fmt::Display for PassiveSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PassiveSize {
    type Err = SchematicError;

    fn from_str(s: &str) -> Result<Self> {
        PassiveSize::ALL
            .iter()
            .find(|size| size.code() == s)
            .copied()
            .ok_or_else(|| SchematicError::InvalidValue {
                value: s.to_owned(),
                reason: format!(
                    "unknown passive size, options: {}",
                    PassiveSize::ALL.map(|size| size.code()).join(", ")
                ),
            })
    }
}

impl TryFrom<String> for PassiveSize {
    type Error = SchematicError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PassiveSize> for String {
    fn from(size: PassiveSize) -> Self {
        size.code().to_owned()
    }
}

/// Land pattern parameters: pad centre offset `x`, pad `w`×`h`, corner ratio `r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageParams {
    pub x: f64,
    pub w: f64,
    pub h: f64,
    pub r: f64,
}

const fn params(x: f64, w: f64, h: f64, r: f64) -> PackageParams {
    PackageParams { x, w, h, r }
}

pub fn passive_package(kind: PassiveKind, size: PassiveSize) -> Option<PackageParams> {
    use PassiveKind::*;
    use PassiveSize::*;

    let params = match (kind, size) {
        (Resistor, S0402) => params(0.51, 0.54, 0.64, 0.25),
        (Resistor, S0603) => params(0.825, 0.8, 0.95, 0.25),
        (Resistor, S0612) => params(0.75, 1.0, 3.4, 0.25),
        (Resistor, S0805) => params(0.9125, 1.025, 1.4, 0.243902),
        (Resistor, S0815) => params(0.9375, 1.025, 4.05, 0.243902),
        (Resistor, S1020) => params(1.125, 1.15, 5.2, 0.217391),
        (Resistor, S1206) => params(1.4625, 1.125, 1.75, 0.222222),
        (Resistor, S1210) => params(1.4625, 1.125, 2.65, 0.222222),
        (Resistor, S1218) => params(1.475, 1.05, 4.75, 0.238095),
        (Resistor, S1812) => params(2.1375, 1.125, 3.4, 0.222222),
        (Resistor, S2010) => params(2.3125, 1.225, 2.65, 0.204082),
        (Resistor, S2512) => params(2.9625, 1.225, 3.35, 0.204082),
        (Resistor, S2816) => params(2.5125, 3.025, 4.45, 0.082645),
        (Resistor, S4020) => params(4.8125, 1.475, 5.3, 0.169492),

        (Capacitor, S0402) => params(0.48, 0.56, 0.62, 0.25),
        (Capacitor, S0504) => params(0.54, 0.66, 1.28, 0.25),
        (Capacitor, S0603) => params(0.775, 0.9, 0.95, 0.25),
        (Capacitor, S0805) => params(0.95, 1.0, 1.45, 0.25),
        (Capacitor, S1206) => params(1.475, 1.15, 1.8, 0.217391),
        (Capacitor, S1210) => params(1.475, 1.15, 2.7, 0.217391),
        (Capacitor, S1812) => params(2.05, 1.4, 3.4, 0.178571),
        (Capacitor, S1825) => params(2.05, 1.4, 6.8, 0.178571),
        (Capacitor, S2220) => params(2.55, 1.8, 5.4, 0.138889),
        (Capacitor, S2225) => params(2.5375, 1.625, 6.6, 0.153846),
        (Capacitor, S3640) => params(4.0875, 1.925, 10.45, 0.12987),

        _ => return None,
    };
    Some(params)
}
