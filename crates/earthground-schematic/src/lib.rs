//! Programmatic schematic capture.
//!
//! Components are created from a [`RefdesRegistry`], admitted into a
//! [`Design`], and their pins are wired into named nets with
//! [`Design::join_net`], [`Design::connect`] and [`Design::connect_bus`].
//! Designs nest: [`Design::add_module`] embeds a child design, namespacing its
//! nets, and the child's [`Ports`] give the parent handles to wire up.
//!
//! The result is read by exporters either directly (components, nets and the
//! pin-to-net map of each design) or as a flattened [`Netlist`].

pub mod bus;
pub mod component;
pub mod config;
pub mod design;
pub mod error;
pub mod footprint;
pub mod net;
pub mod netlist;
pub mod ports;
pub mod print;
pub mod validate;
pub mod values;

pub use bus::{Bus, BusKind, I2c, Spi, Uart};
pub use component::{Component, ComponentKind, Pin, PinContainer, PinIndex, Refdes, RefdesRegistry};
pub use config::DesignConfig;
pub use design::{Design, DesignBuilder, SeriesResistor};
pub use error::{Result, SchematicError};
pub use footprint::{Aperture, Footprint, Pad, PassiveKind, PassiveSize};
pub use net::{Net, NetId};
pub use netlist::Netlist;
pub use ports::{PortBinding, Ports};
pub use validate::{Problem, ValidateOptions, ValidationError};
pub use values::SiValue;
