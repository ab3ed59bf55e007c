pub mod connectors;
pub mod tca9535;
