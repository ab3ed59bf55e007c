//! Parts and sub-circuit generators built on `earthground-schematic`.
//!
//! * [`parts`] – component constructors (I/O expander, connectors) and the
//!   module generators that wrap them into reusable designs.
//! * [`footprints`] – land patterns for the packages those parts use.
//! * [`designs`] – complete boards assembled from the above.

pub mod designs;
pub mod footprints;
pub mod logic;
pub mod parts;

pub use logic::ElectricalBool;
