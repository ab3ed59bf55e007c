//! Known bus shapes: ordered groups of named signal pins wired as a unit.

use serde::{Deserialize, Serialize};

use crate::component::Pin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusKind {
    I2c,
    Spi,
    Uart,
}

impl BusKind {
    /// Upper-case tag used in bus net names, e.g. `I2C0_SDA`.
    pub fn tag(&self) -> &'static str {
        match self {
            BusKind::I2c => "I2C",
            BusKind::Spi => "SPI",
            BusKind::Uart => "UART",
        }
    }
}

impl std::fmt::Display for BusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2c {
    pub sda: Pin,
    pub scl: Pin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spi {
    pub mosi: Pin,
    pub miso: Pin,
    pub sck: Pin,
    pub cs: Pin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uart {
    pub rx: Pin,
    pub tx: Pin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bus {
    I2c(I2c),
    Spi(Spi),
    Uart(Uart),
}

impl Bus {
    pub fn i2c(sda: &Pin, scl: &Pin) -> Self {
        Bus::I2c(I2c {
            sda: sda.clone(),
            scl: scl.clone(),
        })
    }

    pub fn spi(mosi: &Pin, miso: &Pin, sck: &Pin, cs: &Pin) -> Self {
        Bus::Spi(Spi {
            mosi: mosi.clone(),
            miso: miso.clone(),
            sck: sck.clone(),
            cs: cs.clone(),
        })
    }

    pub fn uart(rx: &Pin, tx: &Pin) -> Self {
        Bus::Uart(Uart {
            rx: rx.clone(),
            tx: tx.clone(),
        })
    }

    pub fn kind(&self) -> BusKind {
        match self {
            Bus::I2c(_) => BusKind::I2c,
            Bus::Spi(_) => BusKind::Spi,
            Bus::Uart(_) => BusKind::Uart,
        }
    }

    /// Signals in declaration order, keyed by lower-case signal name.
    pub fn signals(&self) -> Vec<(&'static str, &Pin)> {
        match self {
            Bus::I2c(bus) => vec![("sda", &bus.sda), ("scl", &bus.scl)],
            Bus::Spi(bus) => vec![
                ("mosi", &bus.mosi),
                ("miso", &bus.miso),
                ("sck", &bus.sck),
                ("cs", &bus.cs),
            ],
            Bus::Uart(bus) => vec![("rx", &bus.rx), ("tx", &bus.tx)],
        }
    }

    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.signals().into_iter().map(|(_, pin)| pin)
    }
}

impl From<I2c> for Bus {
    fn from(bus: I2c) -> Self {
        Bus::I2c(bus)
    }
}

impl From<Spi> for Bus {
    fn from(bus: Spi) -> Self {
        Bus::Spi(bus)
    }
}

impl From<Uart> for Bus {
    fn from(bus: Uart) -> Self {
        Bus::Uart(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Refdes;

    #[test]
    fn signals_keep_declaration_order() {
        let u1 = Refdes::new("U", 1);
        let bus = Bus::spi(
            &Pin::new("MOSI", 1u32, &u1),
            &Pin::new("MISO", 2u32, &u1),
            &Pin::new("SCK", 3u32, &u1),
            &Pin::new("CS", 4u32, &u1),
        );
        let names: Vec<_> = bus.signals().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["mosi", "miso", "sck", "cs"]);
        assert_eq!(bus.kind().to_string(), "SPI");
        assert_eq!(bus.pins().count(), 4);
    }
}
