//! Land patterns for the packages used by [`crate::parts`].

use anyhow::{ensure, Result};
use earthground_schematic::{Aperture, Footprint, Pad, PinIndex};

/// TSSOP body widths, as the distance between left and right pad centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TssopWidth {
    W3_0mm,
    W4_4mm,
    W6_1mm,
    W8_0mm,
}

impl TssopWidth {
    pub fn pad_span(&self) -> f64 {
        match self {
            TssopWidth::W3_0mm => 4.3,
            TssopWidth::W4_4mm => 5.725,
            TssopWidth::W6_1mm => 7.425,
            TssopWidth::W8_0mm => 9.325,
        }
    }
}

/// Pad centres of a dual-row package, numbered counter-clockwise from the
/// top-left pad.
///
/// ```text
///     .-------.
/// 1 --|       |-- 8
/// 2 --|       |-- 7
/// 3 --|       |-- 6
/// 4 --|       |-- 5
///     '-------'
/// ```
pub fn dual_row_locations(count: u32, span: f64, pitch: f64) -> Result<Vec<(u32, f64, f64)>> {
    ensure!(
        count > 0 && count % 2 == 0,
        "Dual-row package needs an even, non-zero pin count, got {count}"
    );
    let per_side = count / 2;
    let start = -pitch * (per_side as f64 - 1.0) / 2.0;
    Ok((0..count)
        .map(|index| {
            let right = index >= per_side;
            let x = if right { span / 2.0 } else { -span / 2.0 };
            let y = start + (index % per_side) as f64 * pitch;
            (index + 1, x, if right { -y } else { y })
        })
        .collect())
}

pub fn tssop(count: u32, width: TssopWidth, pitch: f64, pad: Aperture) -> Result<Footprint> {
    let span = width.pad_span();
    Ok(dual_row_locations(count, span, pitch)?.into_iter().fold(
        Footprint::new(format!("TSSOP({count})")).with_description(format!(
            "TSSOP, {count} pin, {span}mm width, {pitch}mm pitch"
        )),
        |footprint, (index, x, y)| footprint.with_pad(index, Pad::new(x, y, pad.clone())),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JstEntry {
    Top,
    Side,
}

/// JST SH (1.0 mm pitch) SMD header with two mounting tabs `M1`/`M2`.
pub fn jst_sh(count: u32, entry: JstEntry) -> Footprint {
    const PITCH: f64 = 1.0;
    let x0 = -(count as f64 - 1.0) * PITCH / 2.0;
    let y0 = match entry {
        JstEntry::Top => -3.375,
        JstEntry::Side => -4.775,
    };
    let signal = Aperture::Rectangle {
        width: 0.6,
        height: 1.55,
        corner_ratio: 0.0,
    };
    let mount = Aperture::Rectangle {
        width: 1.2,
        height: 1.8,
        corner_ratio: 0.0,
    };
    let style = match entry {
        JstEntry::Top => "TOP",
        JstEntry::Side => "SIDE",
    };

    (0..count)
        .fold(
            Footprint::new(format!("JST_SH_1x{count:02}_{style}")),
            |footprint, i| {
                footprint.with_pad(i + 1, Pad::new(x0 + i as f64 * PITCH, y0, signal.clone()))
            },
        )
        .with_pad(PinIndex::from("M1"), Pad::new(x0 - 1.3, 0.9, mount.clone()))
        .with_pad(PinIndex::from("M2"), Pad::new(-x0 + 1.3, 0.9, mount))
}

/// Through-hole header on a 2.54 mm grid. Pads are numbered across each row
/// first: `(1, 2), (3, 4), ...` for two rows.
pub fn pin_header(pins_per_row: u32, rows: u32) -> Footprint {
    const SPACING: f64 = 2.54;
    let aperture = Aperture::Circle {
        diameter: 1.4,
        hole: Some(1.02),
    };
    let x_start = -(rows as f64 - 1.0) * SPACING / 2.0;
    let y_start = -(pins_per_row as f64 - 1.0) * SPACING / 2.0;

    let mut footprint = Footprint::new(format!("HDR_{pins_per_row}x{rows}_2.54mm"))
        .with_description(format!("0.1in header, {pins_per_row}x{rows}"));
    for index in 0..pins_per_row {
        for column in 0..rows {
            let x = x_start + column as f64 * SPACING;
            let y = y_start + index as f64 * SPACING;
            footprint = footprint.with_pad(index * rows + column + 1, Pad::new(x, y, aperture.clone()));
        }
    }
    footprint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_row_is_counter_clockwise() {
        let pads = dual_row_locations(8, 4.0, 1.0).unwrap();
        assert_eq!(pads[0], (1, -2.0, -1.5));
        assert_eq!(pads[3], (4, -2.0, 1.5));
        assert_eq!(pads[4], (5, 2.0, 1.5));
        assert_eq!(pads[7], (8, 2.0, -1.5));
    }

    #[test]
    fn dual_row_rejects_odd_or_empty_counts() {
        for count in [0, 1, 7] {
            let err = dual_row_locations(count, 4.0, 1.0).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Dual-row package needs an even, non-zero pin count, got {count}")
            );
        }
        let pad = Aperture::Circle {
            diameter: 1.0,
            hole: None,
        };
        assert!(tssop(3, TssopWidth::W4_4mm, 0.65, pad).is_err());
    }

    #[test]
    fn jst_sh_has_mounting_tabs() {
        let footprint = jst_sh(4, JstEntry::Side);
        assert_eq!(footprint.name, "JST_SH_1x04_SIDE");
        assert_eq!(footprint.pads.len(), 6);
        assert_eq!(footprint.pads[&PinIndex::Number(1)].location, (-1.5, -4.775));
        let (x, y) = footprint.pads[&PinIndex::from("M2")].location;
        assert!((x - 2.8).abs() < 1e-9 && y == 0.9);
    }

    #[test]
    fn header_pads_alternate_between_rows() {
        let footprint = pin_header(3, 2);
        assert_eq!(footprint.pads.len(), 6);
        assert_eq!(footprint.pads[&PinIndex::Number(1)].location, (-1.27, -2.54));
        assert_eq!(footprint.pads[&PinIndex::Number(2)].location, (1.27, -2.54));
        assert_eq!(footprint.pads[&PinIndex::Number(3)].location, (-1.27, 0.0));
    }
}
