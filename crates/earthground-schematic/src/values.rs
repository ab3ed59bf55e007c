//! Engineering values with SI prefixes and E-series preferred numbers.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchematicError};

/// SI prefixes, largest first so formatting picks the biggest one that fits.
const SI_PREFIXES: [(&str, f64); 8] = [
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("", 1.0),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
];

pub const OHM: &str = "Ω";
pub const FARAD: &str = "F";
pub const VOLT: &str = "V";

/// A number paired with its unit, e.g. `4.7kΩ`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiValue {
    value: f64,
    unit: String,
}

impl SiValue {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Parse strings such as `"10k"`, `"1u"`, `"100nF"` or `"3.3"`.
    ///
    /// A trailing `unit` is optional. `µ` is accepted as an alias for `u`.
    pub fn parse(text: &str, unit: &str) -> Result<Self> {
        let invalid = |reason: &str| SchematicError::InvalidValue {
            value: text.to_owned(),
            reason: reason.to_owned(),
        };

        let mut body = text.trim();
        if !unit.is_empty() {
            body = body.strip_suffix(unit).unwrap_or(body);
        }
        let body = body.replace('µ', "u");
        if body.is_empty() {
            return Err(invalid("empty value"));
        }

        let (number, multiplier) = match SI_PREFIXES
            .iter()
            .filter(|(prefix, _)| !prefix.is_empty())
            .find(|(prefix, _)| body.ends_with(prefix))
        {
            Some((prefix, multiplier)) => (&body[..body.len() - prefix.len()], *multiplier),
            None => (body.as_str(), 1.0),
        };

        let number: f64 = number
            .parse()
            .map_err(|_| invalid(&format!("expected a number with an optional SI prefix and unit '{unit}'")))?;
        Ok(Self::new(number * multiplier, unit))
    }

    pub fn ohms(text: &str) -> Result<Self> {
        Self::parse(text, OHM)
    }

    pub fn farads(text: &str) -> Result<Self> {
        Self::parse(text, FARAD)
    }

    pub fn volts(text: &str) -> Result<Self> {
        Self::parse(text, VOLT)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl std::fmt::Display for SiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.value.abs();
        let (prefix, scale) = SI_PREFIXES
            .iter()
            .find(|(_, scale)| magnitude >= *scale)
            .copied()
            .unwrap_or(("", 1.0));
        write!(f, "{}{}{}", trim_number(self.value / scale), prefix, self.unit)
    }
}

/// Format with at most three decimals and no trailing zeros.
fn trim_number(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}

/// Published values that differ from the rounded geometric formula.
fn series_exceptions(e: u32) -> &'static [(f64, f64)] {
    match e {
        24 => &[
            (2.6, 2.7),
            (2.9, 3.0),
            (3.2, 3.3),
            (3.5, 3.6),
            (3.8, 3.9),
            (4.2, 4.3),
            (4.6, 4.7),
            (8.3, 8.2),
        ],
        192 => &[(9.19, 9.20)],
        _ => &[],
    }
}

/// The preferred numbers of the E-`e` series within one decade (1.0 ≤ v < 10).
///
/// See <https://en.wikipedia.org/wiki/E_series_of_preferred_numbers>.
pub fn standard_values(e: u32) -> Vec<f64> {
    if e == 0 {
        return Vec::new();
    }
    let decimals = if e < 48 { 1 } else { 2 };
    let scale = 10f64.powi(decimals);
    let mut values: Vec<f64> = (0..e)
        .map(|i| (10f64.powf(i as f64 / e as f64) * scale).round() / scale)
        .collect();

    for (computed, published) in series_exceptions(e) {
        if let Some(slot) = values.iter_mut().find(|v| (**v - computed).abs() < 1e-9) {
            *slot = *published;
        }
    }
    values
}

/// Pick the pair of E-`e` values whose quotient is closest to `ratio`.
///
/// The pair is returned larger-first when `ratio < 1`, smaller-first otherwise.
pub fn closest_ratio(ratio: f64, e: u32) -> Option<(f64, f64)> {
    let values = standard_values(e);
    let mut best: Option<(f64, f64)> = None;
    let mut best_diff = f64::INFINITY;

    for a in &values {
        for b in &values {
            let diff = (a / b - ratio).abs();
            if diff < best_diff {
                best_diff = diff;
                best = Some((*a, *b));
            }
        }
    }

    best.map(|(a, b)| {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        if ratio < 1.0 {
            (high, low)
        } else {
            (low, high)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_values() {
        assert_eq!(SiValue::ohms("1k").unwrap().value(), 1000.0);
        assert_eq!(SiValue::ohms("4.7kΩ").unwrap().value(), 4700.0);
        assert!((SiValue::farads("100n").unwrap().value() - 100e-9).abs() < 1e-18);
        assert!((SiValue::farads("1µF").unwrap().value() - 1e-6).abs() < 1e-15);
        assert_eq!(SiValue::volts("3.3").unwrap().value(), 3.3);
        assert_eq!(SiValue::ohms("1M").unwrap().value(), 1e6);
    }

    #[test]
    fn rejects_garbage() {
        let err = SiValue::ohms("ten").unwrap_err();
        assert!(matches!(err, SchematicError::InvalidValue { .. }));
        assert!(SiValue::ohms("").is_err());
    }

    #[test]
    fn formats_with_largest_prefix() {
        assert_eq!(SiValue::new(1000.0, OHM).to_string(), "1kΩ");
        assert_eq!(SiValue::new(4.7e-6, FARAD).to_string(), "4.7uF");
        assert_eq!(SiValue::new(10.0, VOLT).to_string(), "10V");
        assert_eq!(SiValue::new(0.0, OHM).to_string(), "0Ω");
    }

    #[test]
    fn e24_series_uses_published_values() {
        let e24 = standard_values(24);
        assert_eq!(e24.len(), 24);
        for expected in [1.0, 2.7, 3.0, 3.3, 4.7, 8.2, 9.1] {
            assert!(e24.iter().any(|v| (v - expected).abs() < 1e-9), "{expected}");
        }
        assert!(!e24.iter().any(|v| (v - 8.3).abs() < 1e-9));
    }

    #[test]
    fn closest_ratio_orders_pair() {
        assert_eq!(closest_ratio(0.5, 24), Some((2.0, 1.0)));
        assert_eq!(closest_ratio(2.0, 24), Some((1.0, 2.0)));
    }
}
