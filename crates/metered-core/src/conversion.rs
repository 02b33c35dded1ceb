//! Temperature conversion, the billed feature.

use serde::{Deserialize, Serialize};

/// A conversion request: exactly one scale is read.
///
/// When both are present Celsius wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub celsius: Option<f64>,

    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    pub fahrenheit: Option<f64>,
}

/// A converted reading, serialized as `{"F": ..}` or `{"C": ..}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "C")]
    Celsius(f64),
    #[serde(rename = "F")]
    Fahrenheit(f64),
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

impl Conversion {
    pub const fn is_empty(&self) -> bool {
        self.celsius.is_none() && self.fahrenheit.is_none()
    }

    /// Convert to the other scale; `None` when no reading was supplied.
    pub fn convert(&self) -> Option<Temperature> {
        match (self.celsius, self.fahrenheit) {
            (Some(c), _) => Some(Temperature::Fahrenheit(celsius_to_fahrenheit(c))),
            (None, Some(f)) => Some(Temperature::Celsius(fahrenheit_to_celsius(f))),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_convert_picks_the_supplied_scale() {
        let c = Conversion { celsius: Some(0.0), fahrenheit: None };
        assert_eq!(c.convert(), Some(Temperature::Fahrenheit(32.0)));

        let f = Conversion { celsius: None, fahrenheit: Some(212.0) };
        assert_eq!(f.convert(), Some(Temperature::Celsius(100.0)));

        assert!(Conversion::default().is_empty());
        assert_eq!(Conversion::default().convert(), None);
    }

    #[test]
    fn test_wire_shape() {
        let parsed: Conversion = serde_json::from_str(r#"{"C": 0}"#).unwrap();
        assert_eq!(parsed.celsius, Some(0.0));

        let out = serde_json::to_value(Temperature::Fahrenheit(32.0)).unwrap();
        assert_eq!(out["F"].as_f64(), Some(32.0));
    }
}
