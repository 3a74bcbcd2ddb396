//! Pre-flight checks on sensor readings
//!
//! The service re-validates everything it receives. These checks exist so the
//! user sees the same complaints before a request goes out.

use thiserror::Error;

use crate::recommend::SensorReading;

/// Required fields in the order the service reports them
pub const REQUIRED_FIELDS: [&str; 7] = ["N", "P", "K", "ph", "moisture", "temperature", "humidity"];

/// (wire name, label, min, max)
const REALISTIC_RANGES: [(&str, &str, f64, f64); 8] = [
    ("N", "Nitrogen (N)", 0.0, 200.0),
    ("P", "Phosphorus (P)", 0.0, 200.0),
    ("K", "Potassium (K)", 0.0, 300.0),
    ("temperature", "Temperature", -10.0, 60.0),
    ("humidity", "Humidity", 0.0, 100.0),
    ("ph", "pH", 0.0, 14.0),
    ("rainfall", "Rainfall", 0.0, 500.0),
    ("moisture", "Soil Moisture", 0.0, 100.0),
];

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{}", missing_lines(.0))]
    Missing(Vec<&'static str>),

    #[error("Field '{0}' must be a finite number.")]
    NotFinite(&'static str),
}

fn missing_lines(fields: &[&'static str]) -> String {
    fields
        .iter()
        .map(|f| format!("Missing required field: '{}'.", f))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Readings as collected from flags, any of which may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialReading {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub moisture: Option<f64>,
    pub rainfall: Option<f64>,
}

impl PartialReading {
    /// Turn into a full reading, or list everything that is missing
    pub fn complete(self) -> Result<SensorReading, ValidationError> {
        let missing = missing_fields(&self);
        if !missing.is_empty() {
            return Err(ValidationError::Missing(missing));
        }
        let reading = SensorReading {
            nitrogen: self.nitrogen.unwrap_or_default(),
            phosphorus: self.phosphorus.unwrap_or_default(),
            potassium: self.potassium.unwrap_or_default(),
            ph: self.ph.unwrap_or_default(),
            temperature: self.temperature.unwrap_or_default(),
            humidity: self.humidity.unwrap_or_default(),
            moisture: self.moisture.unwrap_or_default(),
            rainfall: self.rainfall,
        };
        ensure_finite(&reading)?;
        Ok(reading)
    }
}

/// Wire names of required fields that have no value
pub fn missing_fields(reading: &PartialReading) -> Vec<&'static str> {
    let present = [
        reading.nitrogen,
        reading.phosphorus,
        reading.potassium,
        reading.ph,
        reading.moisture,
        reading.temperature,
        reading.humidity,
    ];
    REQUIRED_FIELDS
        .iter()
        .zip(present)
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect()
}

/// NaN and infinities can't be encoded as JSON numbers
pub fn ensure_finite(reading: &SensorReading) -> Result<(), ValidationError> {
    for (name, value) in fields(reading) {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ValidationError::NotFinite(name));
            }
        }
    }
    Ok(())
}

/// Warnings for values outside plausible agricultural ranges.
///
/// Never an error. Odd readings are still sent.
pub fn check_realistic_ranges(reading: &SensorReading) -> Vec<String> {
    let values = fields(reading);
    REALISTIC_RANGES
        .iter()
        .filter_map(|&(name, label, low, high)| {
            let value = values.iter().find(|(n, _)| *n == name)?.1?;
            if value < low {
                Some(format!(
                    "Input {} ({}) is below the expected minimum ({}).",
                    label, value, low
                ))
            } else if value > high {
                Some(format!(
                    "Input {} ({}) is above the expected maximum ({}).",
                    label, value, high
                ))
            } else {
                None
            }
        })
        .collect()
}

fn fields(reading: &SensorReading) -> [(&'static str, Option<f64>); 8] {
    [
        ("N", Some(reading.nitrogen)),
        ("P", Some(reading.phosphorus)),
        ("K", Some(reading.potassium)),
        ("ph", Some(reading.ph)),
        ("temperature", Some(reading.temperature)),
        ("humidity", Some(reading.humidity)),
        ("moisture", Some(reading.moisture)),
        ("rainfall", reading.rainfall),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> PartialReading {
        PartialReading {
            nitrogen: Some(90.0),
            phosphorus: Some(42.0),
            potassium: Some(43.0),
            ph: Some(6.5),
            temperature: Some(20.8),
            humidity: Some(82.0),
            moisture: Some(30.0),
            rainfall: None,
        }
    }

    #[test]
    fn test_complete_reading() {
        let reading = full().complete().unwrap();
        assert_eq!(reading.nitrogen, 90.0);
        assert_eq!(reading.rainfall, None);
    }

    #[test]
    fn test_missing_fields_in_service_order() {
        let partial = PartialReading {
            nitrogen: None,
            humidity: None,
            ph: None,
            ..full()
        };
        assert_eq!(missing_fields(&partial), vec!["N", "ph", "humidity"]);
    }

    #[test]
    fn test_rainfall_is_optional() {
        assert!(missing_fields(&full()).is_empty());
    }

    #[test]
    fn test_missing_message_lists_each_field() {
        let err = PartialReading::default().complete().unwrap_err();
        let message = err.to_string();
        assert_eq!(message.lines().count(), 7);
        assert!(message.starts_with("Missing required field: 'N'."));
        assert!(message.ends_with("Missing required field: 'humidity'."));
    }

    #[test]
    fn test_non_finite_rejected() {
        let partial = PartialReading {
            temperature: Some(f64::NAN),
            ..full()
        };
        assert_eq!(
            partial.complete(),
            Err(ValidationError::NotFinite("temperature"))
        );

        let partial = PartialReading {
            rainfall: Some(f64::INFINITY),
            ..full()
        };
        assert_eq!(partial.complete(), Err(ValidationError::NotFinite("rainfall")));
    }

    #[test]
    fn test_ranges_all_ok() {
        let reading = full().complete().unwrap();
        assert!(check_realistic_ranges(&reading).is_empty());
    }

    #[test]
    fn test_range_warnings() {
        let reading = SensorReading {
            nitrogen: 250.0,
            temperature: -12.5,
            rainfall: Some(650.0),
            ..full().complete().unwrap()
        };
        let warnings = check_realistic_ranges(&reading);
        assert_eq!(
            warnings,
            vec![
                "Input Nitrogen (N) (250) is above the expected maximum (200).",
                "Input Temperature (-12.5) is below the expected minimum (-10).",
                "Input Rainfall (650) is above the expected maximum (500).",
            ]
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let reading = SensorReading {
            ph: 14.0,
            humidity: 0.0,
            potassium: 300.0,
            ..full().complete().unwrap()
        };
        assert!(check_realistic_ranges(&reading).is_empty());
    }
}
