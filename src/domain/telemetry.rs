// Telemetry data domain models
use crate::domain::dashboard::NOT_AVAILABLE;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub water_level: f64,
    pub water_temperature: f64,
    pub barometric_pressure: f64,
    pub battery_voltage: f64,
    pub is_anomaly: bool,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Utc>,
        water_level: f64,
        water_temperature: f64,
        barometric_pressure: f64,
        battery_voltage: f64,
        is_anomaly: bool,
    ) -> Self {
        Self {
            timestamp,
            water_level,
            water_temperature,
            barometric_pressure,
            battery_voltage,
            is_anomaly,
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::WaterLevel => self.water_level,
            Channel::WaterTemperature => self.water_temperature,
            Channel::BarometricPressure => self.barometric_pressure,
            Channel::BatteryVoltage => self.battery_voltage,
        }
    }
}

/// One of the four numeric readings carried by every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    WaterLevel,
    WaterTemperature,
    BarometricPressure,
    BatteryVoltage,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::WaterLevel,
        Channel::WaterTemperature,
        Channel::BarometricPressure,
        Channel::BatteryVoltage,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Channel::WaterLevel => "Current Water Level",
            Channel::WaterTemperature => "Water Temperature",
            Channel::BarometricPressure => "Barometric Pressure",
            Channel::BatteryVoltage => "Battery Voltage",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::WaterLevel => "m",
            Channel::WaterTemperature => "°C",
            Channel::BarometricPressure => "hPa",
            Channel::BatteryVoltage => "V",
        }
    }

    /// Decimal places used when the reading is displayed.
    pub fn precision(self) -> usize {
        match self {
            Channel::WaterLevel | Channel::BatteryVoltage => 2,
            Channel::WaterTemperature | Channel::BarometricPressure => 1,
        }
    }

    /// Value with the channel's precision and unit, or `N/A` when not finite.
    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        format!("{:.*} {}", self.precision(), value, self.unit())
    }
}

/// Samples ordered by timestamp, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from samples in any order. The sort is stable, so
    /// readings sharing a timestamp keep their upstream order.
    pub fn from_unordered(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn previous(&self) -> Option<&Sample> {
        self.samples.len().checked_sub(2).map(|i| &self.samples[i])
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| s.is_anomaly)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(d as i64 - 1)
    }

    pub(crate) fn level_sample(d: u32, level: f64, is_anomaly: bool) -> Sample {
        Sample::new(day(d), level, 20.0, 1013.0, 3.9, is_anomaly)
    }

    #[test]
    fn test_from_unordered_sorts_by_timestamp() {
        let series = Series::from_unordered(vec![
            level_sample(3, 3.0, false),
            level_sample(1, 1.0, false),
            level_sample(2, 2.0, true),
        ]);

        let levels: Vec<f64> = series.samples().iter().map(|s| s.water_level).collect();
        assert_eq!(levels, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.latest().unwrap().water_level, 3.0);
        assert_eq!(series.previous().unwrap().water_level, 2.0);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let series = Series::from_unordered(vec![
            level_sample(1, 5.0, false),
            level_sample(1, 6.0, false),
        ]);
        assert_eq!(series.samples()[0].water_level, 5.0);
        assert_eq!(series.samples()[1].water_level, 6.0);
    }

    #[test]
    fn test_previous_requires_two_samples() {
        let series = Series::from_unordered(vec![level_sample(1, 1.0, false)]);
        assert!(series.previous().is_none());
        assert!(Series::empty().latest().is_none());
    }

    #[test]
    fn test_channel_format() {
        assert_eq!(Channel::WaterLevel.format(1.234), "1.23 m");
        assert_eq!(Channel::WaterTemperature.format(18.26), "18.3 °C");
        assert_eq!(Channel::BatteryVoltage.format(3.6), "3.60 V");
        assert_eq!(Channel::BarometricPressure.format(f64::NAN), "N/A");
    }
}
