// Dashboard service - Use case for building dashboards from the latest snapshot
use crate::application::chart_renderer::{render_chart, ChartRender, ChartStyle, Dimensions};
use crate::application::dashboard_store::DashboardSnapshot;
use crate::domain::dashboard::{
    AnomalyEntry, CardStatus, Dashboard, MapMarker, MetricCard, Trend, NOT_AVAILABLE,
    NO_ANOMALIES_MESSAGE, NO_MAP_DATA_MESSAGE, STATIONS,
};
use crate::domain::telemetry::{Channel, Sample, Series};

pub const DASHBOARD_TITLE: &str = "Water Monitoring Dashboard";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub battery_warning_volts: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            battery_warning_volts: 3.6,
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    chart_style: ChartStyle,
    chart_dimensions: Dimensions,
    thresholds: Thresholds,
}

impl DashboardService {
    pub fn new(chart_style: ChartStyle, chart_dimensions: Dimensions, thresholds: Thresholds) -> Self {
        Self {
            chart_style,
            chart_dimensions,
            thresholds,
        }
    }

    pub fn chart_dimensions(&self) -> Dimensions {
        self.chart_dimensions
    }

    pub fn get_dashboard(&self, snapshot: &DashboardSnapshot) -> Dashboard {
        let series = &snapshot.series;
        let anomalies = anomaly_list(series);
        let markers = map_markers(series);

        Dashboard {
            title: DASHBOARD_TITLE.to_string(),
            status: snapshot.status.clone(),
            last_updated: snapshot.last_updated,
            sample_count: series.len(),
            cards: self.metric_cards(series),
            anomaly_message: anomalies.is_empty().then(|| NO_ANOMALIES_MESSAGE.to_string()),
            anomalies,
            map_message: markers.is_empty().then(|| NO_MAP_DATA_MESSAGE.to_string()),
            markers,
        }
    }

    /// Render the chart for `channel` (the configured one when `None`).
    pub fn get_chart(
        &self,
        snapshot: &DashboardSnapshot,
        dimensions: Option<Dimensions>,
        channel: Option<Channel>,
    ) -> ChartRender {
        let style = match channel {
            Some(channel) => self.chart_style.for_channel(channel),
            None => self.chart_style.clone(),
        };
        render_chart(
            &snapshot.series,
            dimensions.unwrap_or(self.chart_dimensions),
            &style,
        )
    }

    pub fn metric_cards(&self, series: &Series) -> Vec<MetricCard> {
        Channel::ALL
            .iter()
            .map(|&channel| self.metric_card(series, channel))
            .collect()
    }

    fn metric_card(&self, series: &Series, channel: Channel) -> MetricCard {
        let latest = series.latest();
        let value = latest
            .map(|s| channel.format(s.value(channel)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let delta = latest
            .zip(series.previous())
            .map(|(last, prev)| last.value(channel) - prev.value(channel));
        let (change, trend) = match delta {
            Some(d) => (channel.format(d), trend_of(d, channel.precision())),
            None => (NOT_AVAILABLE.to_string(), None),
        };

        MetricCard {
            channel,
            title: channel.title().to_string(),
            value,
            change,
            trend,
            status: latest
                .map(|s| self.card_status(s, channel))
                .unwrap_or(CardStatus::Normal),
        }
    }

    fn card_status(&self, latest: &Sample, channel: Channel) -> CardStatus {
        match channel {
            Channel::WaterLevel if latest.is_anomaly => CardStatus::Alert,
            Channel::BatteryVoltage
                if latest.battery_voltage < self.thresholds.battery_warning_volts =>
            {
                CardStatus::Warning
            }
            _ => CardStatus::Normal,
        }
    }
}

/// Direction of a change as it reads once rounded to `precision` decimals,
/// so a card never shows "0.00" next to an up arrow.
fn trend_of(delta: f64, precision: usize) -> Option<Trend> {
    if !delta.is_finite() {
        return None;
    }
    let scale = 10f64.powi(precision as i32);
    let rounded = (delta * scale).round();
    Some(if rounded > 0.0 {
        Trend::Up
    } else if rounded < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    })
}

pub fn anomaly_list(series: &Series) -> Vec<AnomalyEntry> {
    series
        .anomalies()
        .map(|s| AnomalyEntry {
            timestamp: s.timestamp,
            date: s.timestamp.format("%b %-d, %Y").to_string(),
            water_level: Channel::WaterLevel.format(s.water_level),
            water_temperature: Channel::WaterTemperature.format(s.water_temperature),
            barometric_pressure: Channel::BarometricPressure.format(s.barometric_pressure),
            battery_voltage: Channel::BatteryVoltage.format(s.battery_voltage),
        })
        .collect()
}

/// One marker per station, showing the latest sample assigned to it when
/// samples are dealt to stations round-robin by index.
pub fn map_markers(series: &Series) -> Vec<MapMarker> {
    let samples = series.samples();

    STATIONS
        .iter()
        .enumerate()
        .filter_map(|(slot, station)| {
            // Stations beyond a short series fall back to the latest sample.
            let index = (slot..samples.len())
                .step_by(STATIONS.len())
                .last()
                .or_else(|| samples.len().checked_sub(1))?;
            let sample = &samples[index];
            Some(MapMarker {
                station: *station,
                sample_index: index,
                water_level: Channel::WaterLevel.format(sample.water_level),
                water_temperature: Channel::WaterTemperature.format(sample.water_temperature),
                is_anomaly: sample.is_anomaly,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::FeedStatus;
    use crate::domain::telemetry::tests::{day, level_sample};
    use std::sync::Arc;

    fn service() -> DashboardService {
        DashboardService::new(ChartStyle::default(), Dimensions::default(), Thresholds::default())
    }

    fn card(cards: &[MetricCard], channel: Channel) -> &MetricCard {
        cards.iter().find(|c| c.channel == channel).unwrap()
    }

    #[test]
    fn test_cards_for_empty_series() {
        let cards = service().metric_cards(&Series::empty());
        assert_eq!(cards.len(), 4);
        for c in &cards {
            assert_eq!(c.value, NOT_AVAILABLE);
            assert_eq!(c.change, NOT_AVAILABLE);
            assert_eq!(c.trend, None);
            assert_eq!(c.status, CardStatus::Normal);
        }
    }

    #[test]
    fn test_single_sample_has_no_delta() {
        let series = Series::from_unordered(vec![level_sample(1, 1.5, false)]);
        let cards = service().metric_cards(&series);
        let level = card(&cards, Channel::WaterLevel);
        assert_eq!(level.value, "1.50 m");
        assert_eq!(level.change, NOT_AVAILABLE);
    }

    #[test]
    fn test_delta_trend_and_alert() {
        let series = Series::from_unordered(vec![
            level_sample(1, 1.0, false),
            level_sample(2, 1.25, true),
        ]);
        let cards = service().metric_cards(&series);
        let level = card(&cards, Channel::WaterLevel);

        assert_eq!(level.value, "1.25 m");
        assert_eq!(level.change, "0.25 m");
        assert_eq!(level.trend, Some(Trend::Up));
        assert_eq!(level.status, CardStatus::Alert);

        let temperature = card(&cards, Channel::WaterTemperature);
        assert_eq!(temperature.change, "0.0 °C");
        assert_eq!(temperature.trend, Some(Trend::Flat));
        assert_eq!(temperature.status, CardStatus::Normal);
    }

    #[test]
    fn test_low_battery_warns() {
        let mut low = level_sample(2, 1.0, false);
        low.battery_voltage = 3.5;
        let series = Series::from_unordered(vec![level_sample(1, 1.0, false), low]);
        let cards = service().metric_cards(&series);

        let battery = card(&cards, Channel::BatteryVoltage);
        assert_eq!(battery.status, CardStatus::Warning);
        assert_eq!(battery.value, "3.50 V");
        assert_eq!(battery.change, "-0.40 V");
        assert_eq!(battery.trend, Some(Trend::Down));
        assert_eq!(card(&cards, Channel::WaterLevel).status, CardStatus::Normal);
    }

    #[test]
    fn test_anomaly_list_filters_and_formats() {
        let series = Series::from_unordered(vec![
            level_sample(1, 1.0, false),
            level_sample(2, 3.0, true),
            level_sample(3, 2.0, false),
        ]);
        let anomalies = anomaly_list(&series);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].timestamp, day(2));
        assert_eq!(anomalies[0].date, "Jan 2, 2024");
        assert_eq!(anomalies[0].water_level, "3.00 m");
        assert_eq!(anomalies[0].barometric_pressure, "1013.0 hPa");
    }

    #[test]
    fn test_map_markers_cycle_stations() {
        let samples: Vec<Sample> = (1..=6).map(|d| level_sample(d, d as f64, d == 6)).collect();
        let markers = map_markers(&Series::from_unordered(samples));

        assert_eq!(markers.len(), 4);
        let indices: Vec<usize> = markers.iter().map(|m| m.sample_index).collect();
        assert_eq!(indices, vec![4, 5, 2, 3]);
        assert_eq!(markers[1].station.label, "Station B");
        assert!(markers[1].is_anomaly);
        assert!(!markers[0].is_anomaly);
    }

    #[test]
    fn test_map_markers_with_few_samples() {
        let markers = map_markers(&Series::from_unordered(vec![
            level_sample(1, 1.0, false),
            level_sample(2, 2.0, true),
        ]));
        assert_eq!(markers.len(), 4);
        let labels: Vec<&str> = markers.iter().map(|m| m.station.label).collect();
        assert_eq!(labels, vec!["Station A", "Station B", "Station C", "Station D"]);
        let indices: Vec<usize> = markers.iter().map(|m| m.sample_index).collect();
        assert_eq!(indices, vec![0, 1, 1, 1]);
        assert!(!markers[0].is_anomaly);
        assert!(markers[3].is_anomaly);
        assert_eq!(markers[3].water_level, "2.00 m");

        assert!(map_markers(&Series::empty()).is_empty());
    }

    #[test]
    fn test_dashboard_messages() {
        let snapshot = DashboardSnapshot {
            status: FeedStatus::Ready,
            series: Arc::new(Series::empty()),
            last_updated: None,
        };
        let dashboard = service().get_dashboard(&snapshot);

        assert_eq!(dashboard.title, DASHBOARD_TITLE);
        assert_eq!(dashboard.sample_count, 0);
        assert_eq!(dashboard.anomaly_message.as_deref(), Some(NO_ANOMALIES_MESSAGE));
        assert_eq!(dashboard.map_message.as_deref(), Some(NO_MAP_DATA_MESSAGE));
    }

    #[test]
    fn test_chart_channel_override() {
        let snapshot = DashboardSnapshot {
            status: FeedStatus::Ready,
            series: Arc::new(Series::from_unordered(vec![level_sample(1, 1.0, false)])),
            last_updated: None,
        };
        let render = service().get_chart(
            &snapshot,
            Some(Dimensions::new(300.0, 150.0)),
            Some(Channel::BatteryVoltage),
        );
        assert_eq!(render.channel, Channel::BatteryVoltage);
        assert_eq!(render.dimensions, Dimensions::new(300.0, 150.0));
    }
}
