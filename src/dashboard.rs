use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use ratatui::style::Color;

use crate::animation::AnimationAsset;
use crate::units::direction;
use crate::weather::{ForecastPoint, Snapshot};

/// Forecast entries charted: 8 steps of 3 hours.
pub const FORECAST_WINDOW: usize = 8;

pub const CHART_TITLE: &str = " 24-Hour Temperature Timeline ";
pub const SERIES_NAME: &str = "Temp °C";
pub const X_TITLE: &str = "Time";
pub const Y_TITLE: &str = "Temperature (°C)";

pub const LINE_COLOR: Color = Color::Rgb(0x00, 0x73, 0xe6);
pub const GRID_COLOR: Color = Color::Gray;
// Reset leaves the terminal's own background showing through.
pub const BACKGROUND: Color = Color::Reset;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub compass: String,
    pub rotation: f64,
}

impl Metrics {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            temperature: format!("{}°C", snapshot.temperature),
            feels_like: format!("Feels like {}°C", snapshot.feels_like),
            humidity: format!("{}%", snapshot.humidity),
            wind_speed: format!("{} m/s", snapshot.wind_speed),
            wind_direction: format!("{}°", snapshot.wind_deg),
            compass: direction::degree_to_compass(snapshot.wind_bearing()).to_string(),
            rotation: rotation_for(snapshot.wind_bearing()),
        }
    }

    pub fn arrow(&self) -> &'static str {
        direction::rotated_arrow(self.rotation)
    }
}

/// Rotation applied to the wind indicator: the reported bearing, as is.
pub fn rotation_for(deg: f64) -> f64 {
    deg
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub temperature: f64,
    pub condition: String,
}

impl ChartPoint {
    pub fn hover_text(&self) -> String {
        format!(
            "Time: {} | Temp: {}°C | Condition: {}",
            self.label, self.temperature, self.condition
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureChart {
    pub points: Vec<ChartPoint>,
}

impl TemperatureChart {
    pub fn from_forecast<Tz>(forecast: &[ForecastPoint], tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let points = forecast
            .iter()
            .take(FORECAST_WINDOW)
            .map(|point| ChartPoint {
                label: time_label(point.timestamp, tz),
                temperature: point.temperature,
                condition: title_case(&point.description),
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(index, temperature)` pairs; x is the position of the time label.
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.temperature))
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, self.len().saturating_sub(1).max(1) as f64]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let temps = self.points.iter().map(|p| p.temperature);
        let min = temps.clone().fold(f64::INFINITY, f64::min);
        let max = temps.fold(f64::NEG_INFINITY, f64::max);
        if min.is_finite() && max.is_finite() {
            [(min - 1.0).floor(), (max + 1.0).ceil()]
        } else {
            [0.0, 1.0]
        }
    }

    pub fn hover(&self, index: usize) -> Option<String> {
        self.points.get(index).map(ChartPoint::hover_text)
    }
}

/// Zero-padded `HH:MM` in the given zone.
pub fn time_label<Tz>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(tz).format("%H:%M").to_string()
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Everything drawn for a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub heading: String,
    pub condition: String,
    pub metrics: Metrics,
    pub chart: TemperatureChart,
    pub animation: AnimationAsset,
}

impl Dashboard {
    pub fn build<Tz>(
        city: &str,
        snapshot: &Snapshot,
        forecast: &[ForecastPoint],
        animation: AnimationAsset,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            heading: format!("Dashboard: {city}, {}", snapshot.country),
            condition: title_case(&snapshot.description),
            metrics: Metrics::from_snapshot(snapshot),
            chart: TemperatureChart::from_forecast(forecast, tz),
            animation,
        }
    }
}
