use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::error::Error;
use crate::owm;

/// Current conditions for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub city: String,
    pub country: String,
    pub temperature: Number,
    pub feels_like: Number,
    pub humidity: u8,
    pub wind_speed: Number,
    pub wind_deg: Number,
    pub description: String,
    pub icon: String,
}

impl Snapshot {
    pub fn from_payload(payload: Value) -> Result<Self, Error> {
        let current: owm::current::Current = serde_json::from_value(payload)?;
        let condition = current
            .weather
            .into_iter()
            .next()
            .ok_or(Error::MissingField("weather[0]"))?;

        Ok(Self {
            city: current.name,
            country: current.sys.country,
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            wind_deg: current.wind.deg,
            description: condition.description,
            icon: condition.icon,
        })
    }

    /// Wind bearing in degrees as a float, for the direction indicator.
    pub fn wind_bearing(&self) -> f64 {
        // Every JSON number has an f64 reading without arbitrary_precision.
        self.wind_deg.as_f64().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub description: String,
}

pub fn forecast_points(payload: Value) -> Result<Vec<ForecastPoint>, Error> {
    let forecast: owm::forecast::Forecast = serde_json::from_value(payload)?;
    forecast
        .list
        .into_iter()
        .map(|entry| {
            let timestamp =
                DateTime::from_timestamp(entry.dt, 0).ok_or(Error::MissingField("list[].dt"))?;
            let description = entry
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .ok_or(Error::MissingField("list[].weather[0]"))?;
            Ok(ForecastPoint {
                timestamp,
                temperature: entry.main.temp,
                description,
            })
        })
        .collect()
}
