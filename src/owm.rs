use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Error;

pub const BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

const UNITS: &str = "metric";
const SUCCESS: i64 = 200;

/// Blocking OpenWeatherMap client.
///
/// Both calls hand back whatever JSON the API answered with, error payloads
/// included; the embedded `cod` field is what callers branch on.
#[derive(Debug, Clone)]
pub struct OwmClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OwmClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http = Client::builder().user_agent("skywatch").build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn current_weather(&self, city: &str) -> Result<Value, Error> {
        self.get_json("weather", city)
    }

    /// 5 day forecast in 3 hour steps.
    pub fn forecast(&self, city: &str) -> Result<Value, Error> {
        self.get_json("forecast", city)
    }

    fn request(&self, endpoint: &str, city: &str) -> RequestBuilder {
        self.http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
    }

    #[instrument(level = "debug", skip(self))]
    fn get_json(&self, endpoint: &str, city: &str) -> Result<Value, Error> {
        let response = self.request(endpoint, city).send()?;
        debug!(status = %response.status(), "response received");
        Ok(response.json()?)
    }
}

/// The embedded status code, when it is an integer.
///
/// Error payloads send it as a string (`"404"`), which never counts as success.
pub fn status_code(payload: &Value) -> Option<i64> {
    payload.get("cod").and_then(Value::as_i64)
}

pub fn is_success(payload: &Value) -> bool {
    status_code(payload) == Some(SUCCESS)
}

pub fn icon_code(payload: &Value) -> Option<&str> {
    payload.pointer("/weather/0/icon").and_then(Value::as_str)
}

pub mod current {
    use super::*;
    use serde_json::Number;

    #[derive(Deserialize, Debug)]
    pub struct Current {
        // Only logged; the heading shows the city as typed.
        #[serde(default)]
        pub name: String,

        pub weather: Vec<Condition>,

        pub main: Main,

        pub wind: Wind,

        pub sys: Sys,
    }

    #[derive(Deserialize, Debug)]
    pub struct Condition {
        pub description: String,

        pub icon: String,
    }

    // Numbers stay as sent so `29.0` is shown as `29.0`.
    #[derive(Deserialize, Debug)]
    pub struct Main {
        pub temp: Number,

        pub feels_like: Number,

        pub humidity: u8,
    }

    #[derive(Deserialize, Debug)]
    pub struct Wind {
        pub speed: Number,

        pub deg: Number,
    }

    #[derive(Deserialize, Debug)]
    pub struct Sys {
        pub country: String,
    }
}

pub mod forecast {
    use super::*;

    #[derive(Deserialize, Debug)]
    pub struct Forecast {
        pub list: Vec<Entry>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Entry {
        pub dt: i64,

        pub main: Main,

        pub weather: Vec<Condition>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Main {
        pub temp: f64,
    }
}
