use chrono::Local;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::animation::{self, Animation, AnimationAsset};
use crate::dashboard::{title_case, Dashboard};
use crate::error::Error;
use crate::owm::{self, OwmClient};
use crate::weather::{self, Snapshot};

pub const NOT_FOUND: &str = "City not found. Please check the spelling.";

/// The three fetches a render pass needs.
pub trait WeatherSource {
    fn current_weather(&self, city: &str) -> Result<Value, Error>;

    fn forecast(&self, city: &str) -> Result<Value, Error>;

    /// `None` when the asset host refuses the request.
    fn animation(&self, url: &str) -> Result<Option<Value>, Error>;
}

impl WeatherSource for OwmClient {
    fn current_weather(&self, city: &str) -> Result<Value, Error> {
        OwmClient::current_weather(self, city)
    }

    fn forecast(&self, city: &str) -> Result<Value, Error> {
        OwmClient::forecast(self, city)
    }

    fn animation(&self, url: &str) -> Result<Option<Value>, Error> {
        animation::load(self.http(), url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Dashboard(Box<Dashboard>),
    NotFound,
}

/// Result of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub city: String,
    pub debug_line: Option<String>,
    pub outcome: Outcome,
}

/// A pass runs when the trigger was pressed or there is a city to look up.
pub fn should_refresh(pressed: bool, city: &str) -> bool {
    pressed || !city.trim().is_empty()
}

pub fn normalize_city(input: &str) -> String {
    title_case(input.trim())
}

#[instrument(skip(source))]
pub fn run_pass<S>(source: &S, city_input: &str) -> Result<Pass, Error>
where
    S: WeatherSource + ?Sized,
{
    let city = normalize_city(city_input);
    let current = source.current_weather(&city)?;

    let debug_line =
        owm::icon_code(&current).map(|icon| format!("DEBUG: API Icon Code is {icon}"));
    if let Some(line) = &debug_line {
        debug!("{line}");
    }

    if !owm::is_success(&current) {
        warn!(status = ?owm::status_code(&current), %city, "city lookup failed");
        return Ok(Pass {
            city,
            debug_line,
            outcome: Outcome::NotFound,
        });
    }

    let forecast = source.forecast(&city)?;
    let snapshot = Snapshot::from_payload(current)?;

    let chosen = Animation::for_icon(&snapshot.icon);
    let asset = AnimationAsset::new(chosen, source.animation(chosen.url())?);

    let points = weather::forecast_points(forecast)?;
    let dashboard = Dashboard::build(&city, &snapshot, &points, asset, &Local);
    info!(
        %city,
        resolved = %snapshot.city,
        points = dashboard.chart.len(),
        "dashboard updated"
    );

    Ok(Pass {
        city,
        debug_line,
        outcome: Outcome::Dashboard(Box::new(dashboard)),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dashboard::FORECAST_WINDOW;
    use serde_json::json;
    use std::cell::RefCell;

    /// Canned responses; records every request it sees.
    #[derive(Debug)]
    pub(crate) struct FakeSource {
        pub current: Value,
        pub forecast: Value,
        pub animation: Option<Value>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        pub fn new(current: Value, forecast: Value) -> Self {
            Self {
                current,
                forecast,
                animation: Some(json!({"nm": "rain", "fr": 30, "ip": 0, "op": 60})),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls_to(&self, prefix: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    impl WeatherSource for FakeSource {
        fn current_weather(&self, city: &str) -> Result<Value, Error> {
            self.calls.borrow_mut().push(format!("weather:{city}"));
            Ok(self.current.clone())
        }

        fn forecast(&self, city: &str) -> Result<Value, Error> {
            self.calls.borrow_mut().push(format!("forecast:{city}"));
            Ok(self.forecast.clone())
        }

        fn animation(&self, url: &str) -> Result<Option<Value>, Error> {
            self.calls.borrow_mut().push(format!("animation:{url}"));
            Ok(self.animation.clone())
        }
    }

    pub(crate) fn karachi_current() -> Value {
        json!({
            "cod": 200,
            "name": "Karachi",
            "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 29.5, "feels_like": 33.1, "humidity": 60},
            "wind": {"speed": 4.1, "deg": 180},
            "sys": {"country": "PK"}
        })
    }

    pub(crate) fn forecast_of(n: usize) -> Value {
        let list: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "dt": 1_700_000_000 + i as i64 * 10_800,
                    "main": {"temp": 28.0 + i as f64 * 0.5},
                    "weather": [{"description": "light rain", "icon": "10d"}]
                })
            })
            .collect();
        json!({"cod": "200", "cnt": n, "list": list})
    }

    pub(crate) fn not_found() -> Value {
        json!({"cod": "404", "message": "city not found"})
    }

    #[test]
    fn karachi_renders_full_dashboard() {
        let source = FakeSource::new(karachi_current(), forecast_of(40));
        let pass = run_pass(&source, "karachi").unwrap();

        assert_eq!(pass.city, "Karachi");
        assert_eq!(pass.debug_line.as_deref(), Some("DEBUG: API Icon Code is 10d"));
        let Outcome::Dashboard(dashboard) = pass.outcome else {
            panic!("expected a dashboard");
        };
        assert_eq!(dashboard.heading, "Dashboard: Karachi, PK");
        assert_eq!(dashboard.metrics.temperature, "29.5°C");
        assert_eq!(dashboard.metrics.feels_like, "Feels like 33.1°C");
        assert_eq!(dashboard.metrics.humidity, "60%");
        assert_eq!(dashboard.metrics.wind_speed, "4.1 m/s");
        assert_eq!(dashboard.metrics.wind_direction, "180°");
        assert_eq!(dashboard.metrics.rotation, 180.0);
        assert_eq!(dashboard.animation.animation(), Animation::Rain);
        assert!(matches!(dashboard.animation, AnimationAsset::Loaded { .. }));
        assert_eq!(dashboard.chart.len(), FORECAST_WINDOW);
        for label in dashboard.chart.labels() {
            assert_eq!(label.len(), 5);
            assert_eq!(&label[2..3], ":");
        }

        assert_eq!(
            *source.calls.borrow(),
            vec![
                "weather:Karachi".to_string(),
                "forecast:Karachi".to_string(),
                format!("animation:{}", Animation::Rain.url()),
            ]
        );
    }

    #[test]
    fn unknown_city_skips_forecast() {
        let source = FakeSource::new(not_found(), forecast_of(40));
        let pass = run_pass(&source, "Zzzznotacity").unwrap();

        assert_eq!(pass.outcome, Outcome::NotFound);
        assert_eq!(pass.debug_line, None);
        assert_eq!(source.calls_to("weather:"), 1);
        assert_eq!(source.calls_to("forecast:"), 0);
        assert_eq!(source.calls_to("animation:"), 0);
    }

    #[test]
    fn any_status_other_than_200_is_not_found() {
        for status in [json!(401), json!("200"), json!(null)] {
            let mut current = karachi_current();
            current["cod"] = status;
            let source = FakeSource::new(current, forecast_of(8));
            let pass = run_pass(&source, "Karachi").unwrap();
            assert_eq!(pass.outcome, Outcome::NotFound);
            assert_eq!(source.calls_to("forecast:"), 0);
        }
    }

    #[test]
    fn short_forecast_is_not_an_error() {
        let source = FakeSource::new(karachi_current(), forecast_of(3));
        let pass = run_pass(&source, "Karachi").unwrap();
        let Outcome::Dashboard(dashboard) = pass.outcome else {
            panic!("expected a dashboard");
        };
        assert_eq!(dashboard.chart.len(), 3);
    }

    #[test]
    fn failed_animation_still_renders_dashboard() {
        let mut source = FakeSource::new(karachi_current(), forecast_of(8));
        source.animation = None;
        let pass = run_pass(&source, "Karachi").unwrap();
        let Outcome::Dashboard(dashboard) = pass.outcome else {
            panic!("expected a dashboard");
        };
        assert_eq!(
            dashboard.animation,
            AnimationAsset::Failed {
                animation: Animation::Rain
            }
        );
        assert_eq!(dashboard.metrics.temperature, "29.5°C");
    }

    #[test]
    fn malformed_forecast_aborts_the_pass() {
        let source = FakeSource::new(karachi_current(), json!({"cod": "200"}));
        assert!(matches!(run_pass(&source, "Karachi"), Err(Error::Json(_))));
    }

    #[test]
    fn incomplete_current_weather_aborts_the_pass() {
        for (parent, field) in [("/wind", "deg"), ("/sys", "country"), ("/weather/0", "icon")] {
            let mut current = karachi_current();
            current
                .pointer_mut(parent)
                .and_then(Value::as_object_mut)
                .unwrap()
                .remove(field);
            let source = FakeSource::new(current, forecast_of(8));
            assert!(
                matches!(run_pass(&source, "Karachi"), Err(Error::Json(_))),
                "{parent}/{field}"
            );
            assert_eq!(source.calls_to("animation:"), 0);
        }
    }

    #[test]
    fn city_input_is_trimmed_and_title_cased() {
        assert_eq!(normalize_city("  new york "), "New York");
        let source = FakeSource::new(not_found(), forecast_of(0));
        run_pass(&source, "  lahore").unwrap();
        assert_eq!(source.calls.borrow()[0], "weather:Lahore");
    }

    #[test]
    fn refresh_gate_is_open_once_a_city_is_present() {
        assert!(should_refresh(false, "Karachi"));
        assert!(should_refresh(true, "Karachi"));
        assert!(should_refresh(true, ""));
        assert!(!should_refresh(false, "   "));
    }
}
