use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;

/// Condition animations, keyed off OpenWeatherMap icon codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    ClearDay,
    ClearNight,
    Cloudy,
    Rain,
    Default,
}

impl Animation {
    pub fn for_icon(code: &str) -> Self {
        match code {
            "01d" => Animation::ClearDay,
            "01n" => Animation::ClearNight,
            "02d" | "02n" | "03d" | "03n" | "04d" | "04n" => Animation::Cloudy,
            "09d" | "09n" | "10d" | "10n" => Animation::Rain,
            _ => Animation::Default,
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Animation::ClearDay => {
                "https://lottie.host/fbe7a078-f513-489a-b4a6-3faa75300ad3/AtZEG4sQ7S.json"
            }
            Animation::ClearNight => {
                "https://lottie.host/592d0859-6a4d-4cc2-851e-d4a56790094d/vjkZJx13qB.json"
            }
            Animation::Cloudy => {
                "https://lottie.host/df927880-a9bb-41bc-806c-cf83dd37d44a/o4WWiYOsJR.json"
            }
            Animation::Rain => {
                "https://lottie.host/34ed28ed-6417-4109-b9dc-db107c8748bd/4D7v9r9MBA.json"
            }
            Animation::Default => {
                "https://lottie.host/17ff5066-ed15-48da-b12c-bb84cc07c04c/iQibjcEYyR.json"
            }
        }
    }

    /// Terminal frames played in place of the Lottie document.
    pub fn frames(self) -> &'static [[&'static str; 3]] {
        match self {
            Animation::ClearDay => &[
                ["  \\ | /  ", " -- O -- ", "  / | \\  "],
                ["  . | .  ", " -- O -- ", "  . | .  "],
            ],
            Animation::ClearNight => &[
                ["   _  *  ", "  ( (    ", "   ‾   * "],
                ["   _     ", "  ( (  * ", " * ‾     "],
            ],
            Animation::Cloudy => &[
                ["   .--.  ", " (      ).", "  `----' "],
                ["  .--.   ", "(      ). ", " `----'  "],
            ],
            Animation::Rain => &[
                ["  .--.   ", " (    ). ", "  ' ' '  "],
                ["  .--.   ", " (    ). ", "   ' ' ' "],
            ],
            Animation::Default => &[
                ["   ~~~   ", "  ~~~~~  ", "   ~~~   "],
                ["  ~~~    ", "   ~~~~~ ", "  ~~~    "],
            ],
        }
    }

    pub fn frame(self, tick: usize) -> [&'static str; 3] {
        let frames = self.frames();
        frames[tick % frames.len()]
    }
}

/// Fetches an animation document. `None` when the host answers with a
/// non-success status.
pub fn load(http: &Client, url: &str) -> Result<Option<Value>, Error> {
    let response = http.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "animation unavailable");
        return Ok(None);
    }
    debug!(%url, "animation loaded");
    Ok(Some(response.json()?))
}

/// The parts of a Lottie document the terminal can make use of.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LottieMeta {
    #[serde(rename = "nm", default)]
    pub name: Option<String>,

    #[serde(rename = "fr", default)]
    pub frame_rate: f64,

    #[serde(rename = "ip", default)]
    pub in_point: f64,

    #[serde(rename = "op", default)]
    pub out_point: f64,
}

impl LottieMeta {
    pub fn from_payload(payload: &Value) -> Self {
        LottieMeta::deserialize(payload).unwrap_or_default()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        if self.frame_rate > 0.0 && self.out_point > self.in_point {
            Some((self.out_point - self.in_point) / self.frame_rate)
        } else {
            None
        }
    }

    pub fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("animation");
        match self.duration_secs() {
            Some(secs) => format!("{name} · {} fps · {secs:.1}s", self.frame_rate),
            None => name.to_string(),
        }
    }
}

/// What the condition panel shows for one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationAsset {
    Loaded {
        animation: Animation,
        meta: LottieMeta,
    },
    Failed {
        animation: Animation,
    },
}

impl AnimationAsset {
    pub fn new(animation: Animation, payload: Option<Value>) -> Self {
        match payload {
            Some(payload) => AnimationAsset::Loaded {
                animation,
                meta: LottieMeta::from_payload(&payload),
            },
            None => AnimationAsset::Failed { animation },
        }
    }

    pub fn animation(&self) -> Animation {
        match self {
            AnimationAsset::Loaded { animation, .. } | AnimationAsset::Failed { animation } => {
                *animation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url_for_icon(code: &str) -> &'static str {
        Animation::for_icon(code).url()
    }

    #[test]
    fn clear_sky_splits_day_and_night() {
        assert_eq!(Animation::for_icon("01d"), Animation::ClearDay);
        assert_eq!(Animation::for_icon("01n"), Animation::ClearNight);
        assert_ne!(url_for_icon("01d"), url_for_icon("01n"));
    }

    #[test]
    fn cloud_codes_share_one_url() {
        let cloudy = Animation::Cloudy.url();
        for code in ["02d", "02n", "03d", "03n", "04d", "04n"] {
            assert_eq!(url_for_icon(code), cloudy, "{code}");
        }
    }

    #[test]
    fn rain_codes_share_one_url() {
        let rain = Animation::Rain.url();
        for code in ["09d", "09n", "10d", "10n"] {
            assert_eq!(url_for_icon(code), rain, "{code}");
        }
    }

    #[test]
    fn everything_else_falls_back_to_default() {
        for code in ["13n", "50d", "11d", "", "01", "01D", "10dd"] {
            assert_eq!(Animation::for_icon(code), Animation::Default, "{code:?}");
        }
        assert_eq!(
            url_for_icon("13n"),
            "https://lottie.host/17ff5066-ed15-48da-b12c-bb84cc07c04c/iQibjcEYyR.json"
        );
    }

    #[test]
    fn frames_cycle_with_tick() {
        let frames = Animation::Rain.frames();
        assert_eq!(Animation::Rain.frame(0), frames[0]);
        assert_eq!(Animation::Rain.frame(frames.len()), frames[0]);
        assert_eq!(Animation::Rain.frame(1), frames[1]);
    }

    #[test]
    fn lottie_meta_reads_header_fields() {
        let payload = json!({"v": "5.7.4", "nm": "rain", "fr": 30, "ip": 0, "op": 90, "w": 512, "h": 512, "layers": []});
        let meta = LottieMeta::from_payload(&payload);
        assert_eq!(meta.name.as_deref(), Some("rain"));
        assert_eq!(meta.frame_rate, 30.0);
        assert_eq!(meta.duration_secs(), Some(3.0));
        assert_eq!(meta.summary(), "rain · 30 fps · 3.0s");
    }

    #[test]
    fn lottie_meta_tolerates_unknown_documents() {
        let meta = LottieMeta::from_payload(&json!({"unexpected": true}));
        assert_eq!(meta, LottieMeta::default());
        assert_eq!(meta.duration_secs(), None);
        assert_eq!(LottieMeta::from_payload(&json!([1, 2])), LottieMeta::default());
    }

    #[test]
    fn missing_payload_is_a_failed_asset() {
        let asset = AnimationAsset::new(Animation::Rain, None);
        assert_eq!(asset, AnimationAsset::Failed { animation: Animation::Rain });
        assert_eq!(asset.animation(), Animation::Rain);
    }

    async fn load_from(server: &MockServer, asset: &str) -> Result<Option<Value>, Error> {
        let url = format!("{}/{asset}", server.uri());
        tokio::task::spawn_blocking(move || load(&Client::new(), &url))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn refused_asset_loads_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let payload = load_from(&server, "gone.json").await.unwrap();
        assert_eq!(payload, None);
        assert_eq!(
            AnimationAsset::new(Animation::Cloudy, payload),
            AnimationAsset::Failed {
                animation: Animation::Cloudy
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn served_asset_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rain.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"nm": "rain", "fr": 25, "ip": 0, "op": 50})),
            )
            .mount(&server)
            .await;

        let payload = load_from(&server, "rain.json").await.unwrap();
        let asset = AnimationAsset::new(Animation::Rain, payload);
        let AnimationAsset::Loaded { meta, .. } = asset else {
            panic!("expected a loaded asset");
        };
        assert_eq!(meta.summary(), "rain · 25 fps · 2.0s");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn garbled_asset_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let result = load_from(&server, "broken.json").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
