//! Current weather via Open-Meteo. No API key required.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::signal::Signal;

/// Jaipur coordinates. Location strings are carried through for
/// context, but the forecast is always fetched for Jaipur.
const JAIPUR_LAT: f64 = 26.9124;
const JAIPUR_LON: f64 = 75.7873;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Weather fields used in the advisory context. All optional; the
/// upstream response omits fields freely.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location: String,
    pub temperature_c: Option<f64>,
    pub windspeed_kmh: Option<f64>,
    pub weathercode: Option<i64>,
    pub humidity: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

impl WeatherSnapshot {
    /// Snapshot with every reading missing, used when the fetch fails.
    pub fn unknown(location: &str) -> Self {
        Self {
            location: location.to_string(),
            temperature_c: None,
            windspeed_kmh: None,
            weathercode: None,
            humidity: None,
            precipitation_mm: None,
        }
    }

    /// Render the readings that are present as `key=value` pairs.
    pub fn context_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("location", self.location.clone())];
        if let Some(t) = self.temperature_c {
            fields.push(("temperature_c", t.to_string()));
        }
        if let Some(w) = self.windspeed_kmh {
            fields.push(("windspeed_kmh", w.to_string()));
        }
        if let Some(c) = self.weathercode {
            fields.push(("weathercode", c.to_string()));
        }
        if let Some(h) = self.humidity {
            fields.push(("humidity", h.to_string()));
        }
        if let Some(p) = self.precipitation_mm {
            fields.push(("precipitation_mm", p.to_string()));
        }
        fields
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
    #[serde(default)]
    hourly: Option<Hourly>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
}

#[derive(Deserialize)]
struct Hourly {
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

/// Open-Meteo client.
pub struct WeatherService {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new("https://api.open-meteo.com")
    }
}

impl WeatherService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch current weather. Failure yields `Signal::Failed`; the
    /// retriever substitutes [`WeatherSnapshot::unknown`].
    pub async fn fetch(&self, location: &str) -> Signal<WeatherSnapshot> {
        let url = format!("{}/v1/forecast", self.base_url);
        let result = self
            .client
            .get(&url)
            .query(&[
                ("latitude", JAIPUR_LAT.to_string()),
                ("longitude", JAIPUR_LON.to_string()),
                ("current_weather", "true".to_string()),
                (
                    "hourly",
                    "temperature_2m,relative_humidity_2m,precipitation".to_string(),
                ),
                ("timezone", "Asia/Kolkata".to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        let response = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Weather request failed: {}", e);
                return Signal::Failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!("Weather request returned {}", status);
            return Signal::Failed(format!("status {}", status));
        }

        let body: ForecastResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Weather response parse failed: {}", e);
                return Signal::Failed(e.to_string());
            }
        };

        let current = body.current_weather;
        let hourly = body.hourly;

        Signal::Value(WeatherSnapshot {
            location: location.to_string(),
            temperature_c: current.as_ref().and_then(|c| c.temperature),
            windspeed_kmh: current.as_ref().and_then(|c| c.windspeed),
            weathercode: current.as_ref().and_then(|c| c.weathercode),
            humidity: hourly
                .as_ref()
                .and_then(|h| h.relative_humidity_2m.last().copied().flatten()),
            precipitation_mm: hourly
                .as_ref()
                .and_then(|h| h.precipitation.last().copied().flatten()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_snapshot_has_no_readings() {
        let snapshot = WeatherSnapshot::unknown("Jaipur, Rajasthan");
        assert_eq!(snapshot.location, "Jaipur, Rajasthan");
        assert!(snapshot.temperature_c.is_none());
        assert_eq!(snapshot.context_fields().len(), 1);
    }

    #[test]
    fn test_context_fields_skip_missing() {
        let snapshot = WeatherSnapshot {
            location: "Jaipur".into(),
            temperature_c: Some(31.5),
            windspeed_kmh: None,
            weathercode: Some(2),
            humidity: Some(40.0),
            precipitation_mm: None,
        };
        let fields = snapshot.context_fields();
        assert_eq!(
            fields,
            vec![
                ("location", "Jaipur".to_string()),
                ("temperature_c", "31.5".to_string()),
                ("weathercode", "2".to_string()),
                ("humidity", "40".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_softly() {
        // Port 1 refuses connections immediately
        let service = WeatherService::new("http://127.0.0.1:1");
        let signal = service.fetch("Jaipur").await;
        assert!(matches!(signal, Signal::Failed(_)));
    }

    #[test]
    fn test_parse_forecast_with_missing_fields() {
        let body: ForecastResponse = serde_json::from_str(
            r#"{"current_weather": {"temperature": 29.0},
                "hourly": {"relative_humidity_2m": [55.0, 60.0], "precipitation": []}}"#,
        )
        .unwrap();
        let current = body.current_weather.unwrap();
        assert_eq!(current.temperature, Some(29.0));
        assert!(current.windspeed.is_none());
        let hourly = body.hourly.unwrap();
        assert_eq!(hourly.relative_humidity_2m.last().copied().flatten(), Some(60.0));
        assert!(hourly.precipitation.last().copied().flatten().is_none());
    }
}
