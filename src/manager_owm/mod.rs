pub mod errors;
pub mod models;

use std::time::Duration;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use crate::manager_owm::errors::OWMError;
use crate::manager_owm::models::{AirQuality, Coord, CurrentWeather, GeoPlace, Location, OneCall, ShortForecast, TimeMachine};

/// Upstream weather operations the rest of the service depends on
///
/// Every operation is a single request with no retries, returning an error on transport
/// failure, non-success status or an undecodable document.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions by city name or by coordinates
    async fn current_conditions(&self, location: &Location) -> Result<CurrentWeather, OWMError>;

    /// Combined current/hourly/daily/alerts forecast
    async fn extended_forecast(&self, coord: Coord) -> Result<OneCall, OWMError>;

    /// 5 day forecast in 3 hour steps
    async fn short_forecast(&self, coord: Coord) -> Result<ShortForecast, OWMError>;

    async fn air_quality(&self, coord: Coord) -> Result<AirQuality, OWMError>;

    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeoPlace>, OWMError>;

    async fn reverse_geocode(&self, coord: Coord, limit: u8) -> Result<Vec<GeoPlace>, OWMError>;

    /// Conditions at a unix timestamp in the past
    async fn historical_point(&self, coord: Coord, timestamp: i64) -> Result<TimeMachine, OWMError>;
}

/// Client for the OpenWeatherMap APIs
pub struct OWM {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OWM {
    /// Returns an OWM client ready for making requests
    ///
    /// # Arguments
    ///
    /// * 'api_key' - OpenWeatherMap api key
    /// * 'base_url' - scheme and host of the api, i.e. https://api.openweathermap.org
    /// * 'timeout_secs' - request timeout
    pub fn new(api_key: &str, base_url: &str, timeout_secs: u64) -> Result<OWM, OWMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes a GET request and decodes the json body
    ///
    /// # Arguments
    ///
    /// * 'path' - api path, i.e. /data/2.5/weather
    /// * 'query' - query parameters, the api key is added here
    async fn get_document<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, OWMError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("requesting {} {:?}", url, query);

        let req = self.client
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send().await?;

        let status = req.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OWMError::NotFound(format!("{} returned {}", path, status)));
        }
        if !status.is_success() {
            return Err(OWMError::Status(status.as_u16(), format!("error while fetching {}", path)));
        }

        let json = req.text().await?;
        if json.trim().is_empty() {
            return Err(OWMError::Document(format!("empty body from {}", path)));
        }

        Ok(serde_json::from_str(&json)?)
    }
}

fn coord_query(coord: Coord) -> Vec<(&'static str, String)> {
    vec![("lat", format!("{:0.4}", coord.lat)), ("lon", format!("{:0.4}", coord.lon))]
}

fn metric(mut query: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
    query.push(("units", "metric".to_string()));
    query
}

#[async_trait]
impl WeatherProvider for OWM {
    async fn current_conditions(&self, location: &Location) -> Result<CurrentWeather, OWMError> {
        let query = match location {
            Location::City(city) => vec![("q", city.clone())],
            Location::Coordinates(coord) => coord_query(*coord),
        };
        self.get_document("/data/2.5/weather", &metric(query)).await
    }

    async fn extended_forecast(&self, coord: Coord) -> Result<OneCall, OWMError> {
        let mut query = metric(coord_query(coord));
        query.push(("exclude", "minutely".to_string()));
        self.get_document("/data/3.0/onecall", &query).await
    }

    async fn short_forecast(&self, coord: Coord) -> Result<ShortForecast, OWMError> {
        self.get_document("/data/2.5/forecast", &metric(coord_query(coord))).await
    }

    async fn air_quality(&self, coord: Coord) -> Result<AirQuality, OWMError> {
        self.get_document("/data/2.5/air_pollution", &coord_query(coord)).await
    }

    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeoPlace>, OWMError> {
        let query = vec![("q", query.to_string()), ("limit", limit.to_string())];
        self.get_document("/geo/1.0/direct", &query).await
    }

    async fn reverse_geocode(&self, coord: Coord, limit: u8) -> Result<Vec<GeoPlace>, OWMError> {
        let mut query = coord_query(coord);
        query.push(("limit", limit.to_string()));
        self.get_document("/geo/1.0/reverse", &query).await
    }

    async fn historical_point(&self, coord: Coord, timestamp: i64) -> Result<TimeMachine, OWMError> {
        let mut query = metric(coord_query(coord));
        query.push(("dt", timestamp.to_string()));
        self.get_document("/data/3.0/onecall/timemachine", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "coord": {"lon": 2.35, "lat": 48.85},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 18.4, "feels_like": 17.9, "temp_min": 16.0, "temp_max": 19.8, "pressure": 1016, "humidity": 63},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 250},
        "dt": 1728900000,
        "sys": {"country": "FR", "sunrise": 1728885000, "sunset": 1728924000},
        "timezone": 7200,
        "name": "Paris"
    }"#;

    const SHORT_FORECAST: &str = r#"{
        "list": [
            {
                "dt": 1728907200,
                "main": {"temp": 17.2, "temp_min": 16.1, "temp_max": 17.9, "humidity": 70, "pressure": 1015},
                "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                "wind": {"speed": 4.1, "deg": 230, "gust": 7.2},
                "pop": 0.35,
                "dt_txt": "2024-10-14 12:00:00"
            }
        ],
        "city": {"name": "Paris"}
    }"#;

    #[test]
    fn test_parse_current_weather() {
        let current: CurrentWeather = serde_json::from_str(CURRENT).unwrap();

        assert_eq!(current.name, "Paris");
        assert!((current.coord.lat - 48.85).abs() < 1e-9);
        assert_eq!(current.main.humidity, 63);
        assert_eq!(current.weather[0].description, "clear sky");
        assert!((current.wind.deg - 250.0).abs() < 1e-9);
        assert_eq!(current.wind.gust, 0.0);
        assert_eq!(current.timezone, 7200);
    }

    #[test]
    fn test_parse_short_forecast() {
        let forecast: ShortForecast = serde_json::from_str(SHORT_FORECAST).unwrap();

        assert_eq!(forecast.list.len(), 1);
        assert_eq!(forecast.list[0].dt_txt, "2024-10-14 12:00:00");
        assert!((forecast.list[0].pop - 0.35).abs() < 1e-9);
        assert_eq!(forecast.city.name, "Paris");
    }

    #[test]
    fn test_parse_one_call_without_alerts() {
        let json = r#"{
            "lat": 48.85, "lon": 2.35, "timezone": "Europe/Paris", "timezone_offset": 7200,
            "current": {"dt": 1728900000, "temp": 18.0, "uvi": 3.2, "weather": []},
            "daily": [{
                "dt": 1728900000, "sunrise": 1728885000, "sunset": 1728924000, "moon_phase": 0.5,
                "temp": {"day": 18.0, "min": 11.0, "max": 19.0, "night": 12.0, "eve": 15.0, "morn": 11.5},
                "pressure": 1016, "humidity": 60, "wind_speed": 4.0, "wind_deg": 240,
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                "pop": 0.1, "uvi": 3.2
            }]
        }"#;

        let one_call: OneCall = serde_json::from_str(json).unwrap();
        assert!(one_call.alerts.is_empty());
        assert!(one_call.hourly.is_empty());
        assert_eq!(one_call.daily.len(), 1);
        assert!((one_call.current.uvi - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_air_quality_first_sample() {
        let json = r#"{"list": [{"main": {"aqi": 3}, "components": {"co": 201.9}, "dt": 1728900000}]}"#;
        let aq: AirQuality = serde_json::from_str(json).unwrap();
        assert_eq!(aq.aqi(), Some(3));

        let empty: AirQuality = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert_eq!(empty.aqi(), None);
    }

    #[test]
    fn test_geo_place_display_name() {
        let austin = GeoPlace {
            name: "Austin".to_string(),
            lat: 30.27,
            lon: -97.74,
            country: "US".to_string(),
            state: Some("Texas".to_string()),
        };
        assert_eq!(austin.display_name(), "Austin, Texas, US");

        let lyon = GeoPlace {
            name: "Lyon".to_string(),
            lat: 45.76,
            lon: 4.84,
            country: "FR".to_string(),
            state: Some("Auvergne-Rhône-Alpes".to_string()),
        };
        assert_eq!(lyon.display_name(), "Lyon, FR");
    }

    #[test]
    fn test_new_client_trims_base_url() {
        let owm = OWM::new("key", "http://localhost:8080/", 5).unwrap();
        assert_eq!(owm.base_url, "http://localhost:8080");
    }
}
