use std::collections::BTreeMap;
use chrono::FixedOffset;
use serde::Serialize;
use serde_with::skip_serializing_none;
use crate::classification::{aqi_category, uv_category, uv_color, wind_direction};
use crate::manager_forecast::format_clock;
use crate::manager_forecast::models::{AlertItem, DailyForecast, HourlyForecastItem};
use crate::manager_owm::models::CurrentWeather;

/// Snapshot of the weather right now
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub pressure: String,
    pub uv_index: f64,
    pub uv_category: String,
    pub uv_color: String,
    pub condition: String,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub wind_gust: f64,
    pub visibility: i32,
    pub sunrise: String,
    pub sunset: String,
    pub air_quality_index: i32,
    pub aqi_category: String,
}

impl CurrentConditions {
    /// Builds the snapshot from the current conditions document and the enrichment values
    ///
    /// # Arguments
    ///
    /// * 'current' - current conditions document
    /// * 'uv_index' - current UV index
    /// * 'aqi' - current air quality index
    /// * 'offset' - local offset of the location
    pub fn new(current: &CurrentWeather, uv_index: f64, aqi: i32, offset: FixedOffset) -> Self {
        let (sunrise, sunset) = if current.sys.sunrise > 0 && current.sys.sunset > 0 {
            (format_clock(current.sys.sunrise, offset), format_clock(current.sys.sunset, offset))
        } else {
            (String::new(), String::new())
        };

        Self {
            temperature: format!("{:.2}°C", current.main.temp),
            feels_like: format!("{:.2}°C", current.main.feels_like),
            humidity: format!("{}%", current.main.humidity),
            pressure: format!("{} hPa", current.main.pressure),
            uv_index,
            uv_category: uv_category(uv_index).to_string(),
            uv_color: uv_color(uv_index).to_string(),
            condition: current.weather.first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            wind_speed: current.wind.speed,
            wind_direction: wind_direction(current.wind.deg).to_string(),
            wind_gust: current.wind.gust,
            visibility: current.visibility,
            sunrise,
            sunset,
            air_quality_index: aqi,
            aqi_category: aqi_category(aqi).to_string(),
        }
    }
}

/// Everything known about one location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedWeatherResult {
    pub city: String,
    #[serde(skip)]
    pub current_temp: f64,
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
    pub hourly_forecast: Vec<HourlyForecastItem>,
    pub alerts: Vec<AlertItem>,
    #[serde(rename = "backgroundURL")]
    pub background_url: String,
}

/// One city of a comparison
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWeather {
    pub name: String,
    pub current: CurrentConditions,
    pub forecast: Option<Vec<DailyForecast>>,
    #[serde(rename = "backgroundURL")]
    pub background_url: String,
}

impl From<AggregatedWeatherResult> for CityWeather {
    fn from(result: AggregatedWeatherResult) -> Self {
        Self {
            name: result.city,
            current: result.current,
            forecast: Some(result.forecast),
            background_url: result.background_url,
        }
    }
}

/// Result of a multi city comparison, failed cities end up in `errors` keyed by the requested name
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompareResult {
    pub cities: Vec<CityWeather>,
    pub errors: BTreeMap<String, String>,
    pub error: Option<String>,
}
