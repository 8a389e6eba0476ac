use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use crate::manager_owm::errors::OWMError;
use crate::manager_owm::models::{AirQuality, AirQualitySample, AqiMain, Condition, Coord, CurrentWeather, ForecastCity, ForecastEntry, ForecastMain, GeoPlace, Location, Main, OneCall, OneCallCurrent, ShortForecast, Sys, TimeMachine, Wind};
use crate::manager_owm::WeatherProvider;

/// In-memory provider, anything not scripted fails
#[derive(Default)]
pub struct FakeProvider {
    pub current: HashMap<String, CurrentWeather>,
    pub extended: Option<OneCall>,
    pub short: Option<ShortForecast>,
    pub air_quality: Option<AirQuality>,
    pub places: Vec<GeoPlace>,
    pub history: Option<TimeMachine>,
    pub short_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with_city(mut self, name: &str, lat: f64, lon: f64, temp: f64) -> Self {
        self.current.insert(name.to_string(), current_weather(name, lat, lon, temp));
        self
    }
}

fn upstream_down() -> OWMError {
    OWMError::Status(503, "service unavailable".to_string())
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn current_conditions(&self, location: &Location) -> Result<CurrentWeather, OWMError> {
        match location {
            Location::City(city) => self.current.get(city).cloned()
                .ok_or_else(|| OWMError::NotFound(format!("city not found: {}", city))),
            Location::Coordinates(coord) => self.current.values()
                .find(|c| (c.coord.lat - coord.lat).abs() < 1e-6 && (c.coord.lon - coord.lon).abs() < 1e-6)
                .cloned()
                .ok_or_else(|| OWMError::NotFound("no location at coordinates".to_string())),
        }
    }

    async fn extended_forecast(&self, _coord: Coord) -> Result<OneCall, OWMError> {
        self.extended.clone().ok_or_else(upstream_down)
    }

    async fn short_forecast(&self, _coord: Coord) -> Result<ShortForecast, OWMError> {
        self.short_calls.fetch_add(1, Ordering::SeqCst);
        self.short.clone().ok_or_else(upstream_down)
    }

    async fn air_quality(&self, _coord: Coord) -> Result<AirQuality, OWMError> {
        self.air_quality.clone().ok_or_else(upstream_down)
    }

    async fn geocode(&self, _query: &str, limit: u8) -> Result<Vec<GeoPlace>, OWMError> {
        Ok(self.places.iter().take(limit as usize).cloned().collect())
    }

    async fn reverse_geocode(&self, _coord: Coord, limit: u8) -> Result<Vec<GeoPlace>, OWMError> {
        Ok(self.places.iter().take(limit as usize).cloned().collect())
    }

    async fn historical_point(&self, _coord: Coord, _timestamp: i64) -> Result<TimeMachine, OWMError> {
        self.history.clone().ok_or_else(upstream_down)
    }
}

pub fn condition(description: &str) -> Condition {
    Condition {
        id: 800,
        main: String::new(),
        description: description.to_string(),
        icon: "01d".to_string(),
    }
}

pub fn current_weather(name: &str, lat: f64, lon: f64, temp: f64) -> CurrentWeather {
    CurrentWeather {
        name: name.to_string(),
        coord: Coord { lat, lon },
        main: Main { temp, feels_like: temp - 1.0, humidity: 60, pressure: 1012 },
        weather: vec![condition("clear sky")],
        wind: Wind { speed: 4.0, deg: 270.0, gust: 6.5 },
        sys: Sys { sunrise: 1728885000, sunset: 1728924000, country: "FR".to_string() },
        timezone: 7200,
        dt: 1728900000,
        visibility: 10000,
    }
}

/// Eight 3 hour entries per day from `first_day` for `days` days
pub fn short_forecast(first_day: chrono::NaiveDate, days: u64) -> ShortForecast {
    let mut list = Vec::new();
    for d in 0..days {
        let date = first_day + chrono::Days::new(d);
        for h in 0..8 {
            list.push(ForecastEntry {
                dt: 0,
                main: ForecastMain {
                    temp: 15.0,
                    temp_min: 10.0 + h as f64,
                    temp_max: 12.0 + h as f64,
                    humidity: 60,
                    pressure: 1010,
                },
                weather: vec![condition("scattered clouds")],
                dt_txt: format!("{} {:02}:00:00", date.format("%Y-%m-%d"), h * 3),
                pop: 0.1,
                wind: Wind { speed: 3.0, deg: 180.0, gust: 0.0 },
            });
        }
    }

    ShortForecast { list, city: ForecastCity { name: String::new() } }
}

pub fn air_quality(aqi: i32) -> AirQuality {
    AirQuality { list: vec![AirQualitySample { main: AqiMain { aqi }, dt: 0 }] }
}

pub fn one_call_without_days(uvi: f64) -> OneCall {
    OneCall {
        lat: 48.85,
        lon: 2.35,
        timezone_offset: 7200,
        current: OneCallCurrent { dt: 1728900000, temp: 18.0, uvi, weather: Vec::new() },
        hourly: Vec::new(),
        daily: Vec::new(),
        alerts: Vec::new(),
    }
}
