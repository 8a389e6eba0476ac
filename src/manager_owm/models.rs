use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// What to look current conditions up by
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates(Coord),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Main {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    pub humidity: i32,
    pub pressure: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
    #[serde(default)]
    pub gust: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    #[serde(default)]
    pub country: String,
}

/// Current conditions document (`/data/2.5/weather`)
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub coord: Coord,
    pub main: Main,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub visibility: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallCurrent {
    #[serde(default)]
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallHourly {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallDaily {
    pub dt: i64,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    #[serde(default)]
    pub moon_phase: f64,
    pub temp: DailyTemp,
    pub pressure: i32,
    pub humidity: i32,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub uvi: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallAlert {
    #[serde(default)]
    pub sender_name: String,
    pub event: String,
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub description: String,
}

/// Combined forecast document (`/data/3.0/onecall`)
#[derive(Debug, Clone, Deserialize)]
pub struct OneCall {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone_offset: i32,
    pub current: OneCallCurrent,
    #[serde(default)]
    pub hourly: Vec<OneCallHourly>,
    #[serde(default)]
    pub daily: Vec<OneCallDaily>,
    #[serde(default)]
    pub alerts: Vec<OneCallAlert>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i32,
    pub pressure: i32,
}

/// One 3-hour sample of the 5 day forecast
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub dt_txt: String,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub wind: Wind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
}

/// 5 day / 3 hour forecast document (`/data/2.5/forecast`)
#[derive(Debug, Clone, Deserialize)]
pub struct ShortForecast {
    pub list: Vec<ForecastEntry>,
    #[serde(default)]
    pub city: ForecastCity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AqiMain {
    pub aqi: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualitySample {
    pub main: AqiMain,
    #[serde(default)]
    pub dt: i64,
}

/// Air pollution document (`/data/2.5/air_pollution`)
#[derive(Debug, Clone, Deserialize)]
pub struct AirQuality {
    pub list: Vec<AirQualitySample>,
}

impl AirQuality {
    /// The single AQI value (1-5) the free tier reports
    pub fn aqi(&self) -> Option<i32> {
        self.list.first().map(|s| s.main.aqi)
    }
}

/// One match from the geocoding endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl GeoPlace {
    /// Display name as "City, State, CC" where the state is only included for US places
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) if self.country == "US" && !state.is_empty() =>
                format!("{}, {}, {}", self.name, state, self.country),
            _ => format!("{}, {}", self.name, self.country),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeMachineSample {
    pub dt: i64,
    pub temp: f64,
    pub pressure: i32,
    pub humidity: i32,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

/// Point in time document (`/data/3.0/onecall/timemachine`)
#[derive(Debug, Clone, Deserialize)]
pub struct TimeMachine {
    #[serde(default)]
    pub data: Vec<TimeMachineSample>,
}
