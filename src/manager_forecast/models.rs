use chrono::NaiveDate;
use serde::Serialize;
use crate::classification::{aqi_category, moon_phase_for_date, uv_category, uv_color};

/// UV index used whenever no UV source covers a day
pub const DEFAULT_UV_INDEX: f64 = 5.0;

/// AQI used whenever no air quality source is available ("Good")
pub const DEFAULT_AQI: i32 = 1;

/// One calendar day of forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub index: usize,
    pub date: String,
    #[serde(skip)]
    pub full_date: NaiveDate,
    pub day: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub humidity: i32,
    pub pressure: i32,
    pub uv_index: f64,
    pub uv_category: String,
    pub uv_color: String,
    pub description: String,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub precip_prob: f64,
    pub sunrise: String,
    pub sunset: String,
    pub moon_phase: String,
    pub air_quality_index: i32,
    pub aqi_category: String,
}

impl DailyForecast {
    /// Returns an empty forecast for the given date with display fields, moon phase
    /// and the default UV and AQI filled in
    ///
    /// # Arguments
    ///
    /// * 'full_date' - the calendar day
    pub fn new(full_date: NaiveDate) -> Self {
        Self {
            index: 0,
            date: full_date.format("%b %-d").to_string(),
            full_date,
            day: full_date.format("%a").to_string(),
            max_temp: 0.0,
            min_temp: 0.0,
            humidity: 0,
            pressure: 0,
            uv_index: DEFAULT_UV_INDEX,
            uv_category: uv_category(DEFAULT_UV_INDEX).to_string(),
            uv_color: uv_color(DEFAULT_UV_INDEX).to_string(),
            description: String::new(),
            wind_speed: 0.0,
            wind_direction: String::new(),
            precip_prob: 0.0,
            sunrise: String::new(),
            sunset: String::new(),
            moon_phase: moon_phase_for_date(full_date).to_string(),
            air_quality_index: DEFAULT_AQI,
            aqi_category: aqi_category(DEFAULT_AQI).to_string(),
        }
    }

    /// Moves the forecast to another day, display fields and moon phase follow the date
    pub fn set_date(&mut self, full_date: NaiveDate) {
        self.full_date = full_date;
        self.date = full_date.format("%b %-d").to_string();
        self.day = full_date.format("%a").to_string();
        self.moon_phase = moon_phase_for_date(full_date).to_string();
    }

    /// Sets the UV index and recomputes its category and color
    pub fn set_uv_index(&mut self, uv_index: f64) {
        self.uv_index = uv_index;
        self.uv_category = uv_category(uv_index).to_string();
        self.uv_color = uv_color(uv_index).to_string();
    }

    /// Sets the air quality index and recomputes its category
    pub fn set_air_quality(&mut self, aqi: i32) {
        self.air_quality_index = aqi;
        self.aqi_category = aqi_category(aqi).to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecastItem {
    pub time: String,
    pub temp: f64,
    pub icon: String,
    pub precip_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertItem {
    pub title: String,
    pub description: String,
    pub time: String,
    pub severity: String,
}
