use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

/// Weather at one point in the past, real or synthesized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEstimate {
    pub temperature: f64,
    pub humidity: i32,
    pub pressure: i32,
    pub condition: String,
    pub icon: String,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub wind_speed: f64,
    #[serde(skip)]
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSnapshot {
    pub temperature: f64,
    pub humidity: i32,
    pub pressure: i32,
    pub condition: String,
    pub wind_speed: f64,
    pub icon: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalMonth {
    pub label: String,
    #[serde_as(as = "DisplayFromStr")]
    pub months: u32,
    pub temperature: f64,
    pub humidity: i32,
    pub pressure: i32,
    pub condition: String,
    pub wind_speed: f64,
    pub temp_difference: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalComparison {
    pub city: String,
    pub selected_date: String,
    pub current_weather: CurrentSnapshot,
    pub historical_months: Vec<HistoricalMonth>,
    pub trend_description: String,
}
