use std::collections::HashMap;
use chrono::{DateTime, NaiveDate};
use log::debug;
use crate::manager_forecast::models::{DailyForecast, DEFAULT_AQI, DEFAULT_UV_INDEX};
use crate::manager_forecast::utc_offset;
use crate::manager_owm::models::{AirQuality, OneCall};

/// UV index for a calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct UvDay {
    pub date: NaiveDate,
    pub uvi: f64,
}

/// UV readings as delivered by the combined forecast
#[derive(Debug, Clone, PartialEq)]
pub struct UvData {
    pub current: f64,
    pub daily: Vec<UvDay>,
}

impl UvData {
    /// Picks the current and daily UV index from a combined forecast, days are in the local
    /// date of the location
    ///
    /// # Arguments
    ///
    /// * 'one_call' - the combined forecast
    pub fn from_extended(one_call: &OneCall) -> Self {
        let offset = utc_offset(one_call.timezone_offset);

        let daily = one_call.daily.iter()
            .filter_map(|d| {
                DateTime::from_timestamp(d.dt, 0)
                    .map(|dt| UvDay { date: dt.with_timezone(&offset).date_naive(), uvi: d.uvi })
            })
            .collect();

        Self { current: one_call.current.uvi, daily }
    }
}

/// Sets the UV index of each day from the UV source, matched on date. Days the source does not
/// cover, or all days when there is no source, get the default UV index. Category and color are
/// always recomputed from the final value.
///
/// # Arguments
///
/// * 'forecasts' - the days to enrich
/// * 'uv_data' - UV source if available
pub fn add_uv_data(forecasts: &mut [DailyForecast], uv_data: Option<&UvData>) {
    let lookup: HashMap<NaiveDate, f64> = uv_data
        .map(|uv| uv.daily.iter().map(|d| (d.date, d.uvi)).collect())
        .unwrap_or_default();

    if lookup.is_empty() {
        debug!("no daily uv data, using default uv index {}", DEFAULT_UV_INDEX);
    }

    for forecast in forecasts.iter_mut() {
        let uvi = lookup.get(&forecast.full_date).copied().unwrap_or(DEFAULT_UV_INDEX);
        forecast.set_uv_index(uvi);
    }
}

/// Applies the single AQI reading of the air quality source to every day, or the default
/// ("Good") when there is no source.
///
/// # Arguments
///
/// * 'forecasts' - the days to enrich
/// * 'air_quality' - air quality source if available
pub fn add_air_quality(forecasts: &mut [DailyForecast], air_quality: Option<&AirQuality>) {
    let aqi = air_quality.and_then(|aq| aq.aqi()).unwrap_or(DEFAULT_AQI);

    for forecast in forecasts.iter_mut() {
        forecast.set_air_quality(aqi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager_owm::models::{AirQualitySample, AqiMain};

    fn days() -> Vec<DailyForecast> {
        (14..17)
            .map(|d| DailyForecast::new(NaiveDate::from_ymd_opt(2024, 10, d).unwrap()))
            .collect()
    }

    #[test]
    fn test_uv_defaults_without_source() {
        let mut forecasts = days();
        for forecast in forecasts.iter_mut() {
            forecast.set_uv_index(9.5);
        }

        add_uv_data(&mut forecasts, None);

        assert_eq!(forecasts.len(), 3);
        for forecast in &forecasts {
            assert_eq!(forecast.uv_index, 5.0);
            assert_eq!(forecast.uv_category, "Moderate");
            assert_eq!(forecast.uv_color, "#FFC107");
        }
    }

    #[test]
    fn test_uv_matched_on_date_missing_dates_default() {
        let mut forecasts = days();
        let uv = UvData {
            current: 2.0,
            daily: vec![
                UvDay { date: NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(), uvi: 1.2 },
                UvDay { date: NaiveDate::from_ymd_opt(2024, 10, 16).unwrap(), uvi: 11.4 },
            ],
        };

        add_uv_data(&mut forecasts, Some(&uv));

        assert_eq!(forecasts[0].uv_index, 1.2);
        assert_eq!(forecasts[0].uv_category, "Low");
        assert_eq!(forecasts[1].uv_index, 5.0);
        assert_eq!(forecasts[2].uv_category, "Extreme");
        assert_eq!(forecasts[2].uv_color, "#9C27B0");
    }

    #[test]
    fn test_air_quality_applied_to_every_day() {
        let mut forecasts = days();
        let aq = AirQuality {
            list: vec![AirQualitySample { main: AqiMain { aqi: 4 }, dt: 0 }],
        };

        add_air_quality(&mut forecasts, Some(&aq));
        assert!(forecasts.iter().all(|f| f.air_quality_index == 4 && f.aqi_category == "Poor"));

        add_air_quality(&mut forecasts, None);
        assert!(forecasts.iter().all(|f| f.air_quality_index == 1 && f.aqi_category == "Good"));
    }

    #[test]
    fn test_air_quality_out_of_range_is_unknown() {
        let mut forecasts = days();
        let aq = AirQuality {
            list: vec![AirQualitySample { main: AqiMain { aqi: 7 }, dt: 0 }],
        };

        add_air_quality(&mut forecasts, Some(&aq));

        assert_eq!(forecasts[0].aqi_category, "Unknown");
    }
}
