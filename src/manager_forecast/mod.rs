pub mod enrichment;
pub mod models;

use std::collections::HashMap;
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc, Weekday};
use log::warn;
use crate::classification::{alert_severity, moon_phase_description, weather_icon_class, wind_direction};
use crate::manager_forecast::models::{AlertItem, DailyForecast, HourlyForecastItem};
use crate::manager_owm::models::{ForecastEntry, OneCall};

/// The weekday a 5 day forecast is completed up to
pub const ANCHOR_WEEKDAY: Weekday = Weekday::Fri;

/// Max number of days taken from the combined forecast
pub const MAX_EXTENDED_DAYS: usize = 16;

const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Folds 3 hour forecast entries into one forecast per calendar day.
///
/// Max and min temperature are the extremes over the day and the precipitation probability is
/// the highest seen for the day, while humidity, pressure, wind and description are taken from
/// the latest entry of the day. Entries with an unparsable timestamp are skipped.
///
/// # Arguments
///
/// * 'entries' - 3 hour entries in time order
pub fn normalize_forecasts(entries: &[ForecastEntry]) -> HashMap<NaiveDate, DailyForecast> {
    let mut days: HashMap<NaiveDate, DailyForecast> = HashMap::new();

    for entry in entries {
        let date_time = match NaiveDateTime::parse_from_str(&entry.dt_txt, FORECAST_TIME_FORMAT) {
            Ok(dt) => dt,
            Err(e) => {
                warn!("skipping forecast entry with timestamp '{}': {}", entry.dt_txt, e);
                continue;
            }
        };

        let description = entry.weather.first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let precip_prob = entry.pop * 100.0;

        let day = days.entry(date_time.date()).or_insert_with(|| {
            let mut day = DailyForecast::new(date_time.date());
            day.max_temp = entry.main.temp_max;
            day.min_temp = entry.main.temp_min;
            day.precip_prob = precip_prob;
            day
        });

        day.max_temp = day.max_temp.max(entry.main.temp_max);
        day.min_temp = day.min_temp.min(entry.main.temp_min);
        day.precip_prob = day.precip_prob.max(precip_prob);

        day.humidity = entry.main.humidity;
        day.pressure = entry.main.pressure;
        day.wind_speed = entry.wind.speed;
        day.wind_direction = wind_direction(entry.wind.deg).to_string();
        day.description = description;
    }

    days
}

/// Appends a synthesized day at the next occurrence of the anchor weekday unless the latest
/// day already falls on it.
///
/// Numeric fields of the new day are the mean over all given days, description and wind
/// direction are the most frequent values (ties go to the value seen first in date order),
/// sunrise and sunset are estimated from the season.
///
/// # Arguments
///
/// * 'forecasts' - normalized days in any order
/// * 'anchor' - the weekday the forecast should end on
pub fn add_anchor_day(mut forecasts: Vec<DailyForecast>, anchor: Weekday) -> Vec<DailyForecast> {
    let mut by_date: Vec<&DailyForecast> = forecasts.iter().collect();
    by_date.sort_by_key(|f| f.full_date);

    let last_date = match by_date.last() {
        Some(last) => last.full_date,
        None => return forecasts,
    };

    let days_until = (anchor.num_days_from_monday() + 7 - last_date.weekday().num_days_from_monday()) % 7;
    if days_until == 0 {
        return forecasts;
    }
    let Some(anchor_date) = last_date.checked_add_days(Days::new(days_until as u64)) else {
        return forecasts;
    };

    let count = by_date.len() as f64;
    let mean = |f: fn(&DailyForecast) -> f64| by_date.iter().map(|d| f(d)).sum::<f64>() / count;

    let mut day = DailyForecast::new(anchor_date);
    day.max_temp = mean(|d| d.max_temp);
    day.min_temp = mean(|d| d.min_temp);
    day.humidity = mean(|d| d.humidity as f64).round() as i32;
    day.pressure = mean(|d| d.pressure as f64).round() as i32;
    day.wind_speed = mean(|d| d.wind_speed);
    day.precip_prob = mean(|d| d.precip_prob);
    day.set_uv_index(mean(|d| d.uv_index));
    day.set_air_quality(mean(|d| d.air_quality_index as f64).round() as i32);
    day.description = most_common(by_date.iter().map(|d| d.description.as_str()));
    day.wind_direction = most_common(by_date.iter().map(|d| d.wind_direction.as_str()));

    let (sunrise, sunset) = seasonal_sun_times(anchor_date);
    day.sunrise = sunrise;
    day.sunset = sunset;

    forecasts.push(day);
    forecasts
}

/// Returns the most frequent value, the first seen wins on ties
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, c)) => *c += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }

    best.map(|(v, _)| v.to_string()).unwrap_or_default()
}

/// Rough sunrise and sunset for a date, shifted one hour per quarter of the year
/// (06:00/18:00 in January to March, 09:00/15:00 in October to December)
fn seasonal_sun_times(date: NaiveDate) -> (String, String) {
    let shift = date.month0() / 3;
    (format!("{:02}:00", 6 + shift), format!("{:02}:00", 18 - shift))
}

/// Sorts days ascending by date, drops duplicate dates (the first one after sorting is kept)
/// and numbers the days from 1.
///
/// # Arguments
///
/// * 'forecasts' - days in any order
pub fn sort_and_index(forecasts: &mut Vec<DailyForecast>) {
    forecasts.sort_by_key(|f| f.full_date);
    forecasts.dedup_by_key(|f| f.full_date);

    for (i, forecast) in forecasts.iter_mut().enumerate() {
        forecast.index = i + 1;
    }
}

/// Converts the daily part of a combined forecast, at most `MAX_EXTENDED_DAYS` days.
/// Shorter sequences are filled up by `extend_to_horizon` once they are enriched.
///
/// # Arguments
///
/// * 'one_call' - the combined forecast
pub fn daily_from_extended(one_call: &OneCall) -> Vec<DailyForecast> {
    let offset = utc_offset(one_call.timezone_offset);

    one_call.daily.iter()
        .take(MAX_EXTENDED_DAYS)
        .filter_map(|daily| {
            let date = local_datetime(daily.dt, offset)?.date_naive();

            let mut day = DailyForecast::new(date);
            day.max_temp = daily.temp.max;
            day.min_temp = daily.temp.min;
            day.humidity = daily.humidity;
            day.pressure = daily.pressure;
            day.set_uv_index(daily.uvi);
            day.description = daily.weather.first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            day.wind_speed = daily.wind_speed;
            day.wind_direction = wind_direction(daily.wind_deg).to_string();
            day.precip_prob = daily.pop * 100.0;
            day.sunrise = format_clock(daily.sunrise, offset);
            day.sunset = format_clock(daily.sunset, offset);
            day.moon_phase = moon_phase_description(daily.moon_phase).to_string();

            Some(day)
        })
        .collect()
}

/// Extends a day sequence up to `horizon` days by trending on from its latest day.
///
/// Every added day follows the previous one, its max temperature rises by 0.2 and its min by
/// 0.1 per added day, moon phase is computed for the new date and everything else is copied
/// from the latest day. Sequences that already reach the horizon are returned as is.
///
/// # Arguments
///
/// * 'forecasts' - days in any order
/// * 'horizon' - the number of days to reach
pub fn extend_to_horizon(mut forecasts: Vec<DailyForecast>, horizon: usize) -> Vec<DailyForecast> {
    let Some(last) = forecasts.iter().max_by_key(|f| f.full_date).cloned() else {
        return forecasts;
    };

    let missing = horizon.saturating_sub(forecasts.len());
    for n in 1..=missing {
        let Some(date) = last.full_date.checked_add_days(Days::new(n as u64)) else {
            break;
        };

        let mut day = last.clone();
        day.set_date(date);
        day.max_temp = last.max_temp + n as f64 * 0.2;
        day.min_temp = last.min_temp + n as f64 * 0.1;
        forecasts.push(day);
    }

    forecasts
}

/// Every third hour of the first 24 hours of a combined forecast
///
/// # Arguments
///
/// * 'one_call' - the combined forecast
pub fn hourly_from_extended(one_call: &OneCall) -> Vec<HourlyForecastItem> {
    let offset = utc_offset(one_call.timezone_offset);

    one_call.hourly.iter()
        .take(24)
        .step_by(3)
        .map(|hour| HourlyForecastItem {
            time: format_clock(hour.dt, offset),
            temp: hour.temp,
            icon: weather_icon_class(hour.weather.first().map_or("", |w| w.description.as_str())).to_string(),
            precip_prob: hour.pop * 100.0,
        })
        .collect()
}

/// The first six 3 hour entries of the 5 day forecast
///
/// # Arguments
///
/// * 'entries' - 3 hour entries in time order
pub fn hourly_from_short(entries: &[ForecastEntry]) -> Vec<HourlyForecastItem> {
    entries.iter()
        .take(6)
        .map(|entry| HourlyForecastItem {
            time: NaiveDateTime::parse_from_str(&entry.dt_txt, FORECAST_TIME_FORMAT)
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_default(),
            temp: entry.main.temp,
            icon: weather_icon_class(entry.weather.first().map_or("clear", |w| w.description.as_str())).to_string(),
            precip_prob: entry.pop * 100.0,
        })
        .collect()
}

/// Alerts of a combined forecast with a severity derived from the event name
///
/// # Arguments
///
/// * 'one_call' - the combined forecast
pub fn alerts_from_extended(one_call: &OneCall) -> Vec<AlertItem> {
    let offset = utc_offset(one_call.timezone_offset);

    one_call.alerts.iter()
        .map(|alert| AlertItem {
            title: alert.event.clone(),
            description: alert.description.clone(),
            time: format_clock(alert.start, offset),
            severity: alert_severity(&alert.event).to_string(),
        })
        .collect()
}

/// Fixed offset from seconds east of UTC, UTC if out of range
pub fn utc_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn local_datetime(timestamp: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.with_timezone(&offset))
}

/// Formats a unix timestamp as HH:MM in the given offset, empty for missing timestamps
///
/// # Arguments
///
/// * 'timestamp' - unix timestamp in seconds, zero or negative means missing
/// * 'offset' - the local offset of the location
pub fn format_clock(timestamp: i64, offset: FixedOffset) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    local_datetime(timestamp, offset)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}
