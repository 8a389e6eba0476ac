pub mod models;

use std::sync::Arc;
use chrono::{Datelike, Months, NaiveDate};
use log::{debug, info, warn};
use crate::classification::weather_icon_code;
use crate::manager_aggregation::errors::AggregationError;
use crate::manager_historical::models::{CurrentSnapshot, HistoricalComparison, HistoricalEstimate, HistoricalMonth};
use crate::manager_owm::errors::OWMError;
use crate::manager_owm::models::{Coord, Location};
use crate::manager_owm::WeatherProvider;

/// Months compared against when none are asked for
pub const DEFAULT_MONTHS: [u32; 2] = [1, 12];

const HUMIDITY_RANGE: (i32, i32) = (0, 100);
const PRESSURE_RANGE: (i32, i32) = (970, 1040);

/// Estimates past weather from the provider, synthesizing it when the provider can't deliver
pub struct HistoricalEstimator {
    provider: Arc<dyn WeatherProvider>,
}

impl HistoricalEstimator {
    /// Returns a new estimator
    ///
    /// # Arguments
    ///
    /// * 'provider' - upstream weather provider
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Weather for a city a number of calendar months before the given date. Never fails,
    /// any upstream problem falls back to a synthetic estimate.
    ///
    /// # Arguments
    ///
    /// * 'city' - city name
    /// * 'coord' - coordinates of the city if already known
    /// * 'date' - the date to count back from
    /// * 'months_ago' - number of calendar months back
    pub async fn estimate(&self, city: &str, coord: Option<Coord>, date: NaiveDate, months_ago: u32) -> HistoricalEstimate {
        let historical_date = historical_date(date, months_ago);
        info!("estimating weather for {} on {} ({} months ago)", city, historical_date, months_ago);

        match self.from_provider(city, coord, historical_date).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!("historical data unavailable for {} on {}, synthesizing: {}", city, historical_date, e);
                synthetic_estimate(city, historical_date, months_ago)
            }
        }
    }

    /// Looks up the first sample of the point in time endpoint at noon UTC of the date
    ///
    /// # Arguments
    ///
    /// * 'city' - city name, resolved to coordinates unless 'coord' is given
    /// * 'coord' - coordinates of the city if already known
    /// * 'historical_date' - the date to look up
    async fn from_provider(&self, city: &str, coord: Option<Coord>, historical_date: NaiveDate) -> Result<HistoricalEstimate, OWMError> {
        let coord = match coord {
            Some(c) => c,
            None => self.provider.current_conditions(&Location::City(city.to_string())).await?.coord,
        };

        let timestamp = historical_date.and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| OWMError::Document(format!("no timestamp for {}", historical_date)))?;

        let time_machine = self.provider.historical_point(coord, timestamp).await?;
        let sample = time_machine.data.first()
            .ok_or_else(|| OWMError::Document("no historical data points returned".to_string()))?;

        let (condition, icon) = sample.weather.first()
            .map(|w| {
                let icon = if w.icon.is_empty() { weather_icon_code(&w.description) } else { w.icon.as_str() };
                (w.description.clone(), icon.to_string())
            })
            .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string()));

        Ok(HistoricalEstimate {
            temperature: sample.temp,
            humidity: sample.humidity,
            pressure: sample.pressure,
            condition,
            icon_url: icon_url(&icon),
            icon,
            wind_speed: sample.wind_speed,
            synthetic: false,
        })
    }

    /// Compares current weather in a city with the weather a number of months back.
    ///
    /// Month values that aren't non negative integers are skipped, no values at all means
    /// one month and one year back. Fails only if the current conditions can't be found.
    ///
    /// # Arguments
    ///
    /// * 'city' - city name
    /// * 'selected_date' - the date to count back from
    /// * 'months' - months back as given by the caller
    pub async fn compare(&self, city: &str, selected_date: NaiveDate, months: &[String]) -> Result<HistoricalComparison, AggregationError> {
        let current = self.provider.current_conditions(&Location::City(city.to_string())).await?;

        let mut months_ago: Vec<u32> = if months.is_empty() {
            DEFAULT_MONTHS.to_vec()
        } else {
            months.iter()
                .filter_map(|m| m.trim().parse::<u32>()
                    .map_err(|e| warn!("skipping months value '{}': {}", m, e))
                    .ok())
                .collect()
        };
        months_ago.sort_unstable();
        months_ago.dedup();

        let mut historical_months: Vec<HistoricalMonth> = Vec::new();
        for m in months_ago {
            let estimate = self.estimate(city, Some(current.coord), selected_date, m).await;
            if estimate.synthetic {
                debug!("{} months ago for {} is a synthetic estimate", m, city);
            }
            historical_months.push(HistoricalMonth {
                label: month_label(m),
                months: m,
                temperature: estimate.temperature,
                humidity: estimate.humidity,
                pressure: estimate.pressure,
                condition: estimate.condition,
                wind_speed: estimate.wind_speed,
                temp_difference: current.main.temp - estimate.temperature,
                icon: estimate.icon,
            });
        }

        let last_month_temp = historical_months.iter()
            .find(|h| h.months == 1)
            .map_or(current.main.temp - 1.0, |h| h.temperature);
        let trend = trend_description(current.main.temp - last_month_temp, selected_date);

        let (condition, icon) = current.weather.first()
            .map(|w| (w.description.clone(), w.icon.clone()))
            .unwrap_or_default();

        Ok(HistoricalComparison {
            city: current.name,
            selected_date: selected_date.format("%B %-d, %Y").to_string(),
            current_weather: CurrentSnapshot {
                temperature: current.main.temp,
                humidity: current.main.humidity,
                pressure: current.main.pressure,
                condition,
                wind_speed: current.wind.speed,
                icon,
            },
            historical_months,
            trend_description: trend,
        })
    }
}

/// The date a number of calendar months before, clamped to the end of shorter months
pub fn historical_date(date: NaiveDate, months_ago: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months_ago)).unwrap_or(date)
}

/// Deterministic stand-in for past weather, a function of the city name, the day of year,
/// the season and how far back the date is.
///
/// # Arguments
///
/// * 'city' - city name
/// * 'historical_date' - the date in the past
/// * 'months_ago' - number of calendar months back
pub fn synthetic_estimate(city: &str, historical_date: NaiveDate, months_ago: u32) -> HistoricalEstimate {
    let city_hash: i64 = city.chars().map(|c| c as i64).sum();
    let date_hash = (historical_date.ordinal() as i64 * 10) % 100;
    let seasonal = seasonal_adjustment(historical_date.month());

    let city_variation = (city_hash % 100) as f64 / 10.0 - 5.0;
    let date_variation = date_hash as f64 / 10.0 - 5.0;
    let month_variation = months_ago as f64 * 0.5;

    let temperature = 23.0 + city_variation + date_variation + seasonal - month_variation;
    let temperature = (temperature * 10.0).round() / 10.0;

    let humidity = 50 + city_hash % 30 - (seasonal * 2.0) as i64 + months_ago as i64;
    let pressure = 1000 + city_hash % 30 + months_ago as i64 / 2;

    let (condition, icon) = synthetic_condition(temperature);

    HistoricalEstimate {
        temperature,
        humidity: clamp_humidity(humidity),
        pressure: clamp_pressure(pressure),
        condition: condition.to_string(),
        icon: icon.to_string(),
        icon_url: icon_url(icon),
        wind_speed: 5.0 + (city_hash % 10) as f64,
        synthetic: true,
    }
}

/// Northern hemisphere: warm May to August, mild in spring and autumn, cold otherwise
fn seasonal_adjustment(month: u32) -> f64 {
    match month {
        5..=8 => 5.0,
        3 | 4 | 9 | 10 => 2.0,
        _ => -3.0,
    }
}

fn synthetic_condition(temperature: f64) -> (&'static str, &'static str) {
    if temperature > 25.0 {
        ("Clear sky", "01d")
    } else if temperature > 20.0 {
        ("Few clouds", "02d")
    } else if temperature > 15.0 {
        ("Scattered clouds", "03d")
    } else if temperature > 10.0 {
        ("Overcast clouds", "04d")
    } else {
        ("Light rain", "10d")
    }
}

pub fn clamp_humidity(humidity: i64) -> i32 {
    humidity.clamp(HUMIDITY_RANGE.0 as i64, HUMIDITY_RANGE.1 as i64) as i32
}

pub fn clamp_pressure(pressure: i64) -> i32 {
    pressure.clamp(PRESSURE_RANGE.0 as i64, PRESSURE_RANGE.1 as i64) as i32
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{}@2x.png", icon)
}

/// Display label for a number of months back
pub fn month_label(months: u32) -> String {
    match months {
        1 => "1 month ago".to_string(),
        12 => "1 year ago".to_string(),
        24 => "2 years ago".to_string(),
        36 => "3 years ago".to_string(),
        60 => "5 years ago".to_string(),
        m => format!("{} months ago", m),
    }
}

fn season(month: u32) -> &'static str {
    match month {
        3..=5 => "spring",
        6..=8 => "summer",
        9..=11 => "autumn",
        _ => "winter",
    }
}

/// One sentence on how this month compares with the previous one
///
/// # Arguments
///
/// * 'temp_diff' - current temperature minus last month's
/// * 'date' - the date the season is taken from
pub fn trend_description(temp_diff: f64, date: NaiveDate) -> String {
    let season = season(date.month());
    let rounded = (temp_diff * 10.0).round() / 10.0;

    if temp_diff.abs() < 0.5 {
        format!("This {} is about the same temperature as last month.", season)
    } else if temp_diff > 0.0 {
        format!("This {} is {:.1}°C warmer than last month.", season, rounded)
    } else {
        format!("This {} is {:.1}°C colder than last month.", season, rounded.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager_owm::models::{TimeMachine, TimeMachineSample};
    use crate::test_support::{condition, FakeProvider};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_synthetic_estimate_known_values() {
        // "Paris" hashes to 511, 2024-09-14 is day 258
        let estimate = synthetic_estimate("Paris", date(2024, 9, 14), 1);

        assert!((estimate.temperature - 23.6).abs() < 1e-9);
        assert_eq!(estimate.humidity, 48);
        assert_eq!(estimate.pressure, 1001);
        assert_eq!(estimate.wind_speed, 6.0);
        assert_eq!(estimate.condition, "Few clouds");
        assert_eq!(estimate.icon, "02d");
        assert!(estimate.synthetic);
    }

    #[test]
    fn test_synthetic_estimate_is_deterministic() {
        let a = synthetic_estimate("Reykjavík", date(2023, 1, 31), 12);
        let b = synthetic_estimate("Reykjavík", date(2023, 1, 31), 12);
        assert_eq!(a, b);

        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| synthetic_estimate("Reykjavík", date(2023, 1, 31), 12)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), a);
        }
    }

    #[test]
    fn test_synthetic_estimate_clamps() {
        let estimate = synthetic_estimate("Paris", date(2000, 7, 1), 300);
        assert_eq!(estimate.humidity, 100);
        assert_eq!(estimate.pressure, 1040);

        assert_eq!(clamp_humidity(-12), 0);
        assert_eq!(clamp_humidity(140), 100);
        assert_eq!(clamp_humidity(55), 55);
        assert_eq!(clamp_pressure(900), 970);
        assert_eq!(clamp_pressure(1100), 1040);
        assert_eq!(clamp_pressure(1013), 1013);
    }

    #[test]
    fn test_historical_date_counts_calendar_months() {
        assert_eq!(historical_date(date(2024, 3, 31), 1), date(2024, 2, 29));
        assert_eq!(historical_date(date(2024, 10, 14), 12), date(2023, 10, 14));
        assert_eq!(historical_date(date(2024, 10, 14), 0), date(2024, 10, 14));
    }

    #[test]
    fn test_month_labels_and_trend() {
        assert_eq!(month_label(1), "1 month ago");
        assert_eq!(month_label(6), "6 months ago");
        assert_eq!(month_label(12), "1 year ago");
        assert_eq!(month_label(60), "5 years ago");

        assert_eq!(trend_description(0.3, date(2024, 7, 1)), "This summer is about the same temperature as last month.");
        assert_eq!(trend_description(2.26, date(2024, 10, 1)), "This autumn is 2.3°C warmer than last month.");
        assert_eq!(trend_description(-1.0, date(2024, 1, 1)), "This winter is 1.0°C colder than last month.");
    }

    #[tokio::test]
    async fn test_estimate_falls_back_when_provider_fails() {
        let estimator = HistoricalEstimator::new(Arc::new(FakeProvider::default()));

        let estimate = estimator.estimate("Paris", None, date(2024, 10, 14), 1).await;

        assert_eq!(estimate, synthetic_estimate("Paris", date(2024, 9, 14), 1));
    }

    #[tokio::test]
    async fn test_estimate_uses_provider_sample() {
        let mut provider = FakeProvider::default().with_city("Paris", 48.85, 2.35, 18.4);
        provider.history = Some(TimeMachine {
            data: vec![TimeMachineSample {
                dt: 1726315200,
                temp: 21.3,
                pressure: 1018,
                humidity: 52,
                wind_speed: 2.4,
                weather: vec![condition("few clouds")],
            }],
        });
        let estimator = HistoricalEstimator::new(Arc::new(provider));

        let estimate = estimator.estimate("Paris", None, date(2024, 10, 14), 1).await;

        assert!(!estimate.synthetic);
        assert_eq!(estimate.temperature, 21.3);
        assert_eq!(estimate.condition, "few clouds");
        assert_eq!(estimate.icon_url, "https://openweathermap.org/img/wn/01d@2x.png");
    }

    #[tokio::test]
    async fn test_estimate_empty_sample_list_falls_back() {
        let mut provider = FakeProvider::default().with_city("Paris", 48.85, 2.35, 18.4);
        provider.history = Some(TimeMachine { data: Vec::new() });
        let estimator = HistoricalEstimator::new(Arc::new(provider));

        let estimate = estimator.estimate("Paris", None, date(2024, 10, 14), 12).await;

        assert!(estimate.synthetic);
    }

    #[tokio::test]
    async fn test_compare_defaults_and_ordering() {
        let provider = FakeProvider::default().with_city("Paris", 48.85, 2.35, 18.4);
        let estimator = HistoricalEstimator::new(Arc::new(provider));

        let comparison = estimator.compare("Paris", date(2024, 10, 14), &[]).await.unwrap();
        assert_eq!(comparison.selected_date, "October 14, 2024");
        assert_eq!(comparison.historical_months.len(), 2);
        assert_eq!(comparison.historical_months[0].label, "1 month ago");
        assert_eq!(comparison.historical_months[1].label, "1 year ago");

        let last_month = &comparison.historical_months[0];
        assert!((last_month.temp_difference - (18.4 - last_month.temperature)).abs() < 1e-9);
        assert!(comparison.trend_description.starts_with("This autumn is"));

        let months = vec!["24".to_string(), "abc".to_string(), "3".to_string()];
        let comparison = estimator.compare("Paris", date(2024, 10, 14), &months).await.unwrap();
        let ordered: Vec<u32> = comparison.historical_months.iter().map(|h| h.months).collect();
        assert_eq!(ordered, vec![3, 24]);

        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["historicalMonths"][0]["months"], "3");
        assert_eq!(json["historicalMonths"][1]["label"], "2 years ago");
    }

    #[tokio::test]
    async fn test_compare_unknown_city_fails() {
        let estimator = HistoricalEstimator::new(Arc::new(FakeProvider::default()));

        assert!(estimator.compare("Atlantis", date(2024, 10, 14), &[]).await.is_err());
    }
}
