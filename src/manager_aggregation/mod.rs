pub mod errors;
pub mod models;

use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use crate::classification::background_image;
use crate::manager_aggregation::errors::AggregationError;
use crate::manager_aggregation::models::{AggregatedWeatherResult, CityWeather, CompareResult, CurrentConditions};
use crate::manager_forecast::enrichment::{add_air_quality, add_uv_data, UvData};
use crate::manager_forecast::models::{AlertItem, DailyForecast, HourlyForecastItem, DEFAULT_AQI, DEFAULT_UV_INDEX};
use crate::manager_forecast::{add_anchor_day, alerts_from_extended, daily_from_extended, extend_to_horizon, hourly_from_extended, hourly_from_short, normalize_forecasts, sort_and_index, utc_offset, ANCHOR_WEEKDAY, MAX_EXTENDED_DAYS};
use crate::manager_owm::models::{Coord, Location, OneCall};
use crate::manager_owm::WeatherProvider;

/// Combines the upstream sources into one result per location
#[derive(Clone)]
pub struct Aggregator {
    provider: Arc<dyn WeatherProvider>,
}

impl Aggregator {
    /// Returns an aggregator using the given weather provider
    ///
    /// # Arguments
    ///
    /// * 'provider' - upstream weather provider
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Aggregates current conditions, forecasts, UV and air quality for one location.
    ///
    /// Only a failing current conditions lookup fails the aggregation, every other source
    /// degrades to its fallback.
    ///
    /// # Arguments
    ///
    /// * 'location' - city name or coordinates
    pub async fn aggregate(&self, location: &Location) -> Result<AggregatedWeatherResult, AggregationError> {
        let current = self.provider.current_conditions(location).await
            .map_err(|e| {
                error!("failed to get current conditions for {:?}: {}", location, e);
                AggregationError::from(e)
            })?;
        let coord = current.coord;

        let (extended, air_quality) = tokio::join!(
            self.provider.extended_forecast(coord),
            self.provider.air_quality(coord),
        );

        let extended = extended
            .map_err(|e| warn!("extended forecast unavailable for {}, falling back: {}", current.name, e))
            .ok();
        let air_quality = air_quality
            .map_err(|e| warn!("air quality unavailable for {}, using default: {}", current.name, e))
            .ok();

        let uv_data = extended.as_ref().map(UvData::from_extended);
        let offset = utc_offset(extended.as_ref().map_or(current.timezone, |e| e.timezone_offset));

        let (mut forecast, hourly_forecast, alerts, from_extended) = self.forecasts(coord, extended.as_ref()).await;

        add_uv_data(&mut forecast, uv_data.as_ref());
        add_air_quality(&mut forecast, air_quality.as_ref());
        sort_and_index(&mut forecast);

        if from_extended && forecast.len() < MAX_EXTENDED_DAYS {
            debug!("extending {} days of forecast for {} to {}", forecast.len(), current.name, MAX_EXTENDED_DAYS);
            forecast = extend_to_horizon(forecast, MAX_EXTENDED_DAYS);
            sort_and_index(&mut forecast);
        }

        let uv_index = uv_data.as_ref().map_or(DEFAULT_UV_INDEX, |uv| uv.current);
        let aqi = air_quality.as_ref().and_then(|aq| aq.aqi()).unwrap_or(DEFAULT_AQI);
        let conditions = CurrentConditions::new(&current, uv_index, aqi, offset);
        let background_url = background_image(&conditions.condition);

        info!("aggregated {} days of forecast for {}", forecast.len(), current.name);

        Ok(AggregatedWeatherResult {
            city: current.name,
            current_temp: current.main.temp,
            current: conditions,
            forecast,
            hourly_forecast,
            alerts,
            background_url,
        })
    }

    /// Daily forecast, hourly forecast and alerts, from the combined forecast when it carries
    /// daily data, otherwise from the 5 day forecast completed up to the anchor weekday.
    /// The flag tells whether the combined forecast's days were used.
    ///
    /// # Arguments
    ///
    /// * 'coord' - location of the forecast
    /// * 'extended' - the combined forecast if it could be fetched
    async fn forecasts(&self, coord: Coord, extended: Option<&OneCall>)
        -> (Vec<DailyForecast>, Vec<HourlyForecastItem>, Vec<AlertItem>, bool) {

        if let Some(one_call) = extended.filter(|e| !e.daily.is_empty()) {
            return (daily_from_extended(one_call), hourly_from_extended(one_call), alerts_from_extended(one_call), true);
        }

        let alerts = extended.map(alerts_from_extended).unwrap_or_default();
        let extended_hourly = extended.map(hourly_from_extended).unwrap_or_default();

        match self.provider.short_forecast(coord).await {
            Ok(short) => {
                let days: Vec<DailyForecast> = normalize_forecasts(&short.list).into_values().collect();
                let days = add_anchor_day(days, ANCHOR_WEEKDAY);
                let hourly = if extended_hourly.is_empty() { hourly_from_short(&short.list) } else { extended_hourly };

                (days, hourly, alerts, false)
            },
            Err(e) => {
                warn!("5 day forecast unavailable for {:.4},{:.4}, no daily forecast: {}", coord.lat, coord.lon, e);
                (Vec::new(), extended_hourly, alerts, false)
            }
        }
    }

    /// Aggregates all given cities concurrently, one task per city. Successful cities are
    /// returned in request order and failing ones are reported in the error map by the
    /// requested name.
    ///
    /// # Arguments
    ///
    /// * 'cities' - city names to compare
    pub async fn compare(&self, cities: Vec<String>) -> CompareResult {
        let shared: Arc<Mutex<(Vec<(usize, CityWeather)>, BTreeMap<String, String>)>> =
            Arc::new(Mutex::new((Vec::new(), BTreeMap::new())));

        let mut set: JoinSet<()> = JoinSet::new();
        for (i, city) in cities.into_iter().enumerate() {
            let aggregator = self.clone();
            let shared = shared.clone();

            set.spawn(async move {
                let result = aggregator.aggregate(&Location::City(city.clone())).await;

                let mut guard = shared.lock().await;
                match result {
                    Ok(r) => guard.0.push((i, CityWeather::from(r))),
                    Err(e) => { guard.1.insert(city, e.to_string()); },
                }
            });
        }

        set.join_all().await;

        let mut guard = shared.lock().await;
        let (mut cities, errors) = (std::mem::take(&mut guard.0), std::mem::take(&mut guard.1));
        cities.sort_by_key(|(i, _)| *i);

        let error = if cities.is_empty() && !errors.is_empty() {
            warn!("failed to fetch weather data for all {} cities", errors.len());
            Some("Failed to fetch weather data for all cities".to_string())
        } else {
            None
        };

        CompareResult {
            cities: cities.into_iter().map(|(_, c)| c).collect(),
            errors,
            error,
        }
    }
}
