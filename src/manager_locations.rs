use serde::Serialize;
use crate::classification::haversine_km;
use crate::manager_owm::errors::OWMError;
use crate::manager_owm::models::{Coord, GeoPlace};
use crate::manager_owm::WeatherProvider;

/// Max number of places returned by the location lookups
pub const MAX_PLACES: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyLocation {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub distance: f64,
}

/// Places around a point, closest first
///
/// # Arguments
///
/// * 'provider' - upstream weather provider
/// * 'coord' - the point to search around
pub async fn nearby_locations(provider: &dyn WeatherProvider, coord: Coord) -> Result<Vec<NearbyLocation>, OWMError> {
    let places = provider.reverse_geocode(coord, MAX_PLACES).await?;

    let mut locations: Vec<NearbyLocation> = places.into_iter()
        .map(|p| NearbyLocation {
            distance: haversine_km(coord.lat, coord.lon, p.lat, p.lon),
            name: p.name,
            state: p.state.unwrap_or_default(),
            country: p.country,
            lat: p.lat,
            lon: p.lon,
        })
        .collect();
    locations.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    Ok(locations)
}

/// The place at a point, or a placeholder when nothing is known there
///
/// # Arguments
///
/// * 'provider' - upstream weather provider
/// * 'coord' - the point to look up
pub async fn place_at(provider: &dyn WeatherProvider, coord: Coord) -> Result<GeoPlace, OWMError> {
    let places = provider.reverse_geocode(coord, 1).await?;

    Ok(places.into_iter().next().unwrap_or_else(|| GeoPlace {
        name: "Unknown Location".to_string(),
        lat: coord.lat,
        lon: coord.lon,
        country: String::new(),
        state: None,
    }))
}
