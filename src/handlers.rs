use actix_web::{get, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use crate::manager_locations::{nearby_locations, place_at, MAX_PLACES};
use crate::manager_owm::models::{Coord, Location};
use crate::AppState;

#[derive(Deserialize, Debug)]
struct WeatherParams {
    city: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CoordParams {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeocodeParams {
    location: Option<String>,
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message }))
}

fn internal_error(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": message }))
}

/// Parses a lat/lon pair, the error is the message to return to the caller
fn parse_coord(lat: &str, lon: &str) -> Result<Coord, &'static str> {
    let lat: f64 = lat.trim().parse().map_err(|_| "Invalid latitude value")?;
    let lon: f64 = lon.trim().parse().map_err(|_| "Invalid longitude value")?;

    Ok(Coord { lat, lon })
}

/// Non empty values of a query parameter that may repeat
fn query_values(params: &[(String, String)], name: &str) -> Vec<String> {
    params.iter()
        .filter(|(k, v)| k == name && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string())
        .collect()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// city=Paris or lat=48.85&lon=2.35
#[get("/api/weather")]
async fn weather(params: web::Query<WeatherParams>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", params);

    let location = match (present(&params.lat), present(&params.lon), present(&params.city)) {
        (Some(lat), Some(lon), _) => match parse_coord(lat, lon) {
            Ok(coord) => Location::Coordinates(coord),
            Err(message) => return bad_request(message),
        },
        (_, _, Some(city)) => Location::City(city.trim().to_string()),
        _ => return bad_request("Either city or coordinates required"),
    };

    match data.aggregator.aggregate(&location).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            error!("failed to aggregate weather for {:?}: {}", location, e);
            internal_error(e.to_string())
        }
    }
}

// cities=Paris&cities=Berlin
#[get("/api/compare")]
async fn compare(params: web::Query<Vec<(String, String)>>, data: web::Data<AppState>) -> impl Responder {
    let cities = query_values(&params, "cities");
    info!("comparing {:?}", cities);

    if cities.is_empty() {
        return bad_request("At least one city is required");
    }

    HttpResponse::Ok().json(data.aggregator.compare(cities).await)
}

// city=Paris&date=2024-10-14&months=1&months=12
#[get("/api/historical-comparison")]
async fn historical_comparison(params: web::Query<Vec<(String, String)>>, data: web::Data<AppState>) -> impl Responder {
    let Some(city) = query_values(&params, "city").into_iter().next() else {
        return bad_request("City name is required");
    };

    let selected_date = query_values(&params, "date").first()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive());
    let months = query_values(&params, "months");
    info!("historical comparison for {} on {} months {:?}", city, selected_date, months);

    match data.historical.compare(&city, selected_date, &months).await {
        Ok(comparison) => HttpResponse::Ok().json(comparison),
        Err(e) => {
            error!("failed historical comparison for {}: {}", city, e);
            internal_error(e.to_string())
        }
    }
}

#[get("/api/geocode")]
async fn geocode(params: web::Query<GeocodeParams>, data: web::Data<AppState>) -> impl Responder {
    let Some(location) = present(&params.location) else {
        return bad_request("Location parameter is required");
    };

    match data.provider.geocode(location.trim(), MAX_PLACES).await {
        Ok(places) => HttpResponse::Ok().json(places),
        Err(e) => {
            error!("geocoding failed for {}: {}", location, e);
            internal_error("Geocoding service returned an error".to_string())
        }
    }
}

#[get("/api/reverse-geocode")]
async fn reverse_geocode(params: web::Query<CoordParams>, data: web::Data<AppState>) -> impl Responder {
    let (Some(lat), Some(lon)) = (present(&params.lat), present(&params.lon)) else {
        return bad_request("Both lat and lon parameters are required");
    };
    let coord = match parse_coord(lat, lon) {
        Ok(coord) => coord,
        Err(message) => return bad_request(message),
    };

    match place_at(data.provider.as_ref(), coord).await {
        Ok(place) => {
            info!("{:?} is {}", coord, place.display_name());
            HttpResponse::Ok().json(place)
        },
        Err(e) => {
            error!("reverse geocoding failed for {:?}: {}", coord, e);
            internal_error("Reverse geocoding service returned an error".to_string())
        }
    }
}

#[get("/api/nearby-locations")]
async fn nearby(params: web::Query<CoordParams>, data: web::Data<AppState>) -> impl Responder {
    let (Some(lat), Some(lon)) = (present(&params.lat), present(&params.lon)) else {
        return bad_request("Missing lat or lon parameters");
    };
    let coord = match parse_coord(lat, lon) {
        Ok(coord) => coord,
        Err(message) => return bad_request(message),
    };

    match nearby_locations(data.provider.as_ref(), coord).await {
        Ok(locations) => HttpResponse::Ok().json(json!({ "locations": locations })),
        Err(e) => {
            error!("nearby lookup failed for {:?}: {}", coord, e);
            internal_error(e.to_string())
        }
    }
}

/// Registers all endpoints
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(weather)
        .service(compare)
        .service(historical_comparison)
        .service(geocode)
        .service(reverse_geocode)
        .service(nearby);
}
