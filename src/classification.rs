use chrono::{NaiveDate, NaiveDateTime};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Mean length of a lunar cycle in days
const SYNODIC_MONTH: f64 = 29.53;

/// Returns the category of an UV index.
///
/// # Arguments
///
/// * 'uv_index' - the UV index
pub fn uv_category(uv_index: f64) -> &'static str {
    if uv_index < 3.0 {
        "Low"
    } else if uv_index < 6.0 {
        "Moderate"
    } else if uv_index < 8.0 {
        "High"
    } else if uv_index < 11.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

/// Returns the display color for an UV index, same bands as `uv_category`.
///
/// # Arguments
///
/// * 'uv_index' - the UV index
pub fn uv_color(uv_index: f64) -> &'static str {
    if uv_index < 3.0 {
        "#4CAF50"
    } else if uv_index < 6.0 {
        "#FFC107"
    } else if uv_index < 8.0 {
        "#FF9800"
    } else if uv_index < 11.0 {
        "#F44336"
    } else {
        "#9C27B0"
    }
}

/// Returns the category of an air quality index on the 1-5 scale.
///
/// # Arguments
///
/// * 'aqi' - the air quality index
pub fn aqi_category(aqi: i32) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

/// Converts wind direction in degrees to one of 16 compass points.
///
/// # Arguments
///
/// * 'degrees' - meteorological wind direction, may be outside 0-360
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = (degrees.round() as i64).rem_euclid(360) as f64;
    let index = (normalized / 22.5).round() as usize % 16;
    COMPASS_POINTS[index]
}

/// Returns the name of a moon phase given as the fraction of the lunar cycle passed.
///
/// # Arguments
///
/// * 'phase' - 0 and 1 are new moon, 0.5 is full moon
pub fn moon_phase_description(phase: f64) -> &'static str {
    if phase < 0.05 || phase > 0.95 {
        "New Moon"
    } else if phase < 0.20 {
        "Waxing Crescent"
    } else if phase < 0.30 {
        "First Quarter"
    } else if phase < 0.45 {
        "Waxing Gibbous"
    } else if phase < 0.55 {
        "Full Moon"
    } else if phase < 0.70 {
        "Waning Gibbous"
    } else if phase < 0.80 {
        "Last Quarter"
    } else {
        "Waning Crescent"
    }
}

/// Approximates the moon phase for a date from the new moon of 2000-01-06.
///
/// # Arguments
///
/// * 'date' - the date to get the moon phase for
pub fn moon_phase_for_date(date: NaiveDate) -> &'static str {
    let reference = NaiveDate::from_ymd_opt(2000, 1, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN);
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN);

    let days = (midnight - reference).num_seconds() as f64 / 86400.0;
    let phase = days.rem_euclid(SYNODIC_MONTH) / SYNODIC_MONTH;

    moon_phase_description(phase)
}

/// Returns a Font Awesome icon class for a weather description.
///
/// # Arguments
///
/// * 'condition' - free text weather description, i.e. "light rain"
pub fn weather_icon_class(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| condition.contains(t));

    if has(&["clear", "sunny"]) {
        "fas fa-sun"
    } else if has(&["partly cloudy", "broken clouds"]) {
        "fas fa-cloud-sun"
    } else if has(&["cloud"]) {
        "fas fa-cloud"
    } else if has(&["rain", "drizzle"]) {
        "fas fa-cloud-rain"
    } else if has(&["thunder", "lightning"]) {
        "fas fa-bolt"
    } else if has(&["snow"]) {
        "fas fa-snowflake"
    } else if has(&["mist", "fog"]) {
        "fas fa-smog"
    } else {
        "fas fa-cloud"
    }
}

/// Returns the OpenWeatherMap icon code for a weather description.
///
/// # Arguments
///
/// * 'condition' - free text weather description
pub fn weather_icon_code(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();

    if condition.contains("clear") || condition.contains("sky") {
        "01d"
    } else if condition.contains("few clouds") {
        "02d"
    } else if condition.contains("scattered clouds") {
        "03d"
    } else if condition.contains("clouds") {
        "04d"
    } else if condition.contains("rain") && condition.contains("light") {
        "10d"
    } else if condition.contains("rain") {
        "09d"
    } else if condition.contains("thunder") {
        "11d"
    } else if condition.contains("snow") {
        "13d"
    } else if condition.contains("mist") || condition.contains("fog") {
        "50d"
    } else {
        "01d"
    }
}

/// Grades a weather alert by keywords in its event name.
///
/// # Arguments
///
/// * 'event' - alert event name, i.e. "Severe Thunderstorm Warning"
pub fn alert_severity(event: &str) -> &'static str {
    let event = event.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| event.contains(t));

    if has(&["tornado", "hurricane", "tsunami", "extreme", "emergency"]) {
        "severe"
    } else if has(&["thunderstorm", "flood", "wind", "heat", "cold", "storm", "warning"]) {
        "moderate"
    } else if has(&["fog", "advisory", "watch"]) {
        "minor"
    } else {
        "info"
    }
}

/// Returns a background image for the current weather description.
///
/// # Arguments
///
/// * 'condition' - free text weather description
pub fn background_image(condition: &str) -> String {
    let condition = condition.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| condition.contains(t));

    let photo = if has(&["clear", "sky"]) {
        "photo-1517758478390-c89333af4642"
    } else if has(&["cloud"]) {
        "photo-1534088568595-a066f410bcda"
    } else if has(&["rain", "drizzle"]) {
        "photo-1534274988757-a28bf1a57c17"
    } else if has(&["thunder", "storm"]) {
        "photo-1605727216801-e27ce1d0cc28"
    } else if has(&["snow", "ice"]) {
        "photo-1483664852095-d6cc6870702d"
    } else if has(&["fog", "mist"]) {
        "photo-1487621167305-5d248087c724"
    } else {
        "photo-1504608524841-42fe6f032b4b"
    };

    format!("https://images.unsplash.com/{}?auto=format&fit=crop&w=1200&q=80", photo)
}

/// Great circle distance in kilometers, rounded to one decimal.
///
/// # Arguments
///
/// * 'lat1', 'lon1' - first point in degrees
/// * 'lat2', 'lon2' - second point in degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}
