mod errors;
mod logging;
mod initialization;
mod handlers;
mod classification;
mod manager_owm;
mod manager_forecast;
mod manager_aggregation;
mod manager_historical;
mod manager_locations;
mod manager_reports;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use actix_web::{web, App, HttpServer};
use log::info;
use crate::errors::UnrecoverableError;
use crate::initialization::config;
use crate::manager_aggregation::Aggregator;
use crate::manager_historical::HistoricalEstimator;
use crate::manager_owm::{WeatherProvider, OWM};
use crate::manager_reports::{run_reports, LogReportSender};

struct AppState {
    aggregator: Aggregator,
    historical: HistoricalEstimator,
    provider: Arc<dyn WeatherProvider>,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;

    let provider: Arc<dyn WeatherProvider> = Arc::new(
        OWM::new(&config.owm.api_key, &config.owm.base_url, config.owm.timeout_secs)?
    );
    let aggregator = Aggregator::new(provider.clone());

    if config.reports.enabled {
        info!("daily reports enabled for {} recipients at {:02}:{:02}",
            config.reports.recipients.len(), config.reports.hour, config.reports.minute);
        tokio::spawn(run_reports(aggregator.clone(), Arc::new(LogReportSender), config.reports.clone()));
    }

    let state = web::Data::new(AppState {
        aggregator,
        historical: HistoricalEstimator::new(provider.clone()),
        provider,
    });

    info!("starting web server on {}:{}", config.web_server.bind_address, config.web_server.bind_port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::routes)
    })
        .bind((config.web_server.bind_address, config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
