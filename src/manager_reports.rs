use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use log::{error, info};
use tokio::task::JoinSet;
use crate::errors::ReportError;
use crate::initialization::{Recipient, Reports};
use crate::manager_aggregation::Aggregator;
use crate::manager_aggregation::models::CurrentConditions;
use crate::manager_forecast::models::DailyForecast;
use crate::manager_owm::models::Location;

/// Number of forecast days included in a report
pub const REPORT_DAYS: usize = 7;

/// A daily weather report for one recipient
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub email: String,
    pub city: String,
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
}

impl DailyReport {
    pub fn subject(&self) -> String {
        format!("Daily weather report for {}", self.city)
    }

    /// Plain text body, one line for now and one per forecast day
    pub fn body(&self) -> String {
        let mut lines = vec![format!(
            "Now: {}, {} (feels like {}), wind {} m/s {}, UV {} ({}), air quality {}",
            self.current.condition, self.current.temperature, self.current.feels_like,
            self.current.wind_speed, self.current.wind_direction,
            self.current.uv_index, self.current.uv_category, self.current.aqi_category,
        )];

        for day in &self.forecast {
            lines.push(format!(
                "{} {}: {}, {:.1}/{:.1}°C, {:.0}% rain, wind {:.1} m/s, UV {:.1}",
                day.day, day.date, day.description, day.max_temp, day.min_temp,
                day.precip_prob, day.wind_speed, day.uv_index,
            ));
        }

        lines.join("\n")
    }
}

/// Delivers reports to their recipients
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send(&self, report: &DailyReport) -> Result<(), ReportError>;
}

/// Sender that writes the report to the log instead of mailing it
pub struct LogReportSender;

#[async_trait]
impl ReportSender for LogReportSender {
    async fn send(&self, report: &DailyReport) -> Result<(), ReportError> {
        info!("report to {}: {}\n{}", report.email, report.subject(), report.body());
        Ok(())
    }
}

/// Time left until the next occurrence of the given wall clock time, a time equal to now
/// counts as tomorrow
///
/// # Arguments
///
/// * 'now' - current local time
/// * 'hour' - hour of the day to send reports
/// * 'minute' - minute of the hour to send reports
pub fn next_report_delay(now: NaiveDateTime, hour: u32, minute: u32) -> Duration {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let mut next = now.date().and_time(time);
    if next <= now {
        next = next.checked_add_days(Days::new(1)).unwrap_or(next);
    }

    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Report scheduling loop, sends reports to all recipients once a day
///
/// # Arguments
///
/// * 'aggregator' - aggregator used to produce the reports
/// * 'sender' - where reports are delivered
/// * 'reports' - schedule and recipients
pub async fn run_reports(aggregator: Aggregator, sender: Arc<dyn ReportSender>, reports: Reports) {
    loop {
        let delay = next_report_delay(Local::now().naive_local(), reports.hour, reports.minute);
        info!("next daily reports in {} minutes", delay.as_secs() / 60);
        tokio::time::sleep(delay).await;

        let sent = send_reports(&aggregator, sender.clone(), &reports.recipients).await;
        info!("sent {} of {} daily reports", sent, reports.recipients.len());
    }
}

/// Sends one report per recipient concurrently and returns the number delivered
///
/// # Arguments
///
/// * 'aggregator' - aggregator used to produce the reports
/// * 'sender' - where reports are delivered
/// * 'recipients' - who gets a report for which city
pub async fn send_reports(aggregator: &Aggregator, sender: Arc<dyn ReportSender>, recipients: &[Recipient]) -> usize {
    let mut set: JoinSet<Result<(), ReportError>> = JoinSet::new();

    for recipient in recipients.iter().filter(|r| !r.city.is_empty()) {
        let aggregator = aggregator.clone();
        let sender = sender.clone();
        let recipient = recipient.clone();
        set.spawn(async move { send_report(aggregator, sender, recipient).await });
    }

    let result = set.join_all().await;
    let mut sent: usize = 0;
    for r in result.into_iter() {
        match r {
            Ok(_) => sent += 1,
            Err(e) => error!("failed to send daily report: {}", e),
        }
    }

    sent
}

/// Builds and sends the report for one recipient
async fn send_report(aggregator: Aggregator, sender: Arc<dyn ReportSender>, recipient: Recipient) -> Result<(), ReportError> {
    let result = aggregator.aggregate(&Location::City(recipient.city.clone())).await?;

    let report = DailyReport {
        email: recipient.email,
        city: result.city,
        current: result.current,
        forecast: result.forecast.into_iter().take(REPORT_DAYS).collect(),
    };

    sender.send(&report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::sync::Mutex;
    use crate::test_support::{short_forecast, FakeProvider};

    #[derive(Default)]
    struct CollectingSender {
        reports: Mutex<Vec<DailyReport>>,
    }

    #[async_trait]
    impl ReportSender for CollectingSender {
        async fn send(&self, report: &DailyReport) -> Result<(), ReportError> {
            self.reports.lock().await.push(report.clone());
            Ok(())
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 14).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn recipient(email: &str, city: &str) -> Recipient {
        Recipient { email: email.to_string(), city: city.to_string() }
    }

    #[test]
    fn test_next_report_delay() {
        assert_eq!(next_report_delay(at(9, 30), 16, 0), Duration::from_secs(6 * 3600 + 30 * 60));
        assert_eq!(next_report_delay(at(16, 0), 16, 0), Duration::from_secs(24 * 3600));
        assert_eq!(next_report_delay(at(17, 0), 16, 0), Duration::from_secs(23 * 3600));
    }

    #[tokio::test]
    async fn test_send_reports_skips_failures() {
        let mut provider = FakeProvider::default()
            .with_city("Paris", 48.85, 2.35, 18.4)
            .with_city("Oslo", 59.91, 10.75, 6.0);
        provider.short = Some(short_forecast(NaiveDate::from_ymd_opt(2024, 10, 11).unwrap(), 6));
        let aggregator = Aggregator::new(Arc::new(provider));
        let sender = Arc::new(CollectingSender::default());

        let recipients = vec![
            recipient("a@example.com", "Paris"),
            recipient("b@example.com", "Atlantis"),
            recipient("c@example.com", ""),
            recipient("d@example.com", "Oslo"),
        ];

        let sent = send_reports(&aggregator, sender.clone(), &recipients).await;

        assert_eq!(sent, 2);
        let reports = sender.reports.lock().await;
        assert_eq!(reports.len(), 2);
        for report in reports.iter() {
            assert_eq!(report.forecast.len(), REPORT_DAYS);
            assert!(report.body().lines().count() == REPORT_DAYS + 1);
        }
    }

    #[tokio::test]
    async fn test_log_sender_accepts_report() {
        let provider = FakeProvider::default().with_city("Paris", 48.85, 2.35, 18.4);
        let aggregator = Aggregator::new(Arc::new(provider));

        let sent = send_reports(&aggregator, Arc::new(LogReportSender), &[recipient("a@example.com", "Paris")]).await;

        assert_eq!(sent, 1);
    }
}
