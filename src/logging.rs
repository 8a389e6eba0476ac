use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::errors::ConfigError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

/// Sets up log4rs with a file appender and, optionally, a console appender
///
/// # Arguments
///
/// * 'log_path' - path to the log file
/// * 'log_level' - root log level (error, warn, info, debug, trace)
/// * 'log_to_stdout' - whether to also log to stdout
pub fn setup_logger(log_path: &str, log_level: &str, log_to_stdout: bool) -> Result<(), ConfigError> {
    let level = log_level.parse::<LevelFilter>()
        .map_err(|e| ConfigError(format!("invalid log level '{}': {}", log_level, e)))?;

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_path)?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder.build(root.build(level))?;
    log4rs::init_config(config)?;

    Ok(())
}
