/// Structured logging for the effluent monitoring service
///
/// Provides context-rich logging with component and plant/client
/// identifiers, timestamps, and severity levels. Supports both console
/// output and file-based logging for long-running monitor sessions.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::alert::thresholds::OutOfRangeReading;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Monitor,
    Simulator,
    Api,
    Store,
    Tickets,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Monitor => write!(f, "MON"),
            Component::Simulator => write!(f, "SIM"),
            Component::Api => write!(f, "API"),
            Component::Store => write!(f, "STORE"),
            Component::Tickets => write!(f, "TICKET"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - plant gateway offline or in maintenance
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        // a poisoned lock only means another thread panicked mid-log
        let mut slot = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(logger);
    }

    fn log(&self, level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, subject_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Full log line as written to the log file.
fn format_entry(level: LogLevel, component: Component, subject: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, subject_part, message)
}

fn emit(level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
    let guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, component, subject, message);
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, subject, message);
}

/// Log a warning message
pub fn warn(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, subject, message);
}

/// Log an error message
pub fn error(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, subject, message);
}

/// Log a debug message
pub fn debug(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, subject, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a readings-endpoint failure from its error text
pub fn classify_fetch_failure(error_message: &str) -> FailureType {
    if error_message.contains("HTTP status 503") || error_message.contains("maintenance") {
        // gateway reports it is down for service
        FailureType::Expected
    } else if error_message.contains("HTTP") || error_message.contains("timed out") {
        FailureType::Unexpected
    } else if error_message.contains("unknown parameter") || error_message.contains("non-finite") {
        // sensor package reporting a channel the registry does not know, or garbage values
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a readings-source failure with automatic classification
pub fn log_fetch_failure(source: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_fetch_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Component::Api, Some(source), &message),
        FailureType::Unexpected => error(Component::Api, Some(source), &message),
        FailureType::Unknown => warn(Component::Api, Some(source), &message),
    }
}

/// Log one out-of-range reading. This is the operator notification for a
/// breach.
pub fn log_breach(plant: &str, breach: &OutOfRangeReading) {
    warn(Component::Monitor, Some(plant), &breach.describe());
}

// ---------------------------------------------------------------------------
// Poll Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one polling cycle
pub fn log_poll_summary(plant: &str, total: usize, flagged: usize) {
    let message = format!(
        "Poll complete: {}/{} parameters in range, {} out of range",
        total - flagged.min(total),
        total,
        flagged
    );

    if flagged == 0 {
        info(Component::Monitor, Some(plant), &message);
    } else {
        warn(Component::Monitor, Some(plant), &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let w: Wrapper = toml::from_str("level = \"warn\"").expect("alias should parse");
        assert_eq!(w.level, LogLevel::Warning);
        let w: Wrapper = toml::from_str("level = \"debug\"").expect("should parse");
        assert_eq!(w.level, LogLevel::Debug);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_fetch_failure("HTTP status 503"), FailureType::Expected);
        assert_eq!(classify_fetch_failure("HTTP status 500"), FailureType::Unexpected);
        assert_eq!(
            classify_fetch_failure("invalid reading: unknown parameter: NH3"),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure("invalid reading: non-finite value for pH: NaN"),
            FailureType::Unexpected
        );
        assert_eq!(classify_fetch_failure("connection reset"), FailureType::Unknown);
    }

    #[test]
    fn test_logging_survives_a_poisoned_lock() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("etpmon.log");
        init_logger(LogLevel::Info, path.to_str(), false);

        let poisoner = std::thread::spawn(|| {
            let _guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
            panic!("poison the logger lock");
        });
        assert!(poisoner.join().is_err());
        assert!(LOGGER.is_poisoned());

        info(Component::System, None, "still logging");
        let contents = std::fs::read_to_string(&path).expect("log file written");
        assert!(contents.contains("still logging"), "got {:?}", contents);

        LOGGER.clear_poison();
        *LOGGER.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    #[test]
    fn test_entry_carries_level_component_and_subject() {
        let entry = format_entry(LogLevel::Warning, Component::Monitor, Some("plant-3"), "pH low");
        assert!(entry.ends_with("WARN MON [plant-3]: pH low"), "got {}", entry);
    }
}
