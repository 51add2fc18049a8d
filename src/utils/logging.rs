use chrono;
use std::fmt::{ Debug, Display };

/// Standard format for activity logs: [timestamp] component - message: details
pub fn log_activity(component: &str, message: &str, details: Option<&str>) {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let details_str = details.unwrap_or("");
    println!("[{}] {} - {}: {}", timestamp, component, message, details_str);
}

/// Standard format for error logs: [timestamp] component - ERROR: message
pub fn log_error(component: &str, context: &str, err: &dyn Display) {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    eprintln!("[{}] {} - ERROR - {}: {}", timestamp, component, context, err);
}

/// Retryable conditions go to the warn level only
pub fn log_retry(component: &str, context: &str, attempt: u32, err: &dyn Display) {
    log::warn!("[{}] {} (attempt {}): {}", component, context, attempt, err);
}

/// Log statistics with standard format
pub fn log_stats(component: &str, context: &str, stats: &str) {
    log_activity(component, context, Some(stats));
}

/// Log debug information
pub fn log_debug<T: Debug>(component: &str, context: &str, details: &T) {
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("[{}] {} - Details: {:?}", component, context, details);
    }
}
