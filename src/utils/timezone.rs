//! Local timezone lookup for message context.

const FALLBACK_TIMEZONE: &str = "UTC";

/// IANA name of the local timezone, or `UTC` when it cannot be determined.
pub fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(name) if !name.is_empty() => name,
        Ok(_) => FALLBACK_TIMEZONE.to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "Could not determine local timezone");
            FALLBACK_TIMEZONE.to_string()
        }
    }
}
