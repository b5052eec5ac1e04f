//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for validating hostnames
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap()
});

/// Validate a hostname
pub fn validate_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.len() <= 255 && HOSTNAME_REGEX.is_match(hostname)
}

/// Validate a folder pool path
pub fn validate_folder_path(path: &str) -> bool {
    if !path.starts_with('/') || path.len() > 512 {
        return false;
    }

    // Pool folders are absolute paths without empty segments
    path[1..].split('/').all(|part| {
        !part.trim().is_empty()
    })
}
