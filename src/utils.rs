//! General utilities, not particular to any conversion step.
//!
//! Group addresses in an ODIM file are slash separated paths such as
//! `/dataset1/data2/what`. The helpers here keep them in one canonical
//! form (leading slash, no trailing or doubled slashes) so that stores
//! and the attribute resolver can compare them as plain strings.
use chrono::NaiveDateTime;

/// Errors converting the ODIM `date`/`time` attribute pair into a timestamp
#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("Date '{date}' and time '{time}' are too short to form a YYYYMMDDHHmm timestamp")]
    TooShort { date: String, time: String },
    #[error("Could not parse '{stamp}' as a YYYYMMDDHHmm timestamp: {reason}")]
    Unparseable { stamp: String, reason: String },
}

/// Return `path` in canonical form: a leading `/`, no trailing `/`
/// and no empty components. The root is `/`.
pub fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Join a child name (or relative path) onto a parent group path.
pub fn join_path(parent: &str, child: &str) -> String {
    normalize_path(&format!("{parent}/{child}"))
}

/// The parent of a group path, or `None` for the root.
///
/// ```
/// # use odim_grid::utils::parent_path;
/// assert_eq!(parent_path("/dataset1/data1").as_deref(), Some("/dataset1"));
/// assert_eq!(parent_path("/dataset1").as_deref(), Some("/"));
/// assert_eq!(parent_path("/"), None);
/// ```
pub fn parent_path(path: &str) -> Option<String> {
    let path = normalize_path(path);
    if path == "/" {
        return None;
    }

    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => Some("/".to_string()),
    }
}

/// The last component of a group path (empty for the root).
pub fn leaf_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
}

/// Combine an ODIM `date` (YYYYMMDD) and `time` (HHmmss) into a timestamp.
///
/// Only the first twelve characters of the concatenation are used, so the
/// seconds are always truncated.
pub fn parse_odim_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, TimestampError> {
    let stamp: String = format!("{}{}", date.trim(), time.trim());
    if stamp.len() < 12 || !stamp.is_char_boundary(12) {
        return Err(TimestampError::TooShort { date: date.to_string(), time: time.to_string() });
    }

    let stamp = &stamp[..12];
    NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M")
        .map_err(|e| TimestampError::Unparseable { stamp: stamp.to_string(), reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("dataset1"), "/dataset1");
        assert_eq!(normalize_path("/dataset1//data1/"), "/dataset1/data1");
    }

    #[test]
    fn test_join_and_leaf() {
        assert_eq!(join_path("/", "what"), "/what");
        assert_eq!(join_path("/dataset1", "data1/what"), "/dataset1/data1/what");
        assert_eq!(leaf_name("/dataset1/data1"), "data1");
        assert_eq!(leaf_name("/"), "");
    }

    #[test]
    fn test_timestamp_truncates_seconds() {
        let t = parse_odim_timestamp("20240517", "123459").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!((t.hour(), t.minute(), t.second()), (12, 34, 0));
    }

    #[test]
    fn test_timestamp_errors() {
        assert!(matches!(parse_odim_timestamp("2024", "12"), Err(TimestampError::TooShort { .. })));
        assert!(matches!(parse_odim_timestamp("2024AB17", "1200"), Err(TimestampError::Unparseable { .. })));
    }
}
