//! Common errors across the odim-grid crate

/// Errors raised by an [`AttributeStore`](crate::store::AttributeStore)
/// while reading the hierarchical source file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not open {path}: {reason}")]
    CouldNotOpen { path: String, reason: String },
    #[error("Group {0} does not exist")]
    NoSuchGroup(String),
    #[error("Attribute {name} does not exist in group {path}")]
    NoSuchAttribute { path: String, name: String },
    #[error("Numeric array {0} does not exist")]
    NoSuchArray(String),
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

impl StoreError {
    pub fn read_failed<P: ToString, R: ToString>(path: P, reason: R) -> Self {
        Self::ReadFailed { path: path.to_string(), reason: reason.to_string() }
    }
}

/// Errors locating an attribute or converting it to the requested type
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("Did not find attribute: {name} with group: {group}")]
    NotFound { group: String, name: String },
    #[error("Failed to read attribute {path}/{name}: {source}")]
    Store { path: String, name: String, source: StoreError },
    #[error("Attribute {path}/{name} holds a {actual} value, expected {expected}")]
    WrongType { path: String, name: String, expected: &'static str, actual: &'static str },
    #[error("Element {path}/{name} is not of size 1, but {count}")]
    WrongCount { path: String, name: String, count: usize },
    #[error("Attribute {path}/{name} value {value} does not fit in a {target}")]
    OutOfRange { path: String, name: String, value: String, target: &'static str },
}

impl AttributeError {
    pub(crate) fn store(path: &str, name: &str, source: StoreError) -> Self {
        Self::Store { path: path.to_string(), name: name.to_string(), source }
    }

    /// `true` if this error means the attribute was absent rather than unreadable
    pub fn is_absent(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Store { source: StoreError::NoSuchAttribute { .. }, .. } => true,
            Self::Store { source: StoreError::NoSuchGroup(_), .. } => true,
            _ => false,
        }
    }
}
