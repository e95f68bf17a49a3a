//! Writers for converted grid data.
use std::path::Path;

pub mod json;
#[cfg(feature = "netcdf")]
pub mod nc;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Netcdf,
}

impl OutputFormat {
    /// Guess the format from a file name: `.nc` and `.nc4` mean netCDF, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("nc") | Some("nc4") => Self::Netcdf,
            _ => Self::Json,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Could not write {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Could not serialize the grid data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[cfg(feature = "netcdf")]
    #[error("netCDF error while writing {path}: {source}")]
    Netcdf { path: String, source: netcdf::Error },
    #[error("This build cannot write {0} output; rebuild with the '{0}' feature")]
    Unavailable(OutputFormat),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out/grid.nc")), OutputFormat::Netcdf);
        assert_eq!(OutputFormat::from_path(Path::new("grid.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("grid")), OutputFormat::Json);
        assert_eq!(OutputFormat::Netcdf.to_string(), "netcdf");
    }
}
