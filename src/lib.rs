//! Conversion of EUMETNET OPERA (ODIM_H5) radar files into flat gridded data.
//!
//! The usual entry point is [`convert::convert`], which takes an opened file
//! behind an [`store::AttributeStore`] and returns [`grid::GridData`] ready to
//! be written by one of the [`output`] writers.
pub mod error;
pub mod utils;
pub mod logging;
pub mod store;
#[cfg(feature = "netcdf")]
pub mod nc_utils;
pub mod attributes;
pub mod inventory;
pub mod parameters;
pub mod descriptors;
pub mod grid;
pub mod resample;
pub mod config;
pub mod convert;
pub mod output;

#[cfg(test)]
mod test_utils;

pub use config::ConvertOptions;
pub use convert::{convert, ConvertError};
