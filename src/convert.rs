//! The conversion driver: from an opened ODIM file to filled grid data.
use std::fmt::Display;

use error_stack::ResultExt;
use log::{debug, info, log_enabled, Level};

use crate::config::ConvertOptions;
use crate::descriptors::Descriptors;
use crate::grid::{GridData, OutputGridSpec};
use crate::inventory::{Inventory, ObjectKind};
use crate::resample::{copy_polar_dataset, copy_raster_dataset, ResampleError};
use crate::store::AttributeStore;
use crate::utils::join_path;

/// Top level error contexts of a conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The options asked for something impossible, e.g. a malformed output projection
    OptionsError(String),

    /// The input file is malformed, or holds data this converter does not handle
    InputError(String),

    /// Something that should not happen with any input
    InternalError(String),
}

impl ConvertError {
    pub fn options_error<S: ToString>(msg: S) -> Self {
        Self::OptionsError(msg.to_string())
    }

    pub fn input_error<S: ToString>(msg: S) -> Self {
        Self::InputError(msg.to_string())
    }

    pub fn internal_error<S: ToString>(msg: S) -> Self {
        Self::InternalError(msg.to_string())
    }
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::OptionsError(msg) => write!(f, "Invalid options: {msg}"),
            ConvertError::InputError(msg) => write!(f, "Input error: {msg}"),
            ConvertError::InternalError(msg) => write!(
                f, "Internal error: {msg}. This indicates a problem with the converter rather than the input file."
            ),
        }
    }
}

/// Convert the ODIM file behind `store` into grid data.
///
/// All structural metadata is read and checked before anything is copied,
/// and any failure aborts the whole conversion: there is never a partially
/// filled result.
pub fn convert(store: &dyn AttributeStore, options: &ConvertOptions) -> error_stack::Result<GridData, ConvertError> {
    let inventory = Inventory::new(store, &options.dataset_prefix);
    inventory.validate()
        .change_context_lazy(|| ConvertError::input_error("the file is not valid OPERA HDF5 radar data"))?;

    if log_enabled!(Level::Debug) {
        describe_store(store, "/");
    }

    // Check the requested output grid before doing any real work
    let output_grid = options.projection.as_deref()
        .map(|s| OutputGridSpec::parse(s).and_then(|spec| spec.to_grid()))
        .transpose()
        .change_context_lazy(|| ConvertError::options_error("could not set up the output projection"))?;

    let kind = inventory.object_kind()
        .change_context_lazy(|| ConvertError::input_error("could not determine the data object type"))?;
    let descriptors = Descriptors::build(&inventory)
        .change_context_lazy(|| ConvertError::input_error("could not describe the contents of the file"))?;

    let mut data = GridData::new(descriptors.clone(), options.producer.clone());
    let ndatasets = inventory.count_datasets();
    info!("Copying {ndatasets} {kind} dataset(s)");

    for i in inventory.datasets() {
        let res = if kind == ObjectKind::PolarVolume {
            copy_polar_dataset(&inventory, &descriptors, &mut data, i)
        } else {
            copy_raster_dataset(&inventory, &descriptors, &mut data, i)
        };

        res.map_err(|e| {
            let context = if is_internal(&e) {
                ConvertError::internal_error("resampling failed")
            } else {
                ConvertError::input_error("could not copy the data")
            };
            error_stack::Report::new(e).change_context(context)
        })
        .attach_printable_lazy(|| format!("while copying {}", inventory.dataset_path(i)))?;
    }

    let data = match output_grid {
        Some(grid) => {
            info!("Interpolating to the requested output grid");
            data.interpolate_to_grid(&grid)
        },
        None => data,
    };
    Ok(data)
}

fn is_internal(e: &ResampleError) -> bool {
    matches!(
        e,
        ResampleError::OutsideGrid { .. }
            | ResampleError::NoAxesSelected
            | ResampleError::CellOutOfRange { .. }
            | ResampleError::AxisOutOfRange { .. }
    )
}

/// Log every group and attribute under `path` at debug level.
pub fn describe_store(store: &dyn AttributeStore, path: &str) {
    let names = store.attribute_names(path).unwrap_or_default();
    for name in names {
        match store.read_attribute(path, &name) {
            Ok(value) => debug!("{path}: {name} = {value}"),
            Err(e) => debug!("{path}: {name} could not be read ({e})"),
        }
    }

    for child in store.list_child_groups(path).unwrap_or_default() {
        describe_store(store, &join_path(path, &child));
    }
}
