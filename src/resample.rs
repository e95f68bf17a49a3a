//! Copy the raw arrays of each dataset into the destination grid.
//!
//! Raster products (composites, images, cartesian volumes) already share the
//! destination grid, so copying them only scales the values and flips the
//! rows: ODIM stores the top row first, the grid counts from the bottom.
//! Polar volumes are reprojected: every (ray, bin) sample is placed at its
//! ground position and written to the nearest grid cell.
use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::attributes::{get_optional, get_value, resolve, resolve_optional};
use crate::descriptors::time::{valid_time, TimeError};
use crate::descriptors::Descriptors;
use crate::error::{AttributeError, StoreError};
use crate::grid::{Grid, LonLat, WorldXY, MISSING_VALUE};
use crate::inventory::Inventory;
use crate::parameters::{map_parameter, MappingError, Parameter, Product};
use crate::store::AttributeStore;
use crate::utils::join_path;

#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("Failed to read data array {path}: {source}")]
    Store { path: String, source: StoreError },
    #[error("Failed to activate parameter {0} in the destination grid")]
    UnknownParameter(Parameter),
    #[error("Failed to activate time {0} in the destination grid")]
    UnknownTime(NaiveDateTime),
    #[error("Failed to activate the {product} level {value} in the destination grid")]
    UnknownLevel { product: String, value: f64 },
    #[error("{axis} index {index} is out of range for an axis of length {len}")]
    AxisOutOfRange { axis: &'static str, index: usize, len: usize },
    #[error("Values written before any parameter, time and level were selected")]
    NoAxesSelected,
    #[error("Cell {cell} is out of range for a grid of {size} cells")]
    CellOutOfRange { cell: usize, size: usize },
    #[error("Data array {path} has {actual} values, expected {expected}")]
    ArraySize { path: String, expected: usize, actual: usize },
    #[error("Polar dataset {0} has no data entries")]
    NoDataEntries(String),
    #[error("Internal error: could not find a grid point for ray {ray} bin {bin} at {position:?}")]
    OutsideGrid { ray: usize, bin: usize, position: WorldXY },
}

/// Destination of resampled values: a grid with one active
/// (parameter, time, level) combination at a time.
pub trait GridSink {
    fn grid(&self) -> &Grid;

    /// Choose the parameter, time and level that later writes go to
    fn select_axes(&mut self, param: usize, time: usize, level: usize) -> Result<(), ResampleError>;

    fn write_value(&mut self, cell: usize, value: f32) -> Result<(), ResampleError>;
}

/// Conversion of raw counts to physical values.
///
/// `nodata` marks cells without data, `undetect` cells that were measured
/// but had no echo. Absent `gain`/`offset` leave values unscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTransform {
    pub nodata: Option<f64>,
    pub undetect: Option<f64>,
    pub gain: f64,
    pub offset: f64,
}

impl Default for ValueTransform {
    fn default() -> Self {
        Self { nodata: None, undetect: None, gain: 1.0, offset: 0.0 }
    }
}

impl ValueTransform {
    /// Look up the transform for the entry at `parent`, searching its `what`
    /// group and those of its ancestors
    pub fn resolve(store: &dyn AttributeStore, parent: &str) -> Self {
        Self {
            nodata: resolve_optional(store, parent, "what", "nodata"),
            undetect: resolve_optional(store, parent, "what", "undetect"),
            gain: resolve_optional(store, parent, "what", "gain").unwrap_or(1.0),
            offset: resolve_optional(store, parent, "what", "offset").unwrap_or(0.0),
        }
    }

    /// Read the transform from exactly the group `what_path`
    pub fn at(store: &dyn AttributeStore, what_path: &str) -> Self {
        Self {
            nodata: get_optional(store, what_path, "nodata"),
            undetect: get_optional(store, what_path, "undetect"),
            gain: get_optional(store, what_path, "gain").unwrap_or(1.0),
            offset: get_optional(store, what_path, "offset").unwrap_or(0.0),
        }
    }

    pub fn apply(&self, raw: i64) -> f32 {
        let raw = raw as f64;
        if self.nodata == Some(raw) {
            MISSING_VALUE
        } else if self.undetect == Some(raw) {
            self.offset as f32
        } else {
            (raw * self.gain + self.offset) as f32
        }
    }
}

/// Index into an ODIM raster (top row first) of destination cell `pos`
/// (bottom row first). Applying it twice gives `pos` back.
pub fn raster_source_index(pos: usize, width: usize, height: usize) -> usize {
    let row = pos / width;
    let col = pos % width;
    col + width * (height - 1 - row)
}

/// Azimuth in degrees clockwise from north of the center of ray `ray`
pub fn ray_azimuth(ray: usize, nrays: usize) -> f64 {
    360.0 * (ray as f64 + 0.5) / nrays as f64
}

/// Ground distance in meters to the center of bin `bin`
///
/// `rstart` is in kilometers, `rscale` in meters and `elangle` in degrees.
pub fn bin_ground_distance(bin: usize, rstart: f64, rscale: f64, elangle: f64) -> f64 {
    (1000.0 * rstart + (bin as f64 + 0.5) * rscale) * elangle.to_radians().cos()
}

fn axis_indices(
    descriptors: &Descriptors,
    param: Parameter,
    time: NaiveDateTime,
    level: usize,
) -> Result<(usize, usize, usize), ResampleError> {
    let p = descriptors.params.index_of(param).ok_or(ResampleError::UnknownParameter(param))?;
    let t = descriptors.time.index_of(time).ok_or(ResampleError::UnknownTime(time))?;
    Ok((p, t, level))
}

/// Copy dataset `index` of a raster file (COMP, IMAGE, CVOL) into `sink`.
///
/// Each numbered data entry is copied; a dataset without entries is
/// treated as a single array at `<dataset>/data`.
pub fn copy_raster_dataset(
    inventory: &Inventory,
    descriptors: &Descriptors,
    sink: &mut dyn GridSink,
    index: usize,
) -> Result<(), ResampleError> {
    let store = inventory.store();
    let ndata = inventory.count_data(index);
    let parents: Vec<String> = if ndata == 0 {
        vec![inventory.dataset_path(index)]
    } else {
        (1..=ndata).map(|j| inventory.data_path(index, j)).collect()
    };

    let time = valid_time(inventory, index)?;
    let (width, height) = (sink.grid().nx(), sink.grid().ny());

    for parent in parents {
        let product: String = resolve(store, &parent, "what", "product")?;
        let quantity: String = resolve(store, &parent, "what", "quantity")?;

        let level = match Product::parse(&product) {
            Some(prod) if prod.is_level_bearing() => {
                let value: f64 = resolve(store, &parent, "what", "prodpar")?;
                descriptors.levels.index_of(prod.level_type(), value)
                    .ok_or_else(|| ResampleError::UnknownLevel { product: product.clone(), value })?
            },
            _ => 0,
        };

        let transform = ValueTransform::resolve(store, &parent);
        let what = join_path(&parent, "what");
        let param = map_parameter(&product, &quantity, || get_value(store, &what, "threshold_id"))?;
        let (p, t, l) = axis_indices(descriptors, param, time, level)?;

        let array_path = join_path(&parent, "data");
        let values = store.read_numeric_array(&array_path)
            .map_err(|e| ResampleError::Store { path: array_path.clone(), source: e })?;
        if values.len() != width * height {
            return Err(ResampleError::ArraySize { path: array_path, expected: width * height, actual: values.len() });
        }

        debug!("Copying {array_path} ({product}/{quantity}) as {param}, time {time}, level {l}");
        sink.select_axes(p, t, l)?;
        for pos in 0..width * height {
            sink.write_value(pos, transform.apply(values[raster_source_index(pos, width, height)]))?;
        }
    }

    Ok(())
}

/// Geometry of one polar sweep, from `<dataset>/where`
#[derive(Debug, Clone, Copy)]
struct Sweep {
    elangle: f64,
    nbins: usize,
    nrays: usize,
    rscale: f64,
    rstart: f64,
}

impl Sweep {
    fn read(store: &dyn AttributeStore, where_path: &str) -> Result<Self, AttributeError> {
        Ok(Self {
            elangle: get_value(store, where_path, "elangle")?,
            nbins: get_value(store, where_path, "nbins")?,
            nrays: get_value(store, where_path, "nrays")?,
            rscale: get_value(store, where_path, "rscale")?,
            rstart: get_value(store, where_path, "rstart")?,
        })
    }
}

/// Reproject dataset `index` of a polar volume (PVOL) into `sink`.
///
/// All data entries of the dataset are copied. Every dataset is stamped with
/// the valid time of the first dataset, and dataset N goes to level N - 1.
/// A dataset whose ordinal lies past the level axis (possible when sweeps
/// repeat an elevation angle) is skipped with a warning. Where several
/// samples fall into the same cell the last one wins.
pub fn copy_polar_dataset(
    inventory: &Inventory,
    descriptors: &Descriptors,
    sink: &mut dyn GridSink,
    index: usize,
) -> Result<(), ResampleError> {
    let store = inventory.store();
    let ds = inventory.dataset_path(index);
    let ndata = inventory.count_data(index);
    if ndata == 0 {
        return Err(ResampleError::NoDataEntries(ds));
    }

    let time = valid_time(inventory, 1)?;
    let product: String = get_value(store, &join_path(&ds, "what"), "product")?;
    let level = index - 1;
    if level >= descriptors.levels.len() {
        // Repeated elevation angles share one level, so later sweeps have no slot
        warn!(
            "Skipping {ds}: sweep {index} has no level, the volume has {} distinct elevations",
            descriptors.levels.len()
        );
        return Ok(());
    }

    let center = LonLat::new(get_value(store, "/where", "lon")?, get_value(store, "/where", "lat")?);
    let sweep = Sweep::read(store, &join_path(&ds, "where"))?;
    let center_xy = sink.grid().area().latlon_to_world_xy(center);

    info!(
        "Reprojecting {ds}: elevation {} deg, {} rays x {} bins",
        sweep.elangle, sweep.nrays, sweep.nbins
    );

    for j in 1..=ndata {
        let data = inventory.data_path(index, j);
        let what = join_path(&data, "what");
        let quantity: String = get_value(store, &what, "quantity")?;
        let param = map_parameter(&product, &quantity, || get_value(store, &what, "threshold_id"))?;
        let transform = ValueTransform::at(store, &what);
        let (p, t, l) = axis_indices(descriptors, param, time, level)?;

        let array_path = join_path(&data, "data");
        let values = store.read_numeric_array(&array_path)
            .map_err(|e| ResampleError::Store { path: array_path.clone(), source: e })?;
        if values.len() < sweep.nrays * sweep.nbins {
            return Err(ResampleError::ArraySize {
                path: array_path,
                expected: sweep.nrays * sweep.nbins,
                actual: values.len(),
            });
        }

        debug!("Copying {array_path} ({product}/{quantity}) as {param}, level {l}");
        sink.select_axes(p, t, l)?;
        for ray in 0..sweep.nrays {
            let azimuth = ray_azimuth(ray, sweep.nrays).to_radians();
            for bin in 0..sweep.nbins {
                let dist = bin_ground_distance(bin, sweep.rstart, sweep.rscale, sweep.elangle);
                let position = WorldXY::new(center_xy.x + dist * azimuth.sin(), center_xy.y + dist * azimuth.cos());
                let cell = sink.grid().nearest_cell_xy(position)
                    .ok_or(ResampleError::OutsideGrid { ray, bin, position })?;
                let raw = values[ray * sweep.nbins + bin];
                sink.write_value(cell, transform.apply(raw))?;
            }
        }
    }

    Ok(())
}
