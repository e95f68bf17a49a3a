//! CF-style netCDF output.
use std::path::Path;

use log::debug;
use ndarray::Axis;

use super::OutputError;
use crate::grid::{GridData, MISSING_VALUE};

/// Write `data` to a new netCDF file at `path`.
///
/// The file has dimensions `time`, `level`, `y` and `x`, one `f32` variable
/// per parameter over all four, projected `x`/`y` coordinates, 2-D
/// `latitude`/`longitude` and the producer and projection as global attributes.
pub fn write_netcdf(data: &GridData, path: &Path) -> Result<(), OutputError> {
    let nc_err = |e: netcdf::Error| OutputError::Netcdf { path: path.display().to_string(), source: e };
    let grid = data.grid();
    let (nx, ny) = (grid.nx(), grid.ny());

    let mut nc = netcdf::create(path).map_err(nc_err)?;
    nc.add_attribute("Conventions", "CF-1.8").map_err(nc_err)?;
    nc.add_attribute("producer_id", data.producer().id).map_err(nc_err)?;
    nc.add_attribute("producer_name", data.producer().name.as_str()).map_err(nc_err)?;
    nc.add_attribute("projection", grid.area().projection().definition()).map_err(nc_err)?;
    nc.add_attribute("origin_time", data.times().origin().format("%Y-%m-%dT%H:%M:%S").to_string().as_str())
        .map_err(nc_err)?;

    nc.add_dimension("time", data.times().len()).map_err(nc_err)?;
    nc.add_dimension("level", data.levels().len()).map_err(nc_err)?;
    nc.add_dimension("y", ny).map_err(nc_err)?;
    nc.add_dimension("x", nx).map_err(nc_err)?;

    let timestamps: Vec<i64> = data.times().times().iter().map(|t| t.and_utc().timestamp()).collect();
    {
        let mut var = nc.add_variable::<i64>("time", &["time"]).map_err(nc_err)?;
        var.put_values(timestamps.as_slice(), netcdf::Extents::All).map_err(nc_err)?;
        var.put_attribute("standard_name", "time").map_err(nc_err)?;
        var.put_attribute("units", "seconds since 1970-01-01 00:00:00").map_err(nc_err)?;
        var.put_attribute("calendar", "gregorian").map_err(nc_err)?;
    }

    let level_values: Vec<f64> = data.levels().levels().iter().map(|l| l.value).collect();
    let level_names = data.levels().levels().iter().map(|l| l.name.as_str()).collect::<Vec<_>>().join(";");
    {
        let mut var = nc.add_variable::<f64>("level", &["level"]).map_err(nc_err)?;
        var.put_values(level_values.as_slice(), netcdf::Extents::All).map_err(nc_err)?;
        if let Some(first) = data.levels().levels().first() {
            var.put_attribute("level_type", first.level_type.to_string().as_str()).map_err(nc_err)?;
        }
        var.put_attribute("level_names", level_names.as_str()).map_err(nc_err)?;
    }

    let bl = grid.area().bottom_left();
    let xs: Vec<f64> = (0..nx).map(|i| bl.x + i as f64 * grid.dx()).collect();
    let ys: Vec<f64> = (0..ny).map(|j| bl.y + j as f64 * grid.dy()).collect();
    let units = if grid.area().projection().is_geographic() { "degrees" } else { "m" };
    for (name, values) in [("x", xs), ("y", ys)] {
        let mut var = nc.add_variable::<f64>(name, &[name]).map_err(nc_err)?;
        var.put_values(values.as_slice(), netcdf::Extents::All).map_err(nc_err)?;
        var.put_attribute("standard_name", format!("projection_{name}_coordinate").as_str()).map_err(nc_err)?;
        var.put_attribute("units", units).map_err(nc_err)?;
    }

    let (lats, lons): (Vec<f64>, Vec<f64>) = (0..grid.size())
        .map(|c| {
            let p = grid.cell_latlon(c);
            (p.lat, p.lon)
        })
        .unzip();
    for (name, values, unit) in [("latitude", lats, "degrees_north"), ("longitude", lons, "degrees_east")] {
        let mut var = nc.add_variable::<f64>(name, &["y", "x"]).map_err(nc_err)?;
        var.put_values(values.as_slice(), netcdf::Extents::All).map_err(nc_err)?;
        var.put_attribute("standard_name", name).map_err(nc_err)?;
        var.put_attribute("units", unit).map_err(nc_err)?;
    }

    for (p, param) in data.params().params().iter().enumerate() {
        let values: Vec<f32> = data.values().index_axis(Axis(0), p).iter().copied().collect();
        let mut var = nc.add_variable::<f32>(param.name(), &["time", "level", "y", "x"]).map_err(nc_err)?;
        var.put_attribute("_FillValue", MISSING_VALUE).map_err(nc_err)?;
        var.put_attribute("long_name", param.name()).map_err(nc_err)?;
        var.put_attribute("parameter_id", param.id()).map_err(nc_err)?;
        var.put_attribute("coordinates", "latitude longitude").map_err(nc_err)?;
        var.put_values(values.as_slice(), netcdf::Extents::All).map_err(nc_err)?;
        debug!("Wrote {} to {}", param.name(), path.display());
    }

    Ok(())
}
