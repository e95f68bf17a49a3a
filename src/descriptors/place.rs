use log::debug;

use crate::attributes::get_value;
use crate::grid::{Area, Grid, LonLat, Projection, WorldXY};
use crate::inventory::{Inventory, ObjectKind};
use crate::store::AttributeStore;
use crate::utils::join_path;

use super::DescriptorError;

/// Build the horizontal grid the data will be written to.
///
/// Raster objects describe their own grid in `/where`. Polar volumes get a
/// square azimuthal equidistant grid centered on the radar that is large
/// enough for the longest sweep.
pub fn build(inventory: &Inventory, kind: ObjectKind) -> Result<Grid, DescriptorError> {
    match kind {
        ObjectKind::Composite | ObjectKind::Image | ObjectKind::CartesianVolume => raster_grid(inventory.store()),
        ObjectKind::PolarVolume => polar_grid(inventory),
        _ => Err(DescriptorError::unsupported(kind)),
    }
}

fn corner(store: &dyn AttributeStore, lon: &str, lat: &str) -> Result<LonLat, DescriptorError> {
    Ok(LonLat::new(get_value(store, "/where", lon)?, get_value(store, "/where", lat)?))
}

fn raster_grid(store: &dyn AttributeStore) -> Result<Grid, DescriptorError> {
    let projdef: String = get_value(store, "/where", "projdef")?;
    let nx: usize = get_value(store, "/where", "xsize")?;
    let ny: usize = get_value(store, "/where", "ysize")?;
    let projection = Projection::from_proj_str(&projdef)?;

    let area = if store.probe_attribute("/where", "LL_lon") {
        let ll = corner(store, "LL_lon", "LL_lat")?;
        let ur = corner(store, "UR_lon", "UR_lat")?;
        Area::from_corners(projection, ll, ur)?
    } else {
        // Only the upper left and lower right corners are given: the other
        // two follow from them in projected coordinates, not in lat/lon.
        let ul = corner(store, "UL_lon", "UL_lat")?;
        let lr = corner(store, "LR_lon", "LR_lat")?;
        let ul_xy = projection.forward(ul);
        let lr_xy = projection.forward(lr);
        let ll = projection.inverse(WorldXY::new(ul_xy.x, lr_xy.y));
        let ur = projection.inverse(WorldXY::new(lr_xy.x, ul_xy.y));
        debug!("Derived corners {ll} and {ur} from UL {ul} and LR {lr}");
        Area::from_corners(projection, ll, ur)?
    };

    Ok(Grid::new(area, nx, ny)?)
}

fn polar_grid(inventory: &Inventory) -> Result<Grid, DescriptorError> {
    let store = inventory.store();
    let center = corner(store, "lon", "lat")?;

    let mut max_range: f64 = 0.0;
    let mut max_bins: usize = 0;
    for i in inventory.datasets() {
        let where_ = join_path(&inventory.dataset_path(i), "where");
        let nbins: usize = get_value(store, &where_, "nbins")?;
        let rscale: f64 = get_value(store, &where_, "rscale")?;
        let rstart: f64 = get_value(store, &where_, "rstart")?;
        let elangle: f64 = get_value(store, &where_, "elangle")?;

        let range = 1000.0 * rstart + nbins as f64 * rscale * elangle.to_radians().cos();
        max_range = max_range.max(range);
        max_bins = max_bins.max(nbins);
    }

    let half_width = 1000.0 * (max_range / 1000.0).ceil();
    debug!("Polar volume at {center}: range {max_range} m, grid half width {half_width} m, {max_bins} bins");

    let area = Area::from_world_bounds(
        Projection::azimuthal_equidistant(center),
        WorldXY::new(-half_width, -half_width),
        WorldXY::new(half_width, half_width),
    )?;
    Ok(Grid::new(area, 2 * max_bins, 2 * max_bins)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridError;
    use crate::store::MemoryStore;
    use approx::assert_abs_diff_eq;

    const STERE: &str = "+proj=stere +lat_0=90 +lon_0=10 +lat_ts=60";

    #[test]
    fn test_literal_corners() {
        let store = MemoryStore::new()
            .with_attr("/where", "projdef", STERE)
            .with_attr("/where", "xsize", 4)
            .with_attr("/where", "ysize", 3)
            .with_attr("/where", "LL_lon", 0.0)
            .with_attr("/where", "LL_lat", 50.0)
            .with_attr("/where", "UR_lon", 40.0)
            .with_attr("/where", "UR_lat", 70.0);
        let grid = build(&Inventory::new(&store, "dataset"), ObjectKind::Composite).unwrap();
        assert_eq!((grid.nx(), grid.ny()), (4, 3));
        let ll = grid.area().bottom_left_latlon();
        assert_abs_diff_eq!(ll.lon, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ll.lat, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn test_corners_from_ul_lr() {
        let proj = Projection::from_proj_str(STERE).unwrap();
        let ll_xy = WorldXY::new(-1.0e6, -4.0e6);
        let ur_xy = WorldXY::new(1.0e6, -2.0e6);
        let ul = proj.inverse(WorldXY::new(ll_xy.x, ur_xy.y));
        let lr = proj.inverse(WorldXY::new(ur_xy.x, ll_xy.y));

        let store = MemoryStore::new()
            .with_attr("/where", "projdef", STERE)
            .with_attr("/where", "xsize", 10)
            .with_attr("/where", "ysize", 10)
            .with_attr("/where", "UL_lon", ul.lon)
            .with_attr("/where", "UL_lat", ul.lat)
            .with_attr("/where", "LR_lon", lr.lon)
            .with_attr("/where", "LR_lat", lr.lat);
        let grid = build(&Inventory::new(&store, "dataset"), ObjectKind::Image).unwrap();
        let bl = grid.area().bottom_left();
        let tr = grid.area().top_right();
        assert_abs_diff_eq!(bl.x, ll_xy.x, epsilon = 1e-3);
        assert_abs_diff_eq!(bl.y, ll_xy.y, epsilon = 1e-3);
        assert_abs_diff_eq!(tr.x, ur_xy.x, epsilon = 1e-3);
        assert_abs_diff_eq!(tr.y, ur_xy.y, epsilon = 1e-3);
    }

    #[test]
    fn test_polar_grid() {
        let store = MemoryStore::new()
            .with_attr("/where", "lon", 25.0)
            .with_attr("/where", "lat", 60.0)
            .with_attr("/dataset1/where", "nbins", 500)
            .with_attr("/dataset1/where", "rscale", 500.0)
            .with_attr("/dataset1/where", "rstart", 0.0)
            .with_attr("/dataset1/where", "elangle", 0.0)
            .with_attr("/dataset2/where", "nbins", 400)
            .with_attr("/dataset2/where", "rscale", 1000.0)
            .with_attr("/dataset2/where", "rstart", 0.5)
            .with_attr("/dataset2/where", "elangle", 0.0);
        let grid = build(&Inventory::new(&store, "dataset"), ObjectKind::PolarVolume).unwrap();
        // 400 km + 500 m is rounded up to whole kilometers
        assert_eq!((grid.nx(), grid.ny()), (1000, 1000));
        assert_abs_diff_eq!(grid.area().top_right().x, 401_000.0);
        assert_abs_diff_eq!(grid.area().bottom_left().y, -401_000.0);
        let center = grid.area().latlon_to_world_xy(LonLat::new(25.0, 60.0));
        assert_abs_diff_eq!(center.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_scan_is_rejected() {
        let store = MemoryStore::new();
        let err = build(&Inventory::new(&store, "dataset"), ObjectKind::Scan).unwrap_err();
        assert_eq!(err.to_string(), "SCAN (polar scan) data is not supported");
    }

    #[test]
    fn test_bad_projection() {
        let store = MemoryStore::new()
            .with_attr("/where", "projdef", "+proj=nonsense")
            .with_attr("/where", "xsize", 4)
            .with_attr("/where", "ysize", 3);
        let err = build(&Inventory::new(&store, "dataset"), ObjectKind::Composite).unwrap_err();
        assert!(matches!(err, DescriptorError::Grid(GridError::BadProjection { .. })));
    }
}
