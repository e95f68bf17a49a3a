//! The destination grid data model: projections, areas, regular grids and
//! the four dimensional value container.
use std::str::FromStr;

use serde::Serialize;

pub mod area;
pub mod container;
pub mod projection;

pub use area::Area;
pub use container::GridData;
pub use projection::{LonLat, Projection, WorldXY};

/// Value stored in cells that have no data
pub const MISSING_VALUE: f32 = 32700.0;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Invalid projection definition '{def}': {reason}")]
    BadProjection { def: String, reason: String },
    #[error("Invalid area: {reason}")]
    DegenerateArea { reason: String },
    #[error("A grid must have at least one point in each direction, got {nx} x {ny}")]
    EmptyGrid { nx: usize, ny: usize },
    #[error("Invalid grid specification '{spec}': {reason}")]
    BadGridSpec { spec: String, reason: String },
}

/// A regular `nx` by `ny` grid of points over an [`Area`].
///
/// Point `(i, j)` counts from the bottom left corner, and the corner points
/// lie on the area's edges, so neighbouring points are `width / (nx - 1)`
/// apart. Cells are numbered row by row from the bottom: `j * nx + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    area: Area,
    nx: usize,
    ny: usize,
}

impl Grid {
    pub fn new(area: Area, nx: usize, ny: usize) -> Result<Self, GridError> {
        if nx == 0 || ny == 0 {
            return Err(GridError::EmptyGrid { nx, ny });
        }
        Ok(Self { area, nx, ny })
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of cells
    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    pub fn dx(&self) -> f64 {
        if self.nx > 1 { self.area.width() / (self.nx - 1) as f64 } else { self.area.width() }
    }

    pub fn dy(&self) -> f64 {
        if self.ny > 1 { self.area.height() / (self.ny - 1) as f64 } else { self.area.height() }
    }

    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    pub fn cell_world_xy(&self, cell: usize) -> WorldXY {
        let (i, j) = (cell % self.nx, cell / self.nx);
        let bl = self.area.bottom_left();
        WorldXY::new(bl.x + i as f64 * self.dx(), bl.y + j as f64 * self.dy())
    }

    pub fn cell_latlon(&self, cell: usize) -> LonLat {
        self.area.world_xy_to_latlon(self.cell_world_xy(cell))
    }

    /// Position of `p` in fractional grid indices, or `None` if it falls
    /// more than half a cell outside the grid.
    pub fn fractional_index(&self, p: LonLat) -> Option<(f64, f64)> {
        let xy = self.area.latlon_to_world_xy(p);
        self.fractional_index_xy(xy)
    }

    pub fn fractional_index_xy(&self, xy: WorldXY) -> Option<(f64, f64)> {
        if !xy.is_finite() {
            return None;
        }

        let bl = self.area.bottom_left();
        let fi = (xy.x - bl.x) / self.dx();
        let fj = (xy.y - bl.y) / self.dy();
        let inside = |f: f64, n: usize| f >= -0.5 && f <= n as f64 - 0.5;
        if inside(fi, self.nx) && inside(fj, self.ny) {
            Some((fi, fj))
        } else {
            None
        }
    }

    /// Cell closest to `p`, or `None` if `p` is outside the grid.
    pub fn nearest_cell(&self, p: LonLat) -> Option<usize> {
        let (fi, fj) = self.fractional_index(p)?;
        Some(self.nearest_to_fraction(fi, fj))
    }

    /// Cell closest to world coordinates `xy`
    pub fn nearest_cell_xy(&self, xy: WorldXY) -> Option<usize> {
        let (fi, fj) = self.fractional_index_xy(xy)?;
        Some(self.nearest_to_fraction(fi, fj))
    }

    fn nearest_to_fraction(&self, fi: f64, fj: f64) -> usize {
        let i = (fi.round().max(0.0) as usize).min(self.nx - 1);
        let j = (fj.round().max(0.0) as usize).min(self.ny - 1);
        self.cell_index(i, j)
    }
}

/// A requested output grid, written as
/// `<projdef>:<LL_lon>,<LL_lat>,<UR_lon>,<UR_lat>:<nx>,<ny>`, e.g.
/// `+proj=stere +lat_0=90 +lon_0=20 +lat_ts=60:6,51.3,49,70.2:600,800`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputGridSpec {
    pub projdef: String,
    pub bottom_left: LonLat,
    pub top_right: LonLat,
    pub nx: usize,
    pub ny: usize,
}

impl OutputGridSpec {
    pub fn parse(spec: &str) -> Result<Self, GridError> {
        let bad = |reason: &str| GridError::BadGridSpec { spec: spec.to_string(), reason: reason.to_string() };

        let mut parts = spec.rsplitn(3, ':');
        let size = parts.next().ok_or_else(|| bad("missing grid size"))?;
        let corners = parts.next().ok_or_else(|| bad("expected <projdef>:<corners>:<size>"))?;
        let projdef = parts.next().ok_or_else(|| bad("expected <projdef>:<corners>:<size>"))?;

        let corners = corners.split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad("corners must be four numbers"))?;
        let [ll_lon, ll_lat, ur_lon, ur_lat] = corners[..] else {
            return Err(bad("corners must be four numbers: LL_lon,LL_lat,UR_lon,UR_lat"));
        };

        let size = size.split(',')
            .map(|s| s.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad("grid size must be two positive integers"))?;
        let [nx, ny] = size[..] else {
            return Err(bad("grid size must be two positive integers: nx,ny"));
        };

        Ok(Self {
            projdef: projdef.trim().to_string(),
            bottom_left: LonLat::new(ll_lon, ll_lat),
            top_right: LonLat::new(ur_lon, ur_lat),
            nx,
            ny,
        })
    }

    pub fn to_grid(&self) -> Result<Grid, GridError> {
        let projection = Projection::from_proj_str(&self.projdef)?;
        let area = Area::from_corners(projection, self.bottom_left, self.top_right)?;
        Grid::new(area, self.nx, self.ny)
    }
}

impl FromStr for OutputGridSpec {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn latlon_grid() -> Grid {
        let proj = Projection::from_proj_str("+proj=longlat").unwrap();
        let area = Area::from_corners(proj, LonLat::new(0.0, 0.0), LonLat::new(10.0, 20.0)).unwrap();
        Grid::new(area, 11, 5).unwrap()
    }

    #[rstest]
    fn test_cell_positions(latlon_grid: Grid) {
        assert_eq!(latlon_grid.size(), 55);
        assert_abs_diff_eq!(latlon_grid.dx(), 1.0);
        assert_abs_diff_eq!(latlon_grid.dy(), 5.0);
        let p = latlon_grid.cell_latlon(latlon_grid.cell_index(3, 2));
        assert_abs_diff_eq!(p.lon, 3.0);
        assert_abs_diff_eq!(p.lat, 10.0);
    }

    #[rstest]
    #[case(LonLat::new(3.2, 9.0), Some((3, 2)))]
    #[case(LonLat::new(-0.4, -2.4), Some((0, 0)))]
    #[case(LonLat::new(10.49, 22.4), Some((10, 4)))]
    #[case(LonLat::new(-0.6, 5.0), None)]
    #[case(LonLat::new(5.0, 22.6), None)]
    fn test_nearest_cell(latlon_grid: Grid, #[case] p: LonLat, #[case] expected: Option<(usize, usize)>) {
        let expected = expected.map(|(i, j)| latlon_grid.cell_index(i, j));
        assert_eq!(latlon_grid.nearest_cell(p), expected);
    }

    #[test]
    fn test_empty_grid() {
        let proj = Projection::from_proj_str("+proj=longlat").unwrap();
        let area = Area::from_corners(proj, LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)).unwrap();
        assert!(matches!(Grid::new(area, 0, 3), Err(GridError::EmptyGrid { .. })));
    }

    #[test]
    fn test_parse_grid_spec() {
        let spec = OutputGridSpec::parse("+proj=stere +lat_0=90 +lon_0=20 +lat_ts=60:6,51.3,49,70.2:600,800").unwrap();
        assert_eq!(spec.projdef, "+proj=stere +lat_0=90 +lon_0=20 +lat_ts=60");
        assert_eq!(spec.bottom_left, LonLat::new(6.0, 51.3));
        assert_eq!(spec.top_right, LonLat::new(49.0, 70.2));
        assert_eq!((spec.nx, spec.ny), (600, 800));
        let grid = spec.to_grid().unwrap();
        assert_eq!(grid.size(), 480_000);
    }

    #[rstest]
    #[case("+proj=longlat:0,0,10:5,5")]
    #[case("+proj=longlat:0,0,10,10:5")]
    #[case("+proj=longlat:0,0,10,10:5,-5")]
    #[case("0,0,10,10:5,5")]
    fn test_bad_grid_spec(#[case] spec: &str) {
        assert!(matches!(OutputGridSpec::parse(spec), Err(GridError::BadGridSpec { .. })));
    }
}
