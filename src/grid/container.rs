use chrono::NaiveDateTime;
use log::debug;
use ndarray::{s, Array4, ArrayView1};

use super::{Grid, MISSING_VALUE};
use crate::config::Producer;
use crate::descriptors::{Descriptors, LevelDescriptor, ParamDescriptor, TimeDescriptor};
use crate::parameters::Parameter;
use crate::resample::{GridSink, ResampleError};

/// Gridded values over the parameter, time, level and horizontal axes.
///
/// The axes are fixed when the container is created and every value
/// starts as [`MISSING_VALUE`]. Values are stored in an
/// `[param, time, level, cell]` array, with cells numbered as in [`Grid`].
#[derive(Debug, Clone)]
pub struct GridData {
    producer: Producer,
    params: ParamDescriptor,
    times: TimeDescriptor,
    levels: LevelDescriptor,
    grid: Grid,
    values: Array4<f32>,
    selected: Option<(usize, usize, usize)>,
}

impl GridData {
    pub fn new(descriptors: Descriptors, producer: Producer) -> Self {
        let Descriptors { time, params, levels, place } = descriptors;
        let shape = (params.len(), time.len(), levels.len(), place.size());
        debug!("Allocating grid data of shape {shape:?}");
        Self {
            producer,
            values: Array4::from_elem(shape, MISSING_VALUE),
            params,
            times: time,
            levels,
            grid: place,
            selected: None,
        }
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn set_producer(&mut self, producer: Producer) {
        self.producer = producer;
    }

    pub fn params(&self) -> &ParamDescriptor {
        &self.params
    }

    pub fn times(&self) -> &TimeDescriptor {
        &self.times
    }

    pub fn levels(&self) -> &LevelDescriptor {
        &self.levels
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All values, indexed `[param, time, level, cell]`
    pub fn values(&self) -> &Array4<f32> {
        &self.values
    }

    /// Values of one horizontal field, in cell order
    pub fn field(&self, param: usize, time: usize, level: usize) -> ArrayView1<'_, f32> {
        self.values.slice(s![param, time, level, ..])
    }

    /// Value at one point, looked up by the axis values
    pub fn value_at(&self, param: Parameter, time: NaiveDateTime, level: usize, cell: usize) -> Option<f32> {
        let p = self.params.index_of(param)?;
        let t = self.times.index_of(time)?;
        self.values.get((p, t, level, cell)).copied()
    }

    /// Resample every field onto `target`.
    ///
    /// Target points are located in this grid and bilinearly interpolated from
    /// the four surrounding cells. If any of those is missing, the nearest
    /// cell's value is used instead; target points outside this grid are missing.
    pub fn interpolate_to_grid(&self, target: &Grid) -> GridData {
        let weights: Vec<Option<Stencil>> = (0..target.size())
            .map(|c| {
                let p = target.cell_latlon(c);
                self.grid.fractional_index(p).map(|(fi, fj)| Stencil::new(&self.grid, fi, fj))
            })
            .collect();

        let (np, nt, nl, _) = self.values.dim();
        let mut values = Array4::from_elem((np, nt, nl, target.size()), MISSING_VALUE);
        for p in 0..np {
            for t in 0..nt {
                for l in 0..nl {
                    let src = self.field(p, t, l);
                    let mut dest = values.slice_mut(s![p, t, l, ..]);
                    for (d, w) in dest.iter_mut().zip(weights.iter()) {
                        if let Some(w) = w {
                            *d = w.apply(src);
                        }
                    }
                }
            }
        }

        debug!("Interpolated {} x {} grid onto {} x {}", self.grid.nx(), self.grid.ny(), target.nx(), target.ny());
        GridData {
            producer: self.producer.clone(),
            params: self.params.clone(),
            times: self.times.clone(),
            levels: self.levels.clone(),
            grid: target.clone(),
            values,
            selected: None,
        }
    }
}

/// The four source cells around a target point, their weights and the nearest cell
struct Stencil {
    cells: [usize; 4],
    weights: [f32; 4],
    nearest: usize,
}

impl Stencil {
    fn new(grid: &Grid, fi: f64, fj: f64) -> Self {
        let clamp = |f: f64, n: usize| (f.floor().max(0.0) as usize).min(n - 1);
        let (i0, j0) = (clamp(fi, grid.nx()), clamp(fj, grid.ny()));
        let (i1, j1) = ((i0 + 1).min(grid.nx() - 1), (j0 + 1).min(grid.ny() - 1));
        let wx = (fi - i0 as f64).clamp(0.0, 1.0) as f32;
        let wy = (fj - j0 as f64).clamp(0.0, 1.0) as f32;

        let near_i = if wx < 0.5 { i0 } else { i1 };
        let near_j = if wy < 0.5 { j0 } else { j1 };
        Self {
            cells: [grid.cell_index(i0, j0), grid.cell_index(i1, j0), grid.cell_index(i0, j1), grid.cell_index(i1, j1)],
            weights: [(1.0 - wx) * (1.0 - wy), wx * (1.0 - wy), (1.0 - wx) * wy, wx * wy],
            nearest: grid.cell_index(near_i, near_j),
        }
    }

    fn apply(&self, field: ArrayView1<'_, f32>) -> f32 {
        let vals = self.cells.map(|c| field[c]);
        if vals.iter().any(|&v| v == MISSING_VALUE) {
            return field[self.nearest];
        }
        vals.iter().zip(self.weights.iter()).map(|(v, w)| v * w).sum()
    }
}

impl GridSink for GridData {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn select_axes(&mut self, param: usize, time: usize, level: usize) -> Result<(), ResampleError> {
        let (np, nt, nl, _) = self.values.dim();
        for (axis, index, len) in [("parameter", param, np), ("time", time, nt), ("level", level, nl)] {
            if index >= len {
                return Err(ResampleError::AxisOutOfRange { axis, index, len });
            }
        }
        self.selected = Some((param, time, level));
        Ok(())
    }

    fn write_value(&mut self, cell: usize, value: f32) -> Result<(), ResampleError> {
        let (p, t, l) = self.selected.ok_or(ResampleError::NoAxesSelected)?;
        let size = self.grid.size();
        let slot = self.values.get_mut((p, t, l, cell))
            .ok_or(ResampleError::CellOutOfRange { cell, size })?;
        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Level;
    use crate::grid::{Area, LonLat, Projection};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    fn latlon_grid(ll: (f64, f64), ur: (f64, f64), nx: usize, ny: usize) -> Grid {
        let proj = Projection::from_proj_str("+proj=longlat").unwrap();
        let area = Area::from_corners(proj, LonLat::new(ll.0, ll.1), LonLat::new(ur.0, ur.1)).unwrap();
        Grid::new(area, nx, ny).unwrap()
    }

    #[fixture]
    fn data() -> GridData {
        let t = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let descriptors = Descriptors {
            time: TimeDescriptor::new(t, vec![t]),
            params: ParamDescriptor::new(vec![Parameter::Reflectivity]),
            levels: LevelDescriptor::new(vec![Level::trivial()]),
            place: latlon_grid((0.0, 0.0), (1.0, 1.0), 2, 2),
        };
        let mut data = GridData::new(descriptors, Producer::default());
        data.select_axes(0, 0, 0).unwrap();
        for (cell, v) in [0.0, 10.0, 20.0, 30.0].into_iter().enumerate() {
            data.write_value(cell, v).unwrap();
        }
        data
    }

    #[rstest]
    fn test_sink_bounds(mut data: GridData) {
        assert!(matches!(data.select_axes(1, 0, 0), Err(ResampleError::AxisOutOfRange { axis: "parameter", .. })));
        assert!(matches!(data.write_value(4, 1.0), Err(ResampleError::CellOutOfRange { cell: 4, size: 4 })));
    }

    #[rstest]
    fn test_bilinear(data: GridData) {
        let target = latlon_grid((0.25, 0.5), (0.75, 1.0), 2, 2);
        let out = data.interpolate_to_grid(&target);
        let f = out.field(0, 0, 0);
        assert_abs_diff_eq!(f[0], 12.5, epsilon = 1e-4);
        assert_abs_diff_eq!(f[1], 17.5, epsilon = 1e-4);
        assert_abs_diff_eq!(f[2], 22.5, epsilon = 1e-4);
        assert_abs_diff_eq!(f[3], 27.5, epsilon = 1e-4);
    }

    #[rstest]
    fn test_missing_neighbour_uses_nearest(mut data: GridData) {
        data.write_value(3, MISSING_VALUE).unwrap();
        let target = latlon_grid((0.1, 0.1), (2.0, 2.0), 2, 2);
        let out = data.interpolate_to_grid(&target);
        let f = out.field(0, 0, 0);
        // (0.1, 0.1) is closest to cell 0; (2, 2) is outside the source grid
        assert_abs_diff_eq!(f[0], 0.0);
        assert_eq!(f[3], MISSING_VALUE);
    }
}
