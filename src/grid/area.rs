use super::projection::{LonLat, Projection, WorldXY};
use super::GridError;

/// A rectangle in the world coordinates of a projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    projection: Projection,
    bottom_left: WorldXY,
    top_right: WorldXY,
}

impl Area {
    /// Build an area from its bottom left and top right corners in geographic coordinates.
    pub fn from_corners(projection: Projection, bottom_left: LonLat, top_right: LonLat) -> Result<Self, GridError> {
        let bl = projection.forward(bottom_left);
        let tr = projection.forward(top_right);
        Self::from_world_bounds(projection, bl, tr)
    }

    /// Build an area from its bottom left and top right corners in world coordinates.
    ///
    /// # Errors
    /// Fails if either corner is non-finite or if the area has no extent in x or y.
    pub fn from_world_bounds(projection: Projection, bottom_left: WorldXY, top_right: WorldXY) -> Result<Self, GridError> {
        if !bottom_left.is_finite() || !top_right.is_finite() {
            return Err(GridError::DegenerateArea {
                reason: format!("corners {bottom_left:?} and {top_right:?} cannot be represented in {projection}"),
            });
        }

        if top_right.x <= bottom_left.x || top_right.y <= bottom_left.y {
            return Err(GridError::DegenerateArea {
                reason: format!("top right corner {top_right:?} is not above and right of bottom left {bottom_left:?}"),
            });
        }

        Ok(Self { projection, bottom_left, top_right })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn bottom_left(&self) -> WorldXY {
        self.bottom_left
    }

    pub fn top_right(&self) -> WorldXY {
        self.top_right
    }

    pub fn bottom_left_latlon(&self) -> LonLat {
        self.projection.inverse(self.bottom_left)
    }

    pub fn top_right_latlon(&self) -> LonLat {
        self.projection.inverse(self.top_right)
    }

    pub fn width(&self) -> f64 {
        self.top_right.x - self.bottom_left.x
    }

    pub fn height(&self) -> f64 {
        self.top_right.y - self.bottom_left.y
    }

    pub fn latlon_to_world_xy(&self, p: LonLat) -> WorldXY {
        self.projection.forward(p)
    }

    pub fn world_xy_to_latlon(&self, p: WorldXY) -> LonLat {
        self.projection.inverse(p)
    }
}
