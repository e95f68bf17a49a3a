//! Map projections for the PROJ definitions found in ODIM files.
//!
//! ODIM composites carry their projection as a PROJ string in
//! `/where.projdef`; these are handed to `proj4rs`, so any projection it
//! implements (`stere`, `laea`, `lcc`, `merc`, `somerc`, `tmerc`, `longlat`,
//! ...) can be used, with false easting/northing and units applied as PROJ
//! does. Geographic projections use degrees as world units.
//!
//! Polar volumes are placed on an azimuthal equidistant grid centered on the
//! radar. That one is evaluated directly on a sphere of radius
//! [`EARTH_RADIUS`], the same sphere the ray/bin geometry assumes.
use std::f64::consts::PI;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GridError;

/// Mean earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_220.0;

/// Geographic coordinates on the WGS84 ellipsoid, the source of every forward transform
const GEOGRAPHIC_DEF: &str = "+proj=longlat +ellps=WGS84";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl Display for LonLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lon, self.lat)
    }
}

/// Projected ("world") coordinates, in meters except for geographic projections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldXY {
    pub x: f64,
    pub y: f64,
}

impl WorldXY {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

enum Kind {
    Proj { geographic: proj4rs::Proj, target: proj4rs::Proj, latlong: bool },
    /// Spherical azimuthal equidistant, angles in radians
    RadarCentered { lat0: f64, lon0: f64 },
}

/// A parsed projection
#[derive(Clone)]
pub struct Projection {
    kind: Arc<Kind>,
    definition: String,
}

impl Projection {
    /// Parse a PROJ string such as `+proj=stere +lat_0=90 +lon_0=10 +lat_ts=60`.
    pub fn from_proj_str(def: &str) -> Result<Self, GridError> {
        let bad = |reason: String| GridError::BadProjection { def: def.to_string(), reason };
        let name = proj_name(def).ok_or_else(|| bad("no +proj given".to_string()))?;

        let target = proj4rs::Proj::from_proj_string(def).map_err(|e| bad(e.to_string()))?;
        let geographic = proj4rs::Proj::from_proj_string(GEOGRAPHIC_DEF).map_err(|e| bad(e.to_string()))?;
        let latlong = matches!(name, "longlat" | "latlong" | "lonlat" | "latlon");

        Ok(Self {
            kind: Arc::new(Kind::Proj { geographic, target, latlong }),
            definition: def.trim().to_string(),
        })
    }

    /// Azimuthal equidistant projection centered on `center`, used for polar volumes
    pub fn azimuthal_equidistant(center: LonLat) -> Self {
        Self {
            kind: Arc::new(Kind::RadarCentered { lat0: center.lat.to_radians(), lon0: center.lon.to_radians() }),
            definition: format!("+proj=aeqd +lat_0={} +lon_0={} +R={EARTH_RADIUS}", center.lat, center.lon),
        }
    }

    /// The PROJ string this projection was built from
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn is_geographic(&self) -> bool {
        matches!(*self.kind, Kind::Proj { latlong: true, .. })
    }

    /// Project a geographic point. Points the projection cannot represent
    /// come back non-finite.
    pub fn forward(&self, p: LonLat) -> WorldXY {
        match &*self.kind {
            Kind::Proj { geographic, target, latlong } => {
                let mut pt = (p.lon.to_radians(), p.lat.to_radians(), 0.0);
                match proj4rs::transform::transform(geographic, target, &mut pt) {
                    Ok(()) if *latlong => WorldXY::new(pt.0.to_degrees(), pt.1.to_degrees()),
                    Ok(()) => WorldXY::new(pt.0, pt.1),
                    Err(_) => WorldXY::new(f64::NAN, f64::NAN),
                }
            },
            Kind::RadarCentered { lat0, lon0 } => {
                let (phi, dlam) = (p.lat.to_radians(), wrap_pi(p.lon.to_radians() - lon0));
                let cos_c = (lat0.sin() * phi.sin() + lat0.cos() * phi.cos() * dlam.cos()).clamp(-1.0, 1.0);
                let c = cos_c.acos();
                let kp = if c.abs() < 1e-12 { 1.0 } else { c / c.sin() };
                WorldXY::new(
                    EARTH_RADIUS * kp * phi.cos() * dlam.sin(),
                    EARTH_RADIUS * kp * (lat0.cos() * phi.sin() - lat0.sin() * phi.cos() * dlam.cos()),
                )
            },
        }
    }

    /// Inverse of [`Projection::forward`]
    pub fn inverse(&self, xy: WorldXY) -> LonLat {
        match &*self.kind {
            Kind::Proj { geographic, target, latlong } => {
                let mut pt = if *latlong { (xy.x.to_radians(), xy.y.to_radians(), 0.0) } else { (xy.x, xy.y, 0.0) };
                match proj4rs::transform::transform(target, geographic, &mut pt) {
                    Ok(()) => LonLat::new(pt.0.to_degrees(), pt.1.to_degrees()),
                    Err(_) => LonLat::new(f64::NAN, f64::NAN),
                }
            },
            Kind::RadarCentered { lat0, lon0 } => {
                let (x, y) = (xy.x, xy.y);
                let rho = x.hypot(y);
                if rho < 1e-9 {
                    return LonLat::new(lon0.to_degrees(), lat0.to_degrees());
                }
                let c = rho / EARTH_RADIUS;
                let phi = (c.cos() * lat0.sin() + y * c.sin() * lat0.cos() / rho).clamp(-1.0, 1.0).asin();
                let lam = lon0 + (x * c.sin()).atan2(rho * lat0.cos() * c.cos() - y * lat0.sin() * c.sin());
                LonLat::new(wrap_pi(lam).to_degrees(), phi.to_degrees())
            },
        }
    }
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

impl Debug for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Projection").field(&self.definition).finish()
    }
}

impl Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition)
    }
}

/// The value of `+proj` in a PROJ string
fn proj_name(def: &str) -> Option<&str> {
    def.split_whitespace()
        .filter_map(|token| token.trim_start_matches('+').strip_prefix("proj="))
        .next()
        .filter(|name| !name.is_empty())
}

fn wrap_pi(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case("+proj=stere +lat_0=90 +lon_0=10 +lat_ts=60 +ellps=WGS84")]
    #[case("+proj=stere +lat_0=52 +lon_0=5 +k=0.9999 +R=6371220")]
    #[case("+proj=laea +lat_0=55 +lon_0=10 +x_0=1950000 +y_0=-2100000 +ellps=WGS84")]
    #[case("+proj=merc +lon_0=0 +lat_ts=45")]
    #[case("+proj=lcc +lat_0=50 +lon_0=10 +lat_1=45 +lat_2=55")]
    #[case("+proj=somerc +lat_0=46.9524055555556 +lon_0=7.43958333333333 +k_0=1 +x_0=600000 +y_0=200000 +ellps=bessel")]
    #[case("+proj=longlat +R=6371000")]
    fn test_round_trip(#[case] def: &str) {
        let proj = Projection::from_proj_str(def).unwrap();
        for (lon, lat) in [(10.0, 60.0), (24.5, 55.25), (-3.0, 45.0), (15.0, 40.0)] {
            let xy = proj.forward(LonLat::new(lon, lat));
            assert!(xy.is_finite(), "{def} gave non-finite coordinates for {lon}, {lat}");
            let back = proj.inverse(xy);
            assert_abs_diff_eq!(back.lon, lon, epsilon = 1e-6);
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_transverse_mercator() {
        let proj = Projection::from_proj_str("+proj=tmerc +lat_0=0 +lon_0=27 +k=0.9996 +x_0=500000 +ellps=GRS80").unwrap();
        let center = proj.forward(LonLat::new(27.0, 60.0));
        assert_abs_diff_eq!(center.x, 500_000.0, epsilon = 1e-3);
        let back = proj.inverse(proj.forward(LonLat::new(25.5, 61.0)));
        assert_abs_diff_eq!(back.lon, 25.5, epsilon = 1e-6);
        assert_abs_diff_eq!(back.lat, 61.0, epsilon = 1e-6);
    }

    #[test]
    fn test_false_easting_and_northing() {
        let plain = Projection::from_proj_str("+proj=laea +lat_0=55 +lon_0=10 +ellps=WGS84").unwrap();
        let shifted = Projection::from_proj_str("+proj=laea +lat_0=55 +lon_0=10 +x_0=1000 +y_0=-2000 +ellps=WGS84").unwrap();
        let p = LonLat::new(20.0, 60.0);
        let (a, b) = (plain.forward(p), shifted.forward(p));
        assert_abs_diff_eq!(b.x - a.x, 1000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.y - a.y, -2000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_geographic_world_units_are_degrees() {
        let proj = Projection::from_proj_str("+proj=longlat +ellps=WGS84").unwrap();
        assert!(proj.is_geographic());
        let xy = proj.forward(LonLat::new(20.5, 60.25));
        assert_abs_diff_eq!(xy.x, 20.5, epsilon = 1e-9);
        assert_abs_diff_eq!(xy.y, 60.25, epsilon = 1e-9);
    }

    #[test]
    fn test_aeqd_distances() {
        let proj = Projection::azimuthal_equidistant(LonLat::new(25.0, 60.0));
        assert!(!proj.is_geographic());
        let origin = proj.forward(LonLat::new(25.0, 60.0));
        assert_abs_diff_eq!(origin.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(origin.y, 0.0, epsilon = 1e-6);

        // One degree of latitude due north is R * pi / 180 meters
        let north = proj.forward(LonLat::new(25.0, 61.0));
        assert_abs_diff_eq!(north.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(north.y, EARTH_RADIUS * PI / 180.0, epsilon = 1e-3);

        let back = proj.inverse(WorldXY::new(30_000.0, -45_000.0));
        let again = proj.forward(back);
        assert_abs_diff_eq!(again.x, 30_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(again.y, -45_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_stereographic_orientation() {
        let proj = Projection::from_proj_str("+proj=stere +lat_0=90 +lon_0=0 +lat_ts=90 +R=6371220").unwrap();
        let pole = proj.forward(LonLat::new(0.0, 90.0));
        assert_abs_diff_eq!(pole.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pole.y, 0.0, epsilon = 1e-6);
        // Points on the central meridian lie straight "below" the pole
        let p = proj.forward(LonLat::new(0.0, 60.0));
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert!(p.y < 0.0);
    }

    #[rstest]
    #[case("+lat_0=90")]
    #[case("+proj=")]
    #[case("+proj=nonsense +lat_0=0")]
    fn test_bad_definitions(#[case] def: &str) {
        assert!(matches!(Projection::from_proj_str(def), Err(GridError::BadProjection { .. })));
    }
}
