//! Access to the hierarchical source file.
//!
//! The conversion never talks to HDF5 directly; it goes through the
//! [`AttributeStore`] trait, which exposes exactly the five queries the
//! conversion needs (probe/read an attribute, probe/list a group, read a
//! numeric array). [`MemoryStore`] keeps everything in memory and can be
//! loaded from a JSON dump; `NcStore` (feature `netcdf`) reads real ODIM
//! HDF5 files through the netCDF-4 library.
use std::fmt::Display;

use num_traits::NumCast;
use serde::{Deserialize, Serialize};

use crate::error::{AttributeError, StoreError};

pub mod memory;
#[cfg(feature = "netcdf")]
pub mod nc;

pub use memory::MemoryStore;
#[cfg(feature = "netcdf")]
pub use nc::NcStore;

/// Read-only view of a hierarchical file of named groups, attributes and
/// numeric arrays. All paths are slash separated group paths, e.g.
/// `/dataset1/data1/what`.
pub trait AttributeStore {
    /// `true` if attribute `name` exists directly in group `path`
    fn probe_attribute(&self, path: &str, name: &str) -> bool;

    /// Read attribute `name` of group `path`
    fn read_attribute(&self, path: &str, name: &str) -> Result<AttrValue, StoreError>;

    /// `true` if the group `path` exists
    fn probe_group(&self, path: &str) -> bool;

    /// Names (not full paths) of the groups directly below `path`, in a stable order
    fn list_child_groups(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Names of all attributes directly in group `path`
    fn attribute_names(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Read the numeric array at `path` (e.g. `/dataset1/data1/data`), flattened in row-major order
    fn read_numeric_array(&self, path: &str) -> Result<Vec<i64>, StoreError>;
}

/// A raw attribute value as stored in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl AttrValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "integer",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "string",
            AttrValue::Ints(_) => "integer array",
            AttrValue::Floats(_) => "float array",
        }
    }

    /// Number of elements; scalars and strings count as one
    pub fn len(&self) -> usize {
        match self {
            AttrValue::Ints(v) => v.len(),
            AttrValue::Floats(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Str(v) => write!(f, "{v}"),
            AttrValue::Ints(v) => write!(f, "{v:?}"),
            AttrValue::Floats(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(value: Vec<i64>) -> Self {
        Self::Ints(value)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Floats(value)
    }
}

/// Types that a single attribute value can be read as.
///
/// Numeric attributes convert freely between integer and floating point
/// (as HDF5's native conversion does), except that a float with a fractional
/// part is never read as an integer. Strings only read as strings, and a
/// numeric array only reads as a scalar when it has exactly one element.
pub trait FromAttr: Sized {
    const EXPECTED: &'static str;

    fn from_attr(path: &str, name: &str, value: AttrValue) -> Result<Self, AttributeError>;
}

enum Scalar {
    Int(i64),
    Float(f64),
}

fn scalar_number(path: &str, name: &str, value: AttrValue, expected: &'static str) -> Result<Scalar, AttributeError> {
    let count_err = |count| AttributeError::WrongCount { path: path.to_string(), name: name.to_string(), count };
    match value {
        AttrValue::Int(v) => Ok(Scalar::Int(v)),
        AttrValue::Float(v) => Ok(Scalar::Float(v)),
        AttrValue::Ints(v) if v.len() == 1 => Ok(Scalar::Int(v[0])),
        AttrValue::Floats(v) if v.len() == 1 => Ok(Scalar::Float(v[0])),
        AttrValue::Ints(v) => Err(count_err(v.len())),
        AttrValue::Floats(v) => Err(count_err(v.len())),
        AttrValue::Str(_) => Err(AttributeError::WrongType {
            path: path.to_string(),
            name: name.to_string(),
            expected,
            actual: "string",
        }),
    }
}

macro_rules! impl_from_attr_numeric {
    ($integral:literal; $($t:ty),+) => {
        $(
            impl FromAttr for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn from_attr(path: &str, name: &str, value: AttrValue) -> Result<Self, AttributeError> {
                    let (converted, shown) = match scalar_number(path, name, value, Self::EXPECTED)? {
                        Scalar::Int(v) => (<$t as NumCast>::from(v), v.to_string()),
                        // An integer target only takes floats with no fractional part
                        Scalar::Float(v) if $integral && v.fract() != 0.0 => {
                            return Err(AttributeError::WrongType {
                                path: path.to_string(),
                                name: name.to_string(),
                                expected: Self::EXPECTED,
                                actual: "fractional float",
                            });
                        }
                        Scalar::Float(v) => (<$t as NumCast>::from(v), v.to_string()),
                    };
                    converted.ok_or_else(|| AttributeError::OutOfRange {
                        path: path.to_string(),
                        name: name.to_string(),
                        value: shown,
                        target: Self::EXPECTED,
                    })
                }
            }
        )+
    };
}

impl_from_attr_numeric!(false; f64, f32);
impl_from_attr_numeric!(true; i64, i32, u32, usize);

impl FromAttr for String {
    const EXPECTED: &'static str = "string";

    fn from_attr(path: &str, name: &str, value: AttrValue) -> Result<Self, AttributeError> {
        if let AttrValue::Str(s) = value {
            Ok(s)
        } else {
            Err(AttributeError::WrongType {
                path: path.to_string(),
                name: name.to_string(),
                expected: Self::EXPECTED,
                actual: value.kind_name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(f64::from_attr("/where", "xsize", AttrValue::Int(4)).unwrap(), 4.0);
        assert_eq!(i64::from_attr("/where", "nbins", AttrValue::Float(250.0)).unwrap(), 250);
        assert_eq!(f64::from_attr("/where", "gain", AttrValue::Floats(vec![0.5])).unwrap(), 0.5);
    }

    #[test]
    fn test_fractional_float_is_not_an_integer() {
        let err = usize::from_attr("/dataset1/where", "nbins", AttrValue::Float(359.7)).unwrap_err();
        assert!(matches!(err, AttributeError::WrongType { expected: "usize", actual: "fractional float", .. }));
        assert_eq!(
            err.to_string(),
            "Attribute /dataset1/where/nbins holds a fractional float value, expected usize"
        );
        assert!(i64::from_attr("/where", "xsize", AttrValue::Floats(vec![-2.5])).is_err());
        assert_eq!(usize::from_attr("/dataset1/where", "nbins", AttrValue::Float(360.0)).unwrap(), 360);
        assert_eq!(f32::from_attr("/what", "gain", AttrValue::Float(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn test_wrong_count() {
        let err = f64::from_attr("/where", "gain", AttrValue::Floats(vec![0.5, 1.0])).unwrap_err();
        assert!(matches!(err, AttributeError::WrongCount { count: 2, .. }));
        assert_eq!(err.to_string(), "Element /where/gain is not of size 1, but 2");
    }

    #[test]
    fn test_wrong_type() {
        let err = f64::from_attr("/what", "product", AttrValue::from("COMP")).unwrap_err();
        assert!(matches!(err, AttributeError::WrongType { actual: "string", .. }));
        let err = String::from_attr("/what", "object", AttrValue::Int(1)).unwrap_err();
        assert!(matches!(err, AttributeError::WrongType { actual: "integer", .. }));
    }

    #[test]
    fn test_out_of_range() {
        let err = usize::from_attr("/dataset1/where", "nbins", AttrValue::Int(-3)).unwrap_err();
        assert!(matches!(err, AttributeError::OutOfRange { .. }));
    }

    #[test]
    fn test_untagged_json() {
        let v: AttrValue = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(v, AttrValue::Floats(vec![1.0, 2.5]));
        let v: AttrValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, AttrValue::Ints(vec![1, 2]));
        let v: AttrValue = serde_json::from_str("\"PVOL\"").unwrap();
        assert_eq!(v, AttrValue::from("PVOL"));
    }
}
