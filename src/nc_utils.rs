use netcdf::{types::{FloatType, IntType, NcVariableType}, AttributeValue, Extents};

use crate::store::AttrValue;

/// Read any integer or floating point netCDF variable as a flat vector of `i64`.
///
/// ODIM data arrays are usually 8 or 16 bit unsigned integers, but some
/// producers write signed or wider types, so this dispatches on the stored
/// type rather than relying on the library's conversion. Floating point
/// values are truncated toward zero.
///
/// # Errors
/// Returns an error for types that cannot hold raw radar counts (strings,
/// compound, opaque, enum and variable length types), or if the read fails.
pub fn read_as_i64(var: &netcdf::Variable) -> Result<Vec<i64>, String> {
    macro_rules! widen {
        ($t:ty) => {
            var.get::<$t, _>(Extents::All)
                .map(|arr| arr.iter().map(|&v| v as i64).collect())
                .map_err(|e| e.to_string())
        };
    }

    match var.vartype() {
        NcVariableType::Int(IntType::I8) => widen!(i8),
        NcVariableType::Int(IntType::I16) => widen!(i16),
        NcVariableType::Int(IntType::I32) => widen!(i32),
        NcVariableType::Int(IntType::I64) => widen!(i64),
        NcVariableType::Int(IntType::U8) => widen!(u8),
        NcVariableType::Int(IntType::U16) => widen!(u16),
        NcVariableType::Int(IntType::U32) => widen!(u32),
        NcVariableType::Int(IntType::U64) => widen!(u64),
        NcVariableType::Float(FloatType::F32) => widen!(f32),
        NcVariableType::Float(FloatType::F64) => widen!(f64),
        NcVariableType::Char => widen!(u8),
        other => Err(format!("variables of type {other:?} cannot be read as numeric arrays")),
    }
}

/// Convert an attribute value read by the netCDF library into an [`AttrValue`].
///
/// Fixed length HDF5 strings come back with their NUL padding, which is stripped.
/// Single element arrays are kept as arrays; the typed readers accept those
/// as scalars.
pub fn attr_value_from_nc(value: AttributeValue) -> Result<AttrValue, String> {
    let v = match value {
        AttributeValue::Uchar(v) => AttrValue::Int(v as i64),
        AttributeValue::Schar(v) => AttrValue::Int(v as i64),
        AttributeValue::Ushort(v) => AttrValue::Int(v as i64),
        AttributeValue::Short(v) => AttrValue::Int(v as i64),
        AttributeValue::Uint(v) => AttrValue::Int(v as i64),
        AttributeValue::Int(v) => AttrValue::Int(v as i64),
        AttributeValue::Ulonglong(v) => AttrValue::Int(
            i64::try_from(v).map_err(|_| format!("unsigned value {v} does not fit in an i64"))?
        ),
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Float(v) => AttrValue::Float(v as f64),
        AttributeValue::Double(v) => AttrValue::Float(v),
        AttributeValue::Str(s) => AttrValue::Str(s.trim_end_matches('\0').to_string()),
        AttributeValue::Uchars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Schars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ushorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Shorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Uints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Longlongs(v) => AttrValue::Ints(v),
        AttributeValue::Floats(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
        AttributeValue::Doubles(v) => AttrValue::Floats(v),
        AttributeValue::Strs(mut v) if v.len() == 1 => {
            AttrValue::Str(v.remove(0).trim_end_matches('\0').to_string())
        },
        other => return Err(format!("unsupported attribute value {other:?}")),
    };
    Ok(v)
}
