//! Mapping of ODIM `(product, quantity)` pairs onto the closed set of
//! parameters the grid data model knows.
//!
//! The mapping is a static table, [`CATALOG`], rather than a tree of
//! conditionals, so that it can be checked for completeness in tests. The
//! one entry that needs more than the product and quantity (composite
//! probabilities, which depend on `threshold_id`) is marked with
//! [`Mapping::ByThresholdId`].
use std::str::FromStr;

use serde::Serialize;

use crate::error::AttributeError;

/// Canonical parameters. The discriminant is the stable numeric identifier,
/// and the parameter axis is ordered by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum::Display, strum::EnumIter, strum::IntoStaticStr)]
pub enum Parameter {
    Reflectivity = 1,
    CorrectedReflectivity = 2,
    RadialVelocity = 3,
    SpectralWidth = 4,
    DifferentialReflectivity = 5,
    SpecificDifferentialPhase = 6,
    DifferentialPhase = 7,
    SignalQualityIndex = 8,
    ReflectivityCorrelation = 9,
    EchoTop = 10,
    PrecipitationAmount = 11,
    PrecipitationRate = 12,
    RadarBorder = 13,
    ProbabilityOfPrecipitation = 20,
    ProbabilityOfPrecipitationLimit1 = 21,
    ProbabilityOfPrecipitationLimit2 = 22,
    ProbabilityOfPrecipitationLimit3 = 23,
    ProbabilityOfPrecipitationLimit4 = 24,
    ProbabilityOfPrecipitationLimit5 = 25,
    ProbabilityOfPrecipitationLimit6 = 26,
    ProbabilityOfPrecipitationLimit7 = 27,
    ProbabilityOfPrecipitationLimit8 = 28,
    ProbabilityOfPrecipitationLimit9 = 29,
    ProbabilityOfPrecipitationLimit10 = 30,
}

impl Parameter {
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// The `what.product` values of the ODIM_H5 information model
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Product {
    Scan,
    Ppi,
    Cappi,
    Pcappi,
    Etop,
    Max,
    Rr,
    Vil,
    Comp,
    Vp,
    Rhi,
    Xsec,
    Vsp,
    Hsp,
    Ray,
    Azim,
    Qual,
}

/// Kind of vertical coordinate a level-bearing product is defined on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum LevelType {
    /// Height above sea level in meters
    Height,
    /// A level whose value has product specific meaning (elevation angle, threshold, ...)
    Any,
    /// No particular vertical coordinate
    None,
}

impl Product {
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s.trim()).ok()
    }

    /// `true` for products defined on a level given by `prodpar`
    pub fn is_level_bearing(self) -> bool {
        matches!(self, Self::Cappi | Self::Pcappi | Self::Ppi | Self::Etop | Self::Rhi)
    }

    pub fn level_type(self) -> LevelType {
        match self {
            Self::Cappi | Self::Pcappi => LevelType::Height,
            _ => LevelType::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    Fixed(Parameter),
    /// `threshold_id` 0 to 10 selects one of the entries of [`PROBABILITY_BY_THRESHOLD`]
    ByThresholdId,
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub product: Product,
    pub quantity: &'static str,
    pub mapping: Mapping,
}

const fn fixed(product: Product, quantity: &'static str, parameter: Parameter) -> CatalogEntry {
    CatalogEntry { product, quantity, mapping: Mapping::Fixed(parameter) }
}

pub static PROBABILITY_BY_THRESHOLD: [Parameter; 11] = [
    Parameter::ProbabilityOfPrecipitation,
    Parameter::ProbabilityOfPrecipitationLimit1,
    Parameter::ProbabilityOfPrecipitationLimit2,
    Parameter::ProbabilityOfPrecipitationLimit3,
    Parameter::ProbabilityOfPrecipitationLimit4,
    Parameter::ProbabilityOfPrecipitationLimit5,
    Parameter::ProbabilityOfPrecipitationLimit6,
    Parameter::ProbabilityOfPrecipitationLimit7,
    Parameter::ProbabilityOfPrecipitationLimit8,
    Parameter::ProbabilityOfPrecipitationLimit9,
    Parameter::ProbabilityOfPrecipitationLimit10,
];

pub static CATALOG: &[CatalogEntry] = &[
    // Plan position and constant altitude products
    fixed(Product::Ppi, "TH", Parameter::Reflectivity),
    fixed(Product::Ppi, "DBZ", Parameter::Reflectivity),
    fixed(Product::Ppi, "DBZH", Parameter::CorrectedReflectivity),
    fixed(Product::Ppi, "VRAD", Parameter::RadialVelocity),
    fixed(Product::Ppi, "WRAD", Parameter::SpectralWidth),
    fixed(Product::Ppi, "W", Parameter::SpectralWidth),
    fixed(Product::Cappi, "TH", Parameter::Reflectivity),
    fixed(Product::Cappi, "DBZ", Parameter::Reflectivity),
    fixed(Product::Cappi, "DBZH", Parameter::CorrectedReflectivity),
    fixed(Product::Cappi, "VRAD", Parameter::RadialVelocity),
    fixed(Product::Cappi, "WRAD", Parameter::SpectralWidth),
    fixed(Product::Cappi, "W", Parameter::SpectralWidth),
    fixed(Product::Pcappi, "TH", Parameter::Reflectivity),
    fixed(Product::Pcappi, "DBZ", Parameter::Reflectivity),
    fixed(Product::Pcappi, "DBZH", Parameter::CorrectedReflectivity),
    fixed(Product::Pcappi, "VRAD", Parameter::RadialVelocity),
    fixed(Product::Pcappi, "WRAD", Parameter::SpectralWidth),
    fixed(Product::Pcappi, "W", Parameter::SpectralWidth),
    fixed(Product::Etop, "HGHT", Parameter::EchoTop),
    fixed(Product::Max, "TH", Parameter::Reflectivity),
    fixed(Product::Max, "DBZH", Parameter::CorrectedReflectivity),
    // Accumulations
    fixed(Product::Rr, "ACRR", Parameter::PrecipitationAmount),
    fixed(Product::Vil, "ACRR", Parameter::PrecipitationAmount),
    // Polar scans
    fixed(Product::Scan, "TH", Parameter::Reflectivity),
    fixed(Product::Scan, "DBZH", Parameter::CorrectedReflectivity),
    fixed(Product::Scan, "VRAD", Parameter::RadialVelocity),
    fixed(Product::Scan, "WRAD", Parameter::SpectralWidth),
    fixed(Product::Scan, "W", Parameter::SpectralWidth),
    fixed(Product::Scan, "ZDR", Parameter::DifferentialReflectivity),
    fixed(Product::Scan, "KDP", Parameter::SpecificDifferentialPhase),
    fixed(Product::Scan, "PHIDP", Parameter::DifferentialPhase),
    fixed(Product::Scan, "SQI", Parameter::SignalQualityIndex),
    fixed(Product::Scan, "RHOHV", Parameter::ReflectivityCorrelation),
    // Composites
    fixed(Product::Comp, "RATE", Parameter::PrecipitationRate),
    fixed(Product::Comp, "BRDR", Parameter::RadarBorder),
    fixed(Product::Comp, "TH", Parameter::Reflectivity),
    fixed(Product::Comp, "DBZH", Parameter::CorrectedReflectivity),
    CatalogEntry { product: Product::Comp, quantity: "PROB", mapping: Mapping::ByThresholdId },
];

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Unable to handle parameters of type {product} with quantity {quantity}")]
    Unsupported { product: String, quantity: String },
    #[error("Unable to handle parameters of type {product} with quantity {quantity}: threshold_id {threshold} is outside 0-10")]
    ThresholdOutOfRange { product: String, quantity: String, threshold: i64 },
    #[error("Unable to handle parameters of type {product} with quantity {quantity}: {source}")]
    ThresholdUnavailable { product: String, quantity: String, source: AttributeError },
}

/// Look up the catalog entry for a product/quantity pair, if any
pub fn catalog_entry(product: &str, quantity: &str) -> Option<&'static CatalogEntry> {
    let product = Product::parse(product)?;
    let quantity = quantity.trim();
    CATALOG.iter().find(|e| e.product == product && e.quantity == quantity)
}

/// Map an ODIM product and quantity to a canonical parameter.
///
/// `threshold_id` is only called for the threshold dependent entry, so
/// callers can pass a lookup that would fail for every other kind of data.
///
/// # Errors
/// - [`MappingError::Unsupported`] for unknown products or unmapped pairs,
/// - [`MappingError::ThresholdOutOfRange`] for a `threshold_id` outside 0 to 10,
/// - [`MappingError::ThresholdUnavailable`] if the lookup itself fails.
pub fn map_parameter<F>(product: &str, quantity: &str, threshold_id: F) -> Result<Parameter, MappingError>
where F: FnOnce() -> Result<i64, AttributeError>
{
    let entry = catalog_entry(product, quantity)
        .ok_or_else(|| MappingError::Unsupported { product: product.to_string(), quantity: quantity.to_string() })?;

    match entry.mapping {
        Mapping::Fixed(p) => Ok(p),
        Mapping::ByThresholdId => {
            let threshold = threshold_id().map_err(|e| MappingError::ThresholdUnavailable {
                product: product.to_string(),
                quantity: quantity.to_string(),
                source: e,
            })?;
            usize::try_from(threshold).ok()
                .and_then(|i| PROBABILITY_BY_THRESHOLD.get(i).copied())
                .ok_or_else(|| MappingError::ThresholdOutOfRange {
                    product: product.to_string(),
                    quantity: quantity.to_string(),
                    threshold,
                })
        },
    }
}
