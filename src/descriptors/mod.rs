//! The four axes of the destination grid, built from the file's metadata
//! before any data is copied.
//!
//! Each submodule has a `build` function that reads what it needs through an
//! [`Inventory`]. [`Descriptors::build`] runs all four and fails as soon as
//! one of them does.
use log::info;

use crate::error::AttributeError;
use crate::grid::{Grid, GridError};
use crate::inventory::{Inventory, InventoryError, ObjectKind};
use crate::parameters::MappingError;

pub mod level;
pub mod param;
pub mod place;
pub mod time;

pub use level::{Level, LevelDescriptor};
pub use param::ParamDescriptor;
pub use time::{TimeDescriptor, TimeError};

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("A mixture of level and non-level products is not supported")]
    MixedLevelProducts,
    #[error("Datasets with different level products ({first} and {other}) are not supported")]
    InconsistentLevelProducts { first: String, other: String },
    #[error("{kind} ({what}) data is not supported")]
    UnsupportedObject { kind: ObjectKind, what: &'static str },
}

impl DescriptorError {
    pub(crate) fn unsupported(kind: ObjectKind) -> Self {
        let what = match kind {
            ObjectKind::PolarVolume => "polar volume",
            ObjectKind::CartesianVolume => "cartesian volume",
            ObjectKind::Scan => "polar scan",
            ObjectKind::Ray => "single polar ray",
            ObjectKind::Azimuthal => "azimuthal object",
            ObjectKind::Image => "2-D cartesian image",
            ObjectKind::Composite => "cartesian composite image",
            ObjectKind::CrossSection => "2-D vertical cross section",
            ObjectKind::VerticalProfile => "1-D vertical profile",
            ObjectKind::Picture => "embedded graphical image",
        };
        Self::UnsupportedObject { kind, what }
    }
}

/// All four axes of the destination grid
#[derive(Debug, Clone)]
pub struct Descriptors {
    pub time: TimeDescriptor,
    pub params: ParamDescriptor,
    pub levels: LevelDescriptor,
    pub place: Grid,
}

impl Descriptors {
    pub fn build(inventory: &Inventory) -> Result<Self, DescriptorError> {
        let kind = inventory.object_kind()?;

        let time = time::build(inventory)?;
        let params = param::build(inventory)?;
        let levels = level::build(inventory, kind)?;
        let place = place::build(inventory, kind)?;

        info!(
            "Built descriptors for {kind}: {} parameter(s), {} time(s), {} level(s), {} x {} grid",
            params.len(), time.len(), levels.len(), place.nx(), place.ny()
        );
        Ok(Self { time, params, levels, place })
    }
}
