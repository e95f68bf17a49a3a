use itertools::Itertools;
use serde::Serialize;

use crate::attributes::get_value;
use crate::inventory::{Inventory, ObjectKind};
use crate::parameters::{LevelType, Product};
use crate::utils::join_path;

use super::DescriptorError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub level_type: LevelType,
    pub name: String,
    pub value: f64,
}

impl Level {
    /// The single level of data that has no vertical coordinate
    pub fn trivial() -> Self {
        Self { level_type: LevelType::Any, name: String::new(), value: 0.0 }
    }
}

/// The vertical axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDescriptor {
    levels: Vec<Level>,
}

impl LevelDescriptor {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn index_of(&self, level_type: LevelType, value: f64) -> Option<usize> {
        self.levels.iter().position(|l| l.level_type == level_type && l.value == value)
    }
}

pub fn build(inventory: &Inventory, kind: ObjectKind) -> Result<LevelDescriptor, DescriptorError> {
    match kind {
        ObjectKind::Composite | ObjectKind::CartesianVolume | ObjectKind::Scan | ObjectKind::Image => {
            product_levels(inventory)
        },
        ObjectKind::PolarVolume => elevation_levels(inventory),
        ObjectKind::Ray | ObjectKind::Azimuthal | ObjectKind::CrossSection
            | ObjectKind::VerticalProfile | ObjectKind::Picture => Err(DescriptorError::unsupported(kind)),
    }
}

/// Levels from the `prodpar` of level-bearing products (CAPPI heights, PPI angles, ...).
fn product_levels(inventory: &Inventory) -> Result<LevelDescriptor, DescriptorError> {
    let store = inventory.store();

    let mut level_product: Option<(Product, String)> = None;
    let mut has_non_level = false;
    for i in inventory.datasets() {
        let name: String = get_value(store, &join_path(&inventory.dataset_path(i), "what"), "product")?;
        if let Some(p) = Product::parse(&name).filter(|p| p.is_level_bearing()) {
            if let Some((first, first_name)) = &level_product {
                if *first != p {
                    return Err(DescriptorError::InconsistentLevelProducts { first: first_name.clone(), other: name });
                }
            } else {
                level_product = Some((p, name));
            }
        } else {
            has_non_level = true;
        }

        if has_non_level && level_product.is_some() {
            return Err(DescriptorError::MixedLevelProducts);
        }
    }

    let Some((product, name)) = level_product else {
        return Ok(LevelDescriptor::new(vec![Level::trivial()]));
    };

    let mut values = vec![];
    for i in inventory.datasets() {
        let v: f64 = get_value(store, &join_path(&inventory.dataset_path(i), "what"), "prodpar")?;
        values.push(v);
    }

    let levels = values.into_iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .map(|value| Level { level_type: product.level_type(), name: name.trim().to_string(), value })
        .collect();
    Ok(LevelDescriptor::new(levels))
}

/// One level per distinct elevation angle of a polar volume
fn elevation_levels(inventory: &Inventory) -> Result<LevelDescriptor, DescriptorError> {
    let store = inventory.store();

    let mut angles = vec![];
    for i in inventory.datasets() {
        let v: f64 = get_value(store, &join_path(&inventory.dataset_path(i), "where"), "elangle")?;
        angles.push(v);
    }

    let levels = angles.into_iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .map(|value| Level { level_type: LevelType::None, name: format!("Elevation angle {value}"), value })
        .collect();
    Ok(LevelDescriptor::new(levels))
}
