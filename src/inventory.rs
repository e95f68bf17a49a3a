//! Structure of an ODIM file: how many datasets, how many data entries
//! in each, and what kind of object the file holds.
use std::collections::HashSet;
use std::str::FromStr;

use log::debug;

use crate::attributes::get_value;
use crate::error::AttributeError;
use crate::store::AttributeStore;

/// The `/what.object` kinds defined by the ODIM_H5 information model
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::IntoStaticStr)]
pub enum ObjectKind {
    /// Polar volume
    #[strum(serialize = "PVOL")]
    PolarVolume,
    /// Cartesian volume
    #[strum(serialize = "CVOL")]
    CartesianVolume,
    /// Polar scan
    #[strum(serialize = "SCAN")]
    Scan,
    /// Single polar ray
    #[strum(serialize = "RAY")]
    Ray,
    /// Azimuthal object
    #[strum(serialize = "AZIM")]
    Azimuthal,
    /// 2-D cartesian image
    #[strum(serialize = "IMAGE")]
    Image,
    /// Cartesian composite image(s)
    #[strum(serialize = "COMP")]
    Composite,
    /// 2-D vertical cross section(s)
    #[strum(serialize = "XSEC")]
    CrossSection,
    /// 1-D vertical profile
    #[strum(serialize = "VP")]
    VerticalProfile,
    /// Embedded graphical image
    #[strum(serialize = "PIC")]
    Picture,
}

/// Errors in the overall layout of the file
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Opera HDF5 radar data is required to contain a {0} group")]
    MissingGroup(String),
    #[error("Opera HDF5 radar data is required to contain the {path}.{name} attribute")]
    MissingAttribute { path: String, name: String },
    #[error("Unknown data object: '{0}' is not listed in the OPERA specification")]
    UnknownObject(String),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Counts and addresses of the datasets in one file.
///
/// Datasets are the top level groups `<prefix>1`, `<prefix>2`, ... and data
/// entries the groups `data1`, `data2`, ... inside a dataset. Only the
/// contiguous run starting at 1 counts: with `dataset1`, `dataset2` and
/// `dataset4` present there are two datasets.
pub struct Inventory<'s> {
    store: &'s dyn AttributeStore,
    prefix: String,
}

impl<'s> Inventory<'s> {
    pub fn new(store: &'s dyn AttributeStore, prefix: &str) -> Self {
        Self { store, prefix: prefix.to_string() }
    }

    pub fn store(&self) -> &'s dyn AttributeStore {
        self.store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check the required top level metadata before any other work.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if !self.store.probe_group("/what") {
            return Err(InventoryError::MissingGroup("what".to_string()));
        }

        for name in ["date", "time"] {
            if !self.store.probe_attribute("/what", name) {
                return Err(InventoryError::MissingAttribute { path: "/what".to_string(), name: name.to_string() });
            }
        }

        let first = format!("{}1", self.prefix);
        if !self.store.probe_group(&format!("/{first}")) {
            return Err(InventoryError::MissingGroup(first));
        }

        if !self.store.probe_group("/where") {
            return Err(InventoryError::MissingGroup("where".to_string()));
        }

        Ok(())
    }

    pub fn object_kind(&self) -> Result<ObjectKind, InventoryError> {
        let object: String = get_value(self.store, "/what", "object")?;
        ObjectKind::from_str(object.trim())
            .map_err(|_| InventoryError::UnknownObject(object))
    }

    pub fn count_datasets(&self) -> usize {
        let names = self.store.list_child_groups("/").unwrap_or_default();
        let n = contiguous_count(&names, &self.prefix);
        debug!("Found {n} {}N groups", self.prefix);
        n
    }

    /// Number of `dataM` entries in dataset `index`; 0 if the dataset
    /// group does not exist or has no children.
    pub fn count_data(&self, index: usize) -> usize {
        let names = self.store.list_child_groups(&self.dataset_path(index)).unwrap_or_default();
        contiguous_count(&names, "data")
    }

    pub fn dataset_path(&self, index: usize) -> String {
        format!("/{}{index}", self.prefix)
    }

    pub fn data_path(&self, index: usize, data_index: usize) -> String {
        format!("/{}{index}/data{data_index}", self.prefix)
    }

    /// Dataset ordinals, starting at 1
    pub fn datasets(&self) -> impl Iterator<Item = usize> {
        1..=self.count_datasets()
    }
}

fn contiguous_count(names: &[String], prefix: &str) -> usize {
    let names: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();
    (1..)
        .take_while(|i| names.contains(format!("{prefix}{i}").as_str()))
        .count()
}
