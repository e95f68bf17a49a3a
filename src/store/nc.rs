//! [`AttributeStore`] backed by the netCDF library.
//!
//! netCDF-4 files are HDF5 files, and the netCDF-C library reads plain HDF5
//! groups, attributes and datasets as netCDF groups, attributes and
//! variables. That is enough to read ODIM_H5 files without a separate HDF5
//! binding.
use std::path::{Path, PathBuf};

use log::debug;

use super::{AttrValue, AttributeStore};
use crate::error::StoreError;
use crate::nc_utils::{attr_value_from_nc, read_as_i64};
use crate::utils::{leaf_name, normalize_path, parent_path};

/// An ODIM file opened read-only. The file is closed when this is dropped.
pub struct NcStore {
    file: netcdf::File,
    path: PathBuf,
}

impl NcStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = netcdf::open(path)
            .map_err(|e| StoreError::CouldNotOpen { path: path.display().to_string(), reason: e.to_string() })?;
        debug!("Opened {} for reading", path.display());
        Ok(Self { file, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn group(&self, path: &str) -> Result<netcdf::Group<'_>, StoreError> {
        let path = normalize_path(path);
        let grp = if path == "/" {
            self.file.root()
        } else {
            self.file.group(path.trim_start_matches('/'))
                .map_err(|e| StoreError::read_failed(&path, e))?
        };
        grp.ok_or(StoreError::NoSuchGroup(path))
    }
}

impl AttributeStore for NcStore {
    fn probe_attribute(&self, path: &str, name: &str) -> bool {
        self.group(path)
            .map(|g| g.attribute(name).is_some())
            .unwrap_or(false)
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<AttrValue, StoreError> {
        let grp = self.group(path)?;
        let attr = grp.attribute(name)
            .ok_or_else(|| StoreError::NoSuchAttribute { path: normalize_path(path), name: name.to_string() })?;
        let value = attr.value()
            .map_err(|e| StoreError::read_failed(format!("{path}/{name}"), e))?;
        attr_value_from_nc(value)
            .map_err(|e| StoreError::read_failed(format!("{path}/{name}"), e))
    }

    fn probe_group(&self, path: &str) -> bool {
        self.group(path).is_ok()
    }

    fn list_child_groups(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let grp = self.group(path)?;
        let mut names: Vec<String> = grp.groups().map(|g| g.name()).collect();
        names.sort();
        Ok(names)
    }

    fn attribute_names(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let grp = self.group(path)?;
        Ok(grp.attributes().map(|a| a.name().to_string()).collect())
    }

    fn read_numeric_array(&self, path: &str) -> Result<Vec<i64>, StoreError> {
        let path = normalize_path(path);
        let parent = parent_path(&path).unwrap_or_else(|| "/".to_string());
        let grp = self.group(&parent)?;
        let var = grp.variable(leaf_name(&path))
            .ok_or_else(|| StoreError::NoSuchArray(path.clone()))?;
        read_as_i64(&var).map_err(|e| StoreError::read_failed(&path, e))
    }
}
