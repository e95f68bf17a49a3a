//! An in-memory [`AttributeStore`].
//!
//! Used by the tests and for JSON dumps of ODIM files. The JSON layout is
//!
//! ```json
//! {
//!   "groups": { "/what": { "object": "COMP", "date": "20240517" } },
//!   "arrays": { "/dataset1/data1/data": [1, 2, 3, 4] }
//! }
//! ```
//!
//! Groups only need to be listed if they carry attributes: every ancestor of
//! a listed group or array is created implicitly.
use std::{collections::BTreeMap, io::Read, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{AttrValue, AttributeStore};
use crate::error::StoreError;
use crate::utils::{leaf_name, normalize_path, parent_path};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    groups: BTreeMap<String, IndexMap<String, AttrValue>>,
    #[serde(default)]
    arrays: BTreeMap<String, Vec<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut me = Self::default();
        me.add_group("/");
        me
    }

    /// Load a store from a JSON document, normalizing the paths it contains.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let raw: Self = serde_json::from_reader(reader)
            .map_err(|e| StoreError::read_failed("JSON input", e))?;
        Ok(raw.normalized())
    }

    pub fn from_json_str(s: &str) -> Result<Self, StoreError> {
        let raw: Self = serde_json::from_str(s)
            .map_err(|e| StoreError::read_failed("JSON input", e))?;
        Ok(raw.normalized())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let f = std::fs::File::open(path)
            .map_err(|e| StoreError::CouldNotOpen { path: path.display().to_string(), reason: e.to_string() })?;
        Self::from_json_reader(std::io::BufReader::new(f))
    }

    fn normalized(self) -> Self {
        let mut out = Self::new();
        for (path, attrs) in self.groups {
            for (name, value) in attrs {
                out.set_attr(&path, &name, value);
            }
            out.add_group(&path);
        }
        for (path, values) in self.arrays {
            out.set_array(&path, values);
        }
        out
    }

    /// Create group `path` and all of its ancestors
    pub fn add_group(&mut self, path: &str) {
        let mut current = Some(normalize_path(path));
        while let Some(p) = current {
            current = parent_path(&p);
            self.groups.entry(p).or_default();
        }
    }

    pub fn set_attr<V: Into<AttrValue>>(&mut self, path: &str, name: &str, value: V) {
        let path = normalize_path(path);
        self.add_group(&path);
        if let Some(attrs) = self.groups.get_mut(&path) {
            attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn set_array(&mut self, path: &str, values: Vec<i64>) {
        let path = normalize_path(path);
        if let Some(parent) = parent_path(&path) {
            self.add_group(&parent);
        }
        self.arrays.insert(path, values);
    }

    pub fn with_attr<V: Into<AttrValue>>(mut self, path: &str, name: &str, value: V) -> Self {
        self.set_attr(path, name, value);
        self
    }

    pub fn with_group(mut self, path: &str) -> Self {
        self.add_group(path);
        self
    }

    pub fn with_array(mut self, path: &str, values: Vec<i64>) -> Self {
        self.set_array(path, values);
        self
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl AttributeStore for MemoryStore {
    fn probe_attribute(&self, path: &str, name: &str) -> bool {
        self.groups
            .get(&normalize_path(path))
            .map(|attrs| attrs.contains_key(name))
            .unwrap_or(false)
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<AttrValue, StoreError> {
        let path = normalize_path(path);
        let attrs = self.groups.get(&path)
            .ok_or_else(|| StoreError::NoSuchGroup(path.clone()))?;
        attrs.get(name)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchAttribute { path, name: name.to_string() })
    }

    fn probe_group(&self, path: &str) -> bool {
        self.groups.contains_key(&normalize_path(path))
    }

    fn list_child_groups(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let path = normalize_path(path);
        if !self.groups.contains_key(&path) {
            return Err(StoreError::NoSuchGroup(path));
        }

        let children = self.groups.keys()
            .filter(|k| parent_path(k).as_deref() == Some(path.as_str()))
            .map(|k| leaf_name(k).to_string())
            .collect();
        Ok(children)
    }

    fn attribute_names(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let path = normalize_path(path);
        let attrs = self.groups.get(&path)
            .ok_or_else(|| StoreError::NoSuchGroup(path.clone()))?;
        Ok(attrs.keys().cloned().collect())
    }

    fn read_numeric_array(&self, path: &str) -> Result<Vec<i64>, StoreError> {
        let path = normalize_path(path);
        self.arrays.get(&path)
            .cloned()
            .ok_or(StoreError::NoSuchArray(path))
    }
}
