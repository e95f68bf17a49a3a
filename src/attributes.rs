//! Typed attribute lookup with ODIM's ancestor fallback.
//!
//! ODIM lets metadata such as `gain` or `product` live at the most specific
//! level that applies: `/dataset1/data1/what`, `/dataset1/what` or `/what`.
//! [`resolve`] searches the `what`/`where`/`how` group of a path and of each
//! of its ancestors in turn and returns the first hit.
use log::trace;

use crate::error::AttributeError;
use crate::store::{AttributeStore, FromAttr};
use crate::utils::{join_path, normalize_path, parent_path};

/// The search order for `path`: itself, its parent, ..., the root.
///
/// A missing leading `/` is added, so `dataset1/data1` gives
/// `["/dataset1/data1", "/dataset1", "/"]`.
pub fn ancestor_paths(path: &str) -> Vec<String> {
    let mut paths = vec![];
    let mut current = Some(normalize_path(path));
    while let Some(p) = current {
        current = parent_path(&p);
        paths.push(p);
    }
    paths
}

/// Find attribute `name` in group `group` under `parent_path` or the
/// nearest ancestor that has it, and read it as `T`.
///
/// # Errors
/// - [`AttributeError::NotFound`] if no candidate group has the attribute,
/// - a type, count or range error if the first match cannot be read as `T`.
pub fn resolve<T: FromAttr>(store: &dyn AttributeStore, parent_path: &str, group: &str, name: &str) -> Result<T, AttributeError> {
    for candidate in ancestor_paths(parent_path) {
        let grp_path = join_path(&candidate, group);
        if store.probe_attribute(&grp_path, name) {
            trace!("Resolved {group}/{name} for {parent_path} at {grp_path}");
            return get_value(store, &grp_path, name);
        }
    }

    Err(AttributeError::NotFound { group: group.to_string(), name: name.to_string() })
}

/// Like [`resolve`], but absence (or any failure to read) gives `None`.
pub fn resolve_optional<T: FromAttr>(store: &dyn AttributeStore, parent_path: &str, group: &str, name: &str) -> Option<T> {
    resolve(store, parent_path, group, name).ok()
}

/// Read attribute `name` of exactly the group `path`, without any ancestor search.
pub fn get_value<T: FromAttr>(store: &dyn AttributeStore, path: &str, name: &str) -> Result<T, AttributeError> {
    let value = store.read_attribute(path, name)
        .map_err(|e| AttributeError::store(path, name, e))?;
    T::from_attr(path, name, value)
}

/// Like [`get_value`], but absence (or any failure to read) gives `None`.
pub fn get_optional<T: FromAttr>(store: &dyn AttributeStore, path: &str, name: &str) -> Option<T> {
    get_value(store, path, name).ok()
}
