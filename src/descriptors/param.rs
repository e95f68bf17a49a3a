use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use crate::attributes::{get_value, resolve};
use crate::inventory::Inventory;
use crate::parameters::{map_parameter, Parameter};
use crate::utils::join_path;

use super::DescriptorError;

/// The parameter axis: every distinct parameter in the file, ordered by id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    params: Vec<Parameter>,
}

impl ParamDescriptor {
    pub fn new(mut params: Vec<Parameter>) -> Self {
        params.sort();
        params.dedup();
        Self { params }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn index_of(&self, param: Parameter) -> Option<usize> {
        self.params.iter().position(|&p| p == param)
    }
}

/// Collect the parameter of every data entry of every dataset.
///
/// A dataset with no `dataN` entries contributes the parameter described
/// by the first dataset's metadata, whichever dataset it is.
pub fn build(inventory: &Inventory) -> Result<ParamDescriptor, DescriptorError> {
    let store = inventory.store();
    let mut params = BTreeSet::new();

    for i in inventory.datasets() {
        let ndata = inventory.count_data(i);
        let parents: Vec<String> = if ndata == 0 {
            if i != 1 {
                warn!("{} has no data entries; describing it with the metadata of {}", inventory.dataset_path(i), inventory.dataset_path(1));
            }
            vec![inventory.dataset_path(1)]
        } else {
            (1..=ndata).map(|j| inventory.data_path(i, j)).collect()
        };

        for parent in parents {
            let product: String = resolve(store, &parent, "what", "product")?;
            let quantity: String = resolve(store, &parent, "what", "quantity")?;
            let what = join_path(&parent, "what");
            let param = map_parameter(&product, &quantity, || get_value(store, &what, "threshold_id"))?;
            debug!("{parent}: {product}/{quantity} -> {param}");
            params.insert(param);
        }
    }

    Ok(ParamDescriptor { params: params.into_iter().collect() })
}
