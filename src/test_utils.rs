use std::path::PathBuf;

use crate::store::MemoryStore;

pub(crate) fn test_data_dir() -> PathBuf {
    let crate_root = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(crate_root).join("test-data")
}

/// Minimal metadata every valid file carries
pub(crate) fn base_store(object: &str) -> MemoryStore {
    MemoryStore::new()
        .with_attr("/what", "object", object)
        .with_attr("/what", "date", "20240517")
        .with_attr("/what", "time", "120000")
}

/// A 2 x 2 composite of reflectivity with raw values 1, 2, 3, 4 (top row first)
/// on a one degree lat/lon grid.
pub(crate) fn comp_store_2x2() -> MemoryStore {
    base_store("COMP")
        .with_attr("/where", "projdef", "+proj=longlat")
        .with_attr("/where", "xsize", 2)
        .with_attr("/where", "ysize", 2)
        .with_attr("/where", "LL_lon", 20.0)
        .with_attr("/where", "LL_lat", 60.0)
        .with_attr("/where", "UR_lon", 21.0)
        .with_attr("/where", "UR_lat", 61.0)
        .with_attr("/dataset1/what", "product", "COMP")
        .with_attr("/dataset1/data1/what", "quantity", "TH")
        .with_array("/dataset1/data1/data", vec![1, 2, 3, 4])
}

/// A polar volume with one sweep per entry of `elangles`, each `nrays` x `nbins`,
/// 500 m bins starting at the radar. Raw values count up from 1 in ray-major order.
pub(crate) fn pvol_store(elangles: &[f64], nrays: usize, nbins: usize) -> MemoryStore {
    let mut store = base_store("PVOL")
        .with_attr("/where", "lon", 25.0)
        .with_attr("/where", "lat", 60.0)
        .with_attr("/where", "height", 100.0);

    for (i, elangle) in elangles.iter().enumerate() {
        let ds = format!("/dataset{}", i + 1);
        let raw: Vec<i64> = (1..=(nrays * nbins) as i64).collect();
        store = store
            .with_attr(&format!("{ds}/what"), "product", "SCAN")
            .with_attr(&format!("{ds}/where"), "elangle", *elangle)
            .with_attr(&format!("{ds}/where"), "nbins", nbins as i64)
            .with_attr(&format!("{ds}/where"), "nrays", nrays as i64)
            .with_attr(&format!("{ds}/where"), "rscale", 500.0)
            .with_attr(&format!("{ds}/where"), "rstart", 0.0)
            .with_attr(&format!("{ds}/data1/what"), "quantity", "DBZH")
            .with_array(&format!("{ds}/data1/data"), raw);
    }
    store
}
