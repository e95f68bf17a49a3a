use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use odim_grid::config::Producer;
use odim_grid::grid::MISSING_VALUE;
use odim_grid::output::json::to_json_value;
use odim_grid::parameters::Parameter;
use odim_grid::store::MemoryStore;
use odim_grid::{convert, ConvertError, ConvertOptions};
use rstest::{fixture, rstest};

fn test_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
}

#[fixture]
fn comp_file() -> MemoryStore {
    MemoryStore::from_json_file(&test_data("comp_2x2.json")).unwrap()
}

#[fixture]
fn pvol_file() -> MemoryStore {
    MemoryStore::from_json_file(&test_data("pvol_small.json")).unwrap()
}

/// A 2 x 2 lat/lon composite with raw values 1, 2 (top row) and 3, 4 (bottom row)
fn simple_comp() -> MemoryStore {
    MemoryStore::new()
        .with_attr("/what", "object", "COMP")
        .with_attr("/what", "date", "20240517")
        .with_attr("/what", "time", "120000")
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

#[rstest]
fn test_composite_from_json(comp_file: MemoryStore) {
    let data = convert(&comp_file, &ConvertOptions::default()).unwrap();

    assert_eq!(data.params().params(), &[Parameter::CorrectedReflectivity, Parameter::ProbabilityOfPrecipitationLimit2]);
    let expected_time = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(12, 5, 0).unwrap();
    assert_eq!(data.times().times(), &[expected_time]);
    assert_eq!(data.levels().len(), 1);

    // nodata, plain value, undetect, plain value; bottom row first
    assert_eq!(data.field(0, 0, 0).to_vec(), vec![MISSING_VALUE, 8.0, -32.0, 18.0]);
    assert_eq!(data.field(1, 0, 0).to_vec(), vec![0.25, 0.75, 1.0, 0.5]);
}

#[rstest]
fn test_polar_volume_from_json(pvol_file: MemoryStore) {
    let data = convert(&pvol_file, &ConvertOptions::default()).unwrap();

    assert_eq!(data.params().params(), &[Parameter::CorrectedReflectivity]);
    let expected_time = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(12, 15, 0).unwrap();
    assert_eq!(data.times().times(), &[expected_time]);

    let names: Vec<&str> = data.levels().levels().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Elevation angle 0.5", "Elevation angle 1.5"]);

    // 2 bins of 500 m: a 1 km half width, sampled by 2 * nbins points per side
    assert_eq!((data.grid().nx(), data.grid().ny()), (4, 4));
    assert_abs_diff_eq!(data.grid().area().top_right().x, 1000.0, epsilon = 1e-6);

    for (level, range) in [(0, 10.0..=17.0), (1, 20.0..=27.0)] {
        let field = data.field(0, 0, level);
        let written: Vec<f32> = field.iter().copied().filter(|v| *v != MISSING_VALUE).collect();
        assert!(!written.is_empty(), "level {level} received no values");
        assert!(written.iter().all(|v| range.contains(v)), "level {level} has values from another sweep: {written:?}");
    }
}

#[test]
fn test_max_product_keeps_native_grid() {
    let store = simple_comp()
        .with_attr("/dataset1/what", "product", "MAX")
        .with_attr("/dataset1/data1/what", "gain", 1.0)
        .with_attr("/dataset1/data1/what", "offset", 0.0);
    let data = convert(&store, &ConvertOptions::default()).unwrap();

    assert_eq!(data.params().params(), &[Parameter::Reflectivity]);
    assert_eq!(data.times().len(), 1);
    assert_eq!(data.levels().len(), 1);
    assert_eq!(data.levels().levels()[0].name, "");
    // destination row 0 (bottom) holds source row 1
    assert_eq!(data.field(0, 0, 0).to_vec(), vec![3.0, 4.0, 1.0, 2.0]);
}

#[test]
fn test_output_grid_interpolation() {
    let opts = ConvertOptions {
        projection: Some("+proj=longlat:20,60,21,61:3,3".to_string()),
        ..Default::default()
    };
    let data = convert(&simple_comp(), &opts).unwrap();
    assert_eq!((data.grid().nx(), data.grid().ny()), (3, 3));

    let field = data.field(0, 0, 0);
    // corners reproduce the input; the middle is the mean of all four
    assert_abs_diff_eq!(field[0], 3.0, epsilon = 1e-4);
    assert_abs_diff_eq!(field[2], 4.0, epsilon = 1e-4);
    assert_abs_diff_eq!(field[6], 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(field[8], 2.0, epsilon = 1e-4);
    assert_abs_diff_eq!(field[1], 3.5, epsilon = 1e-4);
    assert_abs_diff_eq!(field[4], 2.5, epsilon = 1e-4);
}

#[test]
fn test_producer_and_prefix_options() {
    let json = simple_comp().to_json_string().unwrap().replace("/dataset1", "/scan1");
    let renamed = MemoryStore::from_json_str(&json).unwrap();

    let opts = ConvertOptions {
        dataset_prefix: "scan".to_string(),
        producer: Producer { id: 2000, name: "TEST".to_string() },
        ..Default::default()
    };
    let data = convert(&renamed, &opts).unwrap();
    assert_eq!(data.producer(), &Producer { id: 2000, name: "TEST".to_string() });
    assert_eq!(data.field(0, 0, 0).to_vec(), vec![3.0, 4.0, 1.0, 2.0]);

    // With the default prefix the datasets are not found
    let err = convert(&renamed, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err.current_context(), ConvertError::InputError(_)));
}

#[rstest]
#[case::unknown_product("FOO", "TH", None)]
#[case::unmapped_quantity("COMP", "ACRR", None)]
#[case::threshold_out_of_range("COMP", "PROB", Some(11))]
#[case::threshold_missing("COMP", "PROB", None)]
fn test_unmappable_parameters(#[case] product: &str, #[case] quantity: &str, #[case] threshold: Option<i64>) {
    let mut store = simple_comp()
        .with_attr("/dataset1/what", "product", product)
        .with_attr("/dataset1/data1/what", "quantity", quantity);
    if let Some(t) = threshold {
        store.set_attr("/dataset1/data1/what", "threshold_id", t);
    }
    let err = convert(&store, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err.current_context(), ConvertError::InputError(_)), "{err:?}");
}

#[test]
fn test_unsupported_object() {
    let store = simple_comp().with_attr("/what", "object", "SCAN");
    let err = convert(&store, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err.current_context(), ConvertError::InputError(_)));
}

#[rstest]
fn test_json_document(comp_file: MemoryStore) {
    let data = convert(&comp_file, &ConvertOptions::default()).unwrap();
    let doc = to_json_value(&data).unwrap();
    assert_eq!(doc["producer"]["name"], "RADAR");
    assert_eq!(doc["parameters"][1]["id"], 22);
    assert_eq!(doc["fields"].as_array().unwrap().len(), 2);
    assert_eq!(doc["grid"]["projection"], "+proj=longlat +R=6371220");
}
