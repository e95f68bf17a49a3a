use std::path::PathBuf;
use std::process::Command;

fn odim2grid() -> Command {
    Command::new(env!("CARGO_BIN_EXE_odim2grid"))
}

fn test_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
}

#[test]
fn test_json_to_stdout() {
    let out = odim2grid().arg(test_data("comp_2x2.json")).arg("-").output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["grid"]["nx"], 2);
    assert_eq!(doc["fields"][0]["values"], serde_json::json!([32700.0, 8.0, -32.0, 18.0]));
}

#[test]
fn test_print_config() {
    let out = odim2grid()
        .args(["--print-config", "--producer", "2000,TEST", "--datasetname", "scan"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("dataset_prefix = \"scan\""), "{text}");
    assert!(text.contains("id = 2000"), "{text}");
    assert!(text.contains("name = \"TEST\""), "{text}");
}

#[test]
fn test_missing_input_fails() {
    let out = odim2grid().args(["no-such-file.h5", "-"]).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
}

#[test]
fn test_bad_projection_fails() {
    let out = odim2grid()
        .arg(test_data("comp_2x2.json"))
        .arg("-")
        .args(["-P", "+proj=longlat:20,60"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}
