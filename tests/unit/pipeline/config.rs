use super::*;

#[test]
fn from_path_applies_defaults_and_resolves_relative_dirs() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("regen.json");
    std::fs::write(
        &cfg_path,
        r#"{"metadata_dir":"meta","layer_dir":"layers","out_dir":"/abs/out"}"#,
    )
    .unwrap();

    let cfg = RunConfig::from_path(&cfg_path).unwrap();
    assert_eq!(cfg.metadata_dir, tmp.path().join("meta"));
    assert_eq!(cfg.layer_dir, tmp.path().join("layers"));
    assert!(cfg.out_dir.is_absolute());
    assert_eq!(cfg.canvas, Canvas::default());
    assert_eq!(cfg.filter, ResizeFilter::Lanczos3);
    assert!(cfg.overwrite);
}

#[test]
fn from_path_reads_explicit_settings() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("regen.json");
    std::fs::write(
        &cfg_path,
        r#"{
            "metadata_dir":"m","layer_dir":"l","out_dir":"o",
            "canvas":{"width":512,"height":256},
            "filter":"catmull-rom",
            "overwrite":false
        }"#,
    )
    .unwrap();

    let cfg = RunConfig::from_path(&cfg_path).unwrap();
    assert_eq!(
        cfg.canvas,
        Canvas {
            width: 512,
            height: 256
        }
    );
    assert_eq!(cfg.filter, ResizeFilter::CatmullRom);
    assert!(!cfg.overwrite);
}

#[test]
fn from_path_rejects_unknown_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("regen.json");
    std::fs::write(
        &cfg_path,
        r#"{"metadata_dir":"m","layer_dir":"l","out_dir":"o","colour":"red"}"#,
    )
    .unwrap();
    let err = RunConfig::from_path(&cfg_path).unwrap_err();
    assert!(matches!(err, RegenError::Validation(_)));
}

#[test]
fn validate_checks_inputs_and_canvas() {
    let tmp = tempfile::tempdir().unwrap();
    let meta = tmp.path().join("meta");
    let layers = tmp.path().join("layers");
    std::fs::create_dir_all(&meta).unwrap();
    std::fs::create_dir_all(&layers).unwrap();

    let mut cfg = RunConfig::new(&meta, &layers, tmp.path().join("out"));
    cfg.validate().unwrap();

    cfg.canvas = Canvas {
        width: 10,
        height: 1000,
    };
    assert!(cfg.validate().is_err());

    let missing = RunConfig::new(tmp.path().join("nope"), &layers, tmp.path().join("out"));
    assert!(missing.validate().is_err());

    let file_as_layers = tmp.path().join("file");
    std::fs::write(&file_as_layers, "x").unwrap();
    let bad_layers = RunConfig::new(&meta, &file_as_layers, tmp.path().join("out"));
    assert!(bad_layers.validate().is_err());
}
