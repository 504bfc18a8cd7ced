use pretty_assertions::assert_eq;

use super::*;

fn parse(json: &str) -> RegenResult<MetadataRecord> {
    MetadataRecord::from_json_slice("1", "1.json", json.as_bytes())
}

#[test]
fn attributes_are_read_in_order_and_trimmed() {
    let rec = parse(
        r##"{"name":"#1","attributes":[
            {"trait_type":" Background ","value":"Blue#3 "},
            {"trait_type":"Eyes","value":"Normal"}
        ]}"##,
    )
    .unwrap();
    assert_eq!(
        rec.attributes,
        vec![
            Attribute::new("Background", "Blue#3"),
            Attribute::new("Eyes", "Normal"),
        ]
    );
    assert_eq!(rec.attributes[0].trait_type, "Background");
    assert_eq!(rec.attributes[0].value, "Blue#3");
}

#[test]
fn missing_or_null_attributes_yield_an_empty_record() {
    assert!(parse(r#"{"name":"x"}"#).unwrap().attributes.is_empty());
    assert!(parse(r#"{"attributes":null}"#).unwrap().attributes.is_empty());
    assert!(parse(r#"{"attributes":[]}"#).unwrap().attributes.is_empty());
}

#[test]
fn non_string_values_are_stringified_and_missing_fields_are_blank() {
    let rec = parse(
        r#"{"attributes":[
            {"trait_type":"Level","value":5},
            {"trait_type":"Shiny","value":true},
            {"trait_type":"Mood","value":null},
            {"value":"Orphan"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(rec.attributes[0].value, "5");
    assert_eq!(rec.attributes[1].value, "true");
    assert!(rec.attributes[2].is_blank());
    assert!(rec.attributes[3].is_blank());
}

#[test]
fn non_documents_are_rejected() {
    assert!(parse("not json").is_err());
    assert!(parse("[1,2,3]").is_err());
    assert!(parse(r#""just a string""#).is_err());
    assert!(parse(r#"{"attributes":"Blue"}"#).is_err());
    assert!(parse(r#"{"attributes":["Blue"]}"#).is_err());
}

#[test]
fn discover_skips_unparseable_files_silently() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.json"), r#"{"attributes":[]}"#).unwrap();
    std::fs::write(dir.path().join("2.json"), "{ broken").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/3.json"), r#"{"attributes":[]}"#).unwrap();

    let store = MetadataStore::discover(dir.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].id, "1");
    assert_eq!(store.ignored().len(), 2);
}

#[test]
fn discover_orders_numeric_ids_numerically() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["10.json", "2.json", "1.json", "alpha.json", "Zed"] {
        std::fs::write(dir.path().join(name), r#"{"attributes":[]}"#).unwrap();
    }

    let store = MetadataStore::discover(dir.path()).unwrap();
    let ids = store.records().iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "2", "10", "Zed", "alpha"]);
}

#[test]
fn record_identity_is_the_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token-42.json");
    std::fs::write(&path, r#"{"attributes":[]}"#).unwrap();

    let rec = MetadataRecord::from_path(&path).unwrap();
    assert_eq!(rec.id, "token-42");
    assert_eq!(rec.file_name(), "token-42.json");
}

#[test]
fn discover_empty_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::discover(dir.path()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn discover_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = MetadataStore::discover(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, RegenError::Validation(_)));
}
