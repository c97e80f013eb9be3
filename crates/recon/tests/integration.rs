use std::path::PathBuf;

use registrum_recon::model::Score;
use registrum_recon::{
    run, Action, AliasConfig, CanonicalField, NoLocalities, PostcodeTable, Reconciler, SourceBundle,
};
use serde_json::json;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn postcodes() -> PostcodeTable {
    PostcodeTable::from_path(&fixtures_dir().join("postcodes.csv")).unwrap()
}

fn scored(record: &registrum_recon::ReconciledRecord, field: CanonicalField) -> Vec<(String, String, Score)> {
    record
        .get(field)
        .unwrap_or_else(|| panic!("field {field} missing"))
        .iter()
        .map(|s| (s.value.clone(), s.source.clone(), s.score))
        .collect()
}

fn row(value: &str, source: &str, score: Score) -> (String, String, Score) {
    (value.to_string(), source.to_string(), score)
}

// -------------------------------------------------------------------------
// Full bundle
// -------------------------------------------------------------------------

#[test]
fn combined_results_field_order() {
    let config = AliasConfig::default();
    let table = postcodes();
    let record = Reconciler::new(&config, &table).reconcile_str(&fixture("combined_results.json"));

    assert_eq!(
        record.field_order(),
        vec![
            CanonicalField::LegalName,
            CanonicalField::EntityName,
            CanonicalField::BusinessName,
            CanonicalField::Name,
            CanonicalField::TradingName,
            CanonicalField::AbrEntityType,
            CanonicalField::Abn,
            CanonicalField::PostalCode,
            CanonicalField::State,
            CanonicalField::ActiveStatus,
            CanonicalField::AbrLastUpdatedDate,
            CanonicalField::GstEffectiveDate,
            CanonicalField::AbrLastConfirmedDate,
            CanonicalField::Locality,
            CanonicalField::Suburb,
        ]
    );
}

#[test]
fn combined_results_scores() {
    let config = AliasConfig::default();
    let table = postcodes();
    let record = Reconciler::new(&config, &table).reconcile_str(&fixture("combined_results.json"));

    assert_eq!(
        scored(&record, CanonicalField::LegalName),
        vec![
            row("ANDREW KENNETH SANDOW", "abrData", Score::Low),
            row("ANDREW SANDOW", "tpbData", Score::Low),
        ]
    );
    assert_eq!(
        scored(&record, CanonicalField::EntityName),
        vec![row("SANDOW, ANDREW KENNETH", "abrData", Score::Medium)]
    );
    // tpbData's ABN is suppressed
    assert_eq!(
        scored(&record, CanonicalField::Abn),
        vec![
            row("91178504772", "abrData", Score::High),
            row("91178504772", "acnData", Score::High),
            row("91178504772", "quickbookData", Score::High),
        ]
    );
    assert_eq!(
        scored(&record, CanonicalField::State),
        vec![
            row("SA", "abrData", Score::High),
            row("SA", "acnData", Score::High),
            row("SA", "xeroData", Score::High),
            row("QLD", "quickbookData", Score::Low),
        ]
    );
    assert_eq!(
        scored(&record, CanonicalField::ActiveStatus),
        vec![
            row("ACTIVE", "abrData", Score::High),
            row("ACTIVE", "acnData", Score::High),
            row("ACTIVE", "quickbookData", Score::High),
            row("REGISTERED", "tpbData", Score::Low),
        ]
    );
    assert_eq!(
        scored(&record, CanonicalField::Locality),
        vec![
            row("KENT TOWN", "abrData", Score::High),
            row("KENT TOWN", "tpbData", Score::High),
            row("KENT TOWN", "xeroData", Score::High),
        ]
    );
    assert_eq!(
        scored(&record, CanonicalField::PostalCode),
        vec![
            row("5067", "abrData", Score::High),
            row("5067", "tpbData", Score::High),
            row("5067", "xeroData", Score::High),
        ]
    );
}

#[test]
fn combined_results_actions() {
    let config = AliasConfig::default();
    let table = postcodes();
    let record = Reconciler::new(&config, &table).reconcile_str(&fixture("combined_results.json"));

    for (field, list) in record.iter() {
        for s in list {
            if matches!(field, CanonicalField::State | CanonicalField::PostalCode) {
                assert_eq!(s.action, vec![Action::Add, Action::Delete, Action::Edit]);
            } else {
                assert_eq!(s.action, vec![Action::Delete], "{field}");
            }
        }
    }
}

#[test]
fn combined_results_report() {
    let config = AliasConfig::default();
    let table = postcodes();
    let bundle = SourceBundle::from_json_str(&fixture("combined_results.json"), &config.envelope).unwrap();
    let report = run(&config, &table, &bundle);

    assert_eq!(report.summary.sources, 9);
    assert_eq!(report.summary.total_fields, 15);
    assert_eq!(
        report.summary.contested_fields,
        vec![CanonicalField::LegalName, CanonicalField::State, CanonicalField::ActiveStatus]
    );
    assert!(report.extract_issues.is_empty());
    assert!(report.score_issues.is_empty());
}

#[test]
fn output_json_shape() {
    let config = AliasConfig::default();
    let table = postcodes();
    let record = Reconciler::new(&config, &table).reconcile_str(&fixture("combined_results.json"));
    let value = serde_json::to_value(&record).unwrap();

    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(&keys[..3], &["Legal Name", "Entity Name", "Business Name"]);

    let first_state = &value["State"][0];
    assert_eq!(
        first_state,
        &json!({"value": "SA", "source": "abrData", "score": "High", "action": ["ADD", "DELETE", "EDIT"]})
    );
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn state_spelled_two_ways_still_agrees() {
    let config = AliasConfig::default();
    let bundle = SourceBundle::new()
        .with_source("a", json!({"State": "NSW"}))
        .with_source("b", json!({"State": "New South Wales"}))
        .with_source("c", json!({"State": "QLD"}));
    let record = Reconciler::new(&config, &NoLocalities).reconcile(&bundle);

    assert_eq!(
        scored(&record, CanonicalField::State),
        vec![
            row("NSW", "a", Score::High),
            row("NSW", "b", Score::High),
            row("QLD", "c", Score::Low),
        ]
    );
}

#[test]
fn three_different_legal_names_all_low() {
    let config = AliasConfig::default();
    let bundle = SourceBundle::new()
        .with_source("a", json!({"legal_name": "Acme Pty Ltd"}))
        .with_source("b", json!({"LegalName": "Smith, John"}))
        .with_source("c", json!({"Legal name": "Widgets Co"}));
    let record = Reconciler::new(&config, &NoLocalities).reconcile(&bundle);

    assert_eq!(
        scored(&record, CanonicalField::LegalName),
        vec![
            row("ACME PTY LTD", "a", Score::Low),
            row("JOHN SMITH", "b", Score::Low),
            row("WIDGETS CO", "c", Score::Low),
        ]
    );
}

#[test]
fn reconcile_is_deterministic() {
    let config = AliasConfig::default();
    let table = postcodes();
    let reconciler = Reconciler::new(&config, &table);
    let input = fixture("combined_results.json");

    let first = reconciler.reconcile_str(&input);
    let second = reconciler.reconcile_str(&input);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn concurrent_calls_share_config_and_dataset() {
    let config = AliasConfig::default();
    let table = postcodes();
    let input = fixture("combined_results.json");
    let expected = Reconciler::new(&config, &table).reconcile_str(&input);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| Reconciler::new(&config, &table).reconcile_str(&input)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn unparseable_input_is_empty_not_an_error() {
    let config = AliasConfig::default();
    let reconciler = Reconciler::new(&config, &NoLocalities);
    assert!(reconciler.reconcile_str("combinedResults: yes").is_empty());
    assert!(reconciler.reconcile_str("\"just a string\"").is_empty());
    assert!(reconciler.reconcile_str("{}").is_empty());
}

// -------------------------------------------------------------------------
// Custom alias config
// -------------------------------------------------------------------------

#[test]
fn custom_config_with_name_capture() {
    let config = AliasConfig::from_path(&fixtures_dir().join("capture-names.aliases.toml")).unwrap();
    assert!(config.capture_name_keys);

    let table = postcodes();
    let bundle = SourceBundle::new()
        .with_source(
            "abrData",
            json!({"Entity Name": "Sandow, Andrew", "BusinessName": "Sandow BS", "PostalCode": "2518"}),
        )
        .with_source("xeroData", json!({"Name": "Andrew Sandow", "Region": "new south wales"}));
    let record = Reconciler::new(&config, &table).reconcile(&bundle);

    // "Entity Name" is a Legal Name alias here; other name keys fall to the catch-all
    assert_eq!(
        scored(&record, CanonicalField::LegalName),
        vec![
            row("ANDREW SANDOW", "abrData", Score::High),
            row("ANDREW SANDOW", "xeroData", Score::High),
            row("SANDOW BS", "abrData", Score::Low),
        ]
    );
    assert_eq!(scored(&record, CanonicalField::State), vec![row("NSW", "xeroData", Score::Medium)]);
    assert_eq!(
        scored(&record, CanonicalField::Locality),
        vec![row("BELLAMBI", "abrData", Score::Medium)]
    );
    assert!(record.get(CanonicalField::Name).is_none());
}

#[test]
fn custom_config_from_tempfile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aliases.toml");
    std::fs::write(
        &path,
        r#"
name = "ABN only"
envelope = "results"

[[fields]]
field = "ABN"
aliases = ["abn", "ABN"]
"#,
    )
    .unwrap();

    let config = AliasConfig::from_path(&path).unwrap();
    let record = Reconciler::new(&config, &NoLocalities)
        .reconcile_str(r#"{"results": {"a": {"ABN": "1", "State": "SA"}, "b": {"abn": "1"}}}"#);
    assert_eq!(record.field_order(), vec![CanonicalField::Abn]);
    assert_eq!(
        scored(&record, CanonicalField::Abn),
        vec![row("1", "a", Score::High), row("1", "b", Score::High)]
    );
}
