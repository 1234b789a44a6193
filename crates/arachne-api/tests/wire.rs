//! Decoding tests against documents shaped like the server's JSON.

use arachne_api::{
    CaseRecord, CaseState, Category, CompRecord, DiffRecord, ParmRecord, ServerMeta,
};

#[test]
fn server_meta_uses_camel_case() {
    let meta: ServerMeta =
        serde_json::from_str(r#"{"version": "v6.3.3", "startTime": 1467912345000}"#).unwrap();
    assert_eq!(meta.version, "v6.3.3");
    assert_eq!(meta.start_time, 1_467_912_345_000);
}

#[test]
fn case_records_decode_with_states() {
    let cases: Vec<CaseRecord> = serde_json::from_str(
        r#"[
            {"id": "case00", "longname": "Base Case", "state": "PREP", "tick": 0},
            {"id": "case01", "longname": "Surge", "state": "RUNNING", "tick": 12}
        ]"#,
    )
    .unwrap();

    assert_eq!(cases[0].state, CaseState::Prep);
    assert!(cases[0].state.is_unlocked());
    assert!(cases[1].state.is_busy());
    assert_eq!(cases[1].tick, 12);
}

#[test]
fn unknown_case_states_decode_as_unknown() {
    let case: CaseRecord = serde_json::from_str(
        r#"{"id": "case02", "longname": "X", "state": "SNAPSHOTTING"}"#,
    )
    .unwrap();
    assert_eq!(case.state, CaseState::Unknown);
    assert!(!case.state.is_busy());
    assert!(!case.state.is_unlocked());
}

#[test]
fn diff_records_decode_the_type_field_and_category() {
    let record: DiffRecord = serde_json::from_str(
        r#"{
            "name": "nbmood.N1",
            "category": "social",
            "type": "nbmood",
            "score": 64.2,
            "leaf": false,
            "inputs": {"sat.N1.AUT": 80.0}
        }"#,
    )
    .unwrap();

    assert_eq!(record.category, Category::Social);
    assert_eq!(record.diff_type, "nbmood");
    assert_eq!(record.inputs["sat.N1.AUT"], 80.0);
    assert!(!record.is_leaf());
}

#[test]
fn leafness_is_derived_not_trusted() {
    // A record wrongly flagged leaf but carrying inputs.
    let record: DiffRecord = serde_json::from_str(
        r#"{"name": "a", "category": "economic", "type": "gdp",
            "score": 5.0, "leaf": true, "inputs": {"b": 1.0}}"#,
    )
    .unwrap();
    assert!(!record.is_leaf());
}

#[test]
fn comp_records_tolerate_missing_case2() {
    let comp: CompRecord = serde_json::from_str(
        r#"{"id": "case00", "case1": "case00", "outputs": []}"#,
    )
    .unwrap();
    assert_eq!(comp.case2, None);
    assert!(comp.outputs.is_empty());
}

#[test]
fn parm_changed_compares_value_to_default() {
    let parms: Vec<ParmRecord> = serde_json::from_str(
        r#"[
            {"name": "attitude", "value": null, "default": null},
            {"name": "attitude.SFT.gamma", "value": "1.0", "default": "1.0"},
            {"name": "attitude.AUT.gamma", "value": "2.5", "default": "1.0"}
        ]"#,
    )
    .unwrap();

    assert!(!parms[0].changed());
    assert!(!parms[1].changed());
    assert!(parms[2].changed());
}

#[test]
fn categories_round_trip_lowercase() {
    for cat in Category::ALL {
        let json = serde_json::to_string(&cat).unwrap();
        assert_eq!(json, json.to_lowercase());
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cat);
    }
}
