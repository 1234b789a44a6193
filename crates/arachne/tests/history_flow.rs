//! End-to-end history flow: server JSON through the status envelope,
//! row decoding, and table rendering.

use arachne::output::render_history;
use arachne_api::{Envelope, HistoryRow};

/// A history response as the server sends it: a status array whose payload
/// is the row list for the selected keys and time range.
const HISTORY_RESPONSE: &str = r#"
["OK", [
    {"t": 0, "n": "N1", "nbmood": 27.4},
    {"t": 1, "n": "N1", "nbmood": 31.9},
    {"t": 2, "n": "N1", "nbmood": 30.2}
]]
"#;

fn decode_history_rows() -> Vec<HistoryRow> {
    let value = serde_json::from_str(HISTORY_RESPONSE).expect("fixture is valid JSON");
    let envelope = Envelope::parse(value).expect("fixture is a valid status array");
    let payload = envelope.result().expect("fixture is OK")[0].clone();
    serde_json::from_value(payload).expect("payload is a row list")
}

#[test]
fn history_response_decodes_into_rows() {
    let rows = decode_history_rows();
    assert_eq!(rows.len(), 3);

    let first = &rows[0];
    assert_eq!(first["t"], serde_json::json!(0));
    assert_eq!(first["n"], serde_json::json!("N1"));
    assert_eq!(first["nbmood"], serde_json::json!(27.4));
}

#[test]
fn rendered_history_is_one_table() {
    let rows = decode_history_rows();
    let text = render_history(&rows);

    // Header plus one line per row, time column first.
    assert_eq!(text.lines().count(), 4);
    let header = text.lines().next().unwrap();
    assert!(header.find('t').unwrap() < header.find('n').unwrap());
    assert!(text.contains("31.9"));
}
