//! End-to-end chain flow: server JSON through decoding, chain building,
//! caching, significance filtering, and rendering.

use arachne::output::render_chain;
use arachne::store::ChainCache;
use arachne_api::{DiffRecord, Envelope};
use arachne_core::{Chain, DEFAULT_SIG_LEVEL};

/// A chain response as the server sends it: a status array whose payload
/// is the flat record list, root included.
const CHAIN_RESPONSE: &str = r#"
["OK", [
    {"name": "nbmood.N1", "category": "social", "type": "nbmood",
     "score": 64.2, "leaf": false,
     "inputs": {"sat.N1.AUT": 80.0, "sat.N1.SFT": 30.0, "sat.N1.CUL": 30.0}},
    {"name": "sat.N1.AUT", "category": "social", "type": "sat",
     "score": 71.0, "leaf": false,
     "inputs": {"security.N1": 55.0}},
    {"name": "sat.N1.SFT", "category": "social", "type": "sat",
     "score": 33.5, "leaf": true, "inputs": {}},
    {"name": "sat.N1.CUL", "category": "social", "type": "sat",
     "score": 12.0, "leaf": true, "inputs": {}},
    {"name": "security.N1", "category": "military", "type": "nbsecurity",
     "score": 55.0, "leaf": true, "inputs": {}}
]]
"#;

fn decode_chain_records() -> Vec<DiffRecord> {
    let value = serde_json::from_str(CHAIN_RESPONSE).expect("fixture is valid JSON");
    let envelope = Envelope::parse(value).expect("fixture is a valid status array");
    let payload = envelope.result().expect("fixture is OK")[0].clone();
    serde_json::from_value(payload).expect("payload is a record list")
}

#[test]
fn chain_response_decodes_and_expands() {
    let records = decode_chain_records();
    let chain = Chain::build(&records, "nbmood.N1").expect("chain builds");

    // Pre-order with score-descending siblings and name tie-break
    // (CUL before SFT at 30.0 each).
    let names: Vec<&str> = chain.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        ["nbmood.N1", "sat.N1.AUT", "security.N1", "sat.N1.CUL", "sat.N1.SFT"]
    );

    // Edge weights override intrinsic scores below the root.
    let aut = chain.get(1).unwrap();
    assert_eq!(aut.score, 80.0);
    assert_eq!(aut.intrinsic_score, 71.0);

    // Leafness comes from the inputs, not the wire flag.
    assert!(!chain.root().is_leaf());
    assert!(chain.get(2).unwrap().is_leaf());
}

#[test]
fn cached_chain_serves_visibility_queries() {
    let records = decode_chain_records();
    let chain = Chain::build(&records, "nbmood.N1").unwrap();

    let mut cache = ChainCache::new();
    cache.insert("case00/case01", "nbmood.N1", chain);
    let chain = cache.get("case00/case01", "nbmood.N1").unwrap();

    // Every edge clears the default level, so nothing is hidden.
    let visible = chain.visible_items(DEFAULT_SIG_LEVEL);
    assert_eq!(visible.len(), 5);

    // At 40, the 30-point satisfaction edges drop out; security.N1 stays
    // because its ancestor chain (AUT at 80, then 55) holds up.
    let names: Vec<&str> = chain
        .visible_items(40.0)
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, ["nbmood.N1", "sat.N1.AUT", "security.N1"]);
}

#[test]
fn rendered_chain_matches_the_filter() {
    let records = decode_chain_records();
    let chain = Chain::build(&records, "nbmood.N1").unwrap();

    let text = render_chain(&chain, 40.0);
    assert!(text.contains("nbmood.N1"));
    assert!(text.contains("security.N1"));
    assert!(!text.contains("sat.N1.SFT"));
    assert!(text.contains("Showing 3 of 5"));
}

#[test]
fn rebuilding_from_the_same_records_is_idempotent() {
    let records = decode_chain_records();
    let first = Chain::build(&records, "nbmood.N1").unwrap();
    let second = Chain::build(&records, "nbmood.N1").unwrap();
    assert_eq!(first, second);

    // Building for another root in between must not disturb anything:
    // the records are immutable inputs, not a scratch space.
    let _side = Chain::build(&records, "sat.N1.AUT").unwrap();
    let third = Chain::build(&records, "nbmood.N1").unwrap();
    assert_eq!(first, third);
}
