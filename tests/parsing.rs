use std::fs;
use std::path::PathBuf;

use serde_json::json;
use squad_terminal::error::PredictError;
use squad_terminal::prediction::parse_prediction_json;
use squad_terminal::squad::{Position, STANDARD_SQUAD, card_rows};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_prediction_fixture() {
    let raw = read_fixture("predict_success.json");
    let result = parse_prediction_json(&raw).expect("fixture should parse");
    assert_eq!(result.prediction, json!("Forward A+"));
    assert_eq!(result.display_text(), "Forward A+");
    assert_eq!(result.top_players.len(), 15);
    assert_eq!(result.optimized_team.len(), 2);
    assert_eq!(result.optimized_team[1].name, "Haaland");
}

#[test]
fn fixture_fills_full_card_grid() {
    let raw = read_fixture("predict_success.json");
    let result = parse_prediction_json(&raw).expect("fixture should parse");
    let rows = card_rows(&STANDARD_SQUAD, &STANDARD_SQUAD, &result.top_players);

    assert!(rows.iter().flat_map(|r| &r.cards).all(|c| c.player.is_some()));
    let gk = rows.iter().find(|r| r.position == Position::Goalkeeper).unwrap();
    let names: Vec<_> = gk
        .cards
        .iter()
        .map(|c| c.player.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["Raya", "Alisson"]);
}

#[test]
fn missing_prediction_is_decode_error() {
    let raw = read_fixture("predict_backend_only.json");
    let err = parse_prediction_json(&raw).unwrap_err();
    assert!(matches!(err, PredictError::Decode(_)));
}

#[test]
fn null_prediction_is_kept() {
    let result = parse_prediction_json(r#"{"prediction": null}"#).expect("null is a value");
    assert!(result.prediction.is_null());
    assert!(result.top_players.is_empty());
}

#[test]
fn non_object_bodies_are_decode_errors() {
    for raw in ["", "   ", "null", "[1,2]", "\"Forward\"", "<html>oops</html>"] {
        let err = parse_prediction_json(raw).unwrap_err();
        assert!(
            matches!(err, PredictError::Decode(_)),
            "expected decode error for {raw:?}, got {err:?}"
        );
    }
}

#[test]
fn structured_prediction_passes_through() {
    let result =
        parse_prediction_json(r#"{"prediction": {"rating": "A+", "score": 91.5}}"#).unwrap();
    assert_eq!(result.prediction["rating"], "A+");
    assert_eq!(result.display_text(), r#"{"rating":"A+","score":91.5}"#);
}
