use serde::Serialize;
use serde_json::Value;

use crate::error::PredictError;
use crate::squad::RankedPlayer;

/// Request body shared by both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictRequest<'a> {
    pub input: &'a str,
}

/// Decoded response of `/api/predict` and `/api/predict-custom`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Opaque model output, kept exactly as the service sent it.
    pub prediction: Value,
    pub top_players: Vec<RankedPlayer>,
    pub optimized_team: Vec<RankedPlayer>,
}

impl PredictionResult {
    pub fn from_prediction(prediction: Value) -> Self {
        Self {
            prediction,
            top_players: Vec::new(),
            optimized_team: Vec::new(),
        }
    }

    /// Strings render verbatim, anything else as compact JSON.
    pub fn display_text(&self) -> String {
        match &self.prediction {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub fn parse_prediction_json(raw: &str) -> Result<PredictionResult, PredictError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PredictError::decode("empty body"));
    }

    let root: Value = serde_json::from_str(trimmed)
        .map_err(|err| PredictError::decode(format!("invalid json: {err}")))?;
    let Value::Object(obj) = &root else {
        return Err(PredictError::decode("expected a json object"));
    };
    let Some(prediction) = obj.get("prediction") else {
        return Err(PredictError::decode("missing `prediction` field"));
    };

    Ok(PredictionResult {
        prediction: prediction.clone(),
        top_players: parse_ranked_players(obj.get("topPlayers")),
        optimized_team: parse_ranked_players(obj.get("optimizedTeam")),
    })
}

// Entries are `[name, points]` pairs; `{name, predicted_points}` objects are
// accepted too. Anything else is skipped.
fn parse_ranked_players(value: Option<&Value>) -> Vec<RankedPlayer> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items.iter().filter_map(parse_ranked_player).collect()
}

fn parse_ranked_player(item: &Value) -> Option<RankedPlayer> {
    let (name, points) = match item {
        Value::Array(pair) if pair.len() >= 2 => (pair[0].as_str()?, pair[1].as_f64()?),
        Value::Object(obj) => (
            obj.get("name")?.as_str()?,
            obj.get("predicted_points")?.as_f64()?,
        ),
        _ => return None,
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(RankedPlayer {
        name: name.to_string(),
        predicted_points: points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_has_single_input_field() {
        let body = serde_json::to_value(PredictRequest { input: "Messi" }).unwrap();
        assert_eq!(body, json!({ "input": "Messi" }));
    }

    #[test]
    fn display_text_keeps_strings_verbatim() {
        let res = PredictionResult::from_prediction(json!("Forward A+"));
        assert_eq!(res.display_text(), "Forward A+");

        let res = PredictionResult::from_prediction(json!({ "score": 7 }));
        assert_eq!(res.display_text(), r#"{"score":7}"#);
    }

    #[test]
    fn ranked_player_skips_malformed_entries() {
        let raw = json!([["Salah", 8.5], ["", 3.0], [1, 2], { "name": "Saka", "predicted_points": 6 }]);
        let players = parse_ranked_players(Some(&raw));
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Salah");
        assert_eq!(players[1].predicted_points, 6.0);
    }
}
