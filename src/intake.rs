use serde::Deserialize;

/// Tag the host uses to mark a score result among whatever else it posts.
pub const SCORE_RESULT_TAG: &str = "H5P_SCORE_RESULT";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreEvent {
    pub score: f64,
    pub max_score: f64,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    score: Option<f64>,
    #[serde(rename = "maxScore")]
    max_score: Option<f64>,
}

/// Parse one raw message. Anything that is not a well-formed score result
/// (wrong tag, missing fields, bad JSON) maps to `None` with no side
/// effect; the gateway contract is to drop such input silently.
pub fn parse_message(raw: &str) -> Option<ScoreEvent> {
    let env: Envelope = serde_json::from_str(raw).ok()?;
    if env.kind != SCORE_RESULT_TAG {
        return None;
    }
    Some(ScoreEvent {
        score: env.score?,
        max_score: env.max_score?,
    })
}
