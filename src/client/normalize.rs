//! Reshapes pipeline-specific JSON from the endpoint into [`ResponseData`].

use super::types::{Classification, Generation, PipelineKind, Prediction, ResponseData};
use crate::{Error, Result};
use serde_json::Value;

/// Image classification keeps only the strongest predictions.
pub const IMAGE_TOP_K: usize = 5;

pub fn normalize(pipeline: &PipelineKind, raw: Value) -> Result<ResponseData> {
    if pipeline.is_classification() {
        let top_k = pipeline.is_image().then_some(IMAGE_TOP_K);
        let mut classification = classification(raw, top_k)?;
        if pipeline.is_image() {
            classification.all_predictions = classification
                .predictions
                .iter()
                .map(|p| format!("{} ({:.2}%)", p.label, p.score * 100.0))
                .collect();
        }
        Ok(ResponseData::Classification(classification))
    } else {
        generation(raw).map(ResponseData::Generation)
    }
}

/// Accepts `[[{label, score}, ..]]` (text pipelines) or `[{label, score}, ..]`.
fn classification(raw: Value, top_k: Option<usize>) -> Result<Classification> {
    let list = match raw {
        Value::Array(mut outer) if matches!(outer.first(), Some(Value::Array(_))) => {
            outer.swap_remove(0)
        }
        list @ Value::Array(_) => list,
        other => {
            return Err(Error::normalization(format!(
                "expected a list of predictions, got {}",
                kind_of(&other)
            )));
        }
    };

    let predictions: Vec<Prediction> = serde_json::from_value(list)
        .map_err(|e| Error::normalization(format!("malformed prediction: {e}")))?;

    rank(predictions, top_k)
}

/// Sorts descending by score and fills the top prediction shortcut.
pub fn rank(mut predictions: Vec<Prediction>, top_k: Option<usize>) -> Result<Classification> {
    if let Some(bad) = predictions
        .iter()
        .find(|p| !(0.0..=1.0).contains(&p.score))
    {
        return Err(Error::normalization(format!(
            "score {} for '{}' is outside [0, 1]",
            bad.score, bad.label
        )));
    }

    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(k) = top_k {
        predictions.truncate(k);
    }

    let top = predictions
        .first()
        .ok_or_else(|| Error::normalization("no predictions returned"))?;

    Ok(Classification {
        top_prediction: top.label.clone(),
        confidence: top.score,
        predictions,
        all_predictions: Vec::new(),
        model: None,
    })
}

fn generation(raw: Value) -> Result<Generation> {
    let output = match raw {
        Value::String(s) => s,
        Value::Array(items) if items.is_empty() => "No results returned".to_string(),
        Value::Array(mut items) => generated_text(items.swap_remove(0))?,
        obj @ Value::Object(_) => generated_text(obj)?,
        other => {
            return Err(Error::normalization(format!(
                "unexpected generation response: {}",
                kind_of(&other)
            )));
        }
    };

    Ok(Generation { output })
}

fn generated_text(item: Value) -> Result<String> {
    match item {
        Value::String(s) => Ok(s),
        Value::Object(mut map) => match map.remove("generated_text") {
            Some(Value::String(s)) => Ok(s),
            _ => Err(Error::normalization("missing 'generated_text' field")),
        },
        other => Err(Error::normalization(format!(
            "unexpected generation item: {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
