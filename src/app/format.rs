//! Plain-text rendering of envelopes and help text for the presentation
//! layer.

use super::catalog::ModelEntry;
use crate::client::{Envelope, ResponseData};

const DETAIL_LIMIT: usize = 5;

pub fn format_output(envelope: &Envelope, label: &str) -> String {
    let data = match envelope {
        Envelope::Error(failure) => return format!("Error from {}: {}", label, failure.message),
        Envelope::Success(success) => &success.data,
    };

    let mut lines = vec![format!("{label} Results:"), "-".repeat(40)];

    match data {
        ResponseData::Classification(c) => {
            lines.push(format!("Top Prediction: {}", c.top_prediction));
            lines.push(format!("Confidence: {}", percent(c.confidence)));
            lines.push(String::new());
            lines.push("Detailed Results:".to_string());
            for p in c.predictions.iter().take(DETAIL_LIMIT) {
                lines.push(format!("• {}: {}", p.label, percent(p.score)));
            }
        }
        ResponseData::Generation(g) => lines.push(g.output.clone()),
    }

    lines.join("\n")
}

fn percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

pub fn model_info_text(entry: &ModelEntry) -> String {
    format!(
        "Model: {}\nID: {}\nCategory: {}\nPipeline: {}\n\n{}\n\nExample input: {}",
        entry.name, entry.id, entry.category, entry.pipeline, entry.description, entry.example
    )
}

pub fn about_text() -> &'static str {
    "AI Model Interface\n\
     \n\
     Runs hosted Hugging Face models on text or image input and shows\n\
     the formatted results."
}

pub fn usage_text() -> &'static str {
    "Usage:\n\
     \n\
     1. Set your Hugging Face API key (HF_API_KEY or `hfkit set-key`)\n\
     2. Pick a model with --model (see `hfkit models`)\n\
     3. Give text with --text or --file, or an image with --image\n\
     4. Add --output to save the result to a file\n\
     5. Use --mock to try everything without network access"
}
