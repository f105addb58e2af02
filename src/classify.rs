//! Per-sentence sentiment classification.
//!
//! A small set of strong keywords short-circuits the pretrained model;
//! everything else is delegated to the injected sentiment capability.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use utoipa::ToSchema;

use crate::categories::detect_category;
use crate::services::{SentimentModel, Summarizer};
use crate::summarize;

pub const POSITIVE_LABEL: &str = "POSITIVE";
pub const NEGATIVE_LABEL: &str = "NEGATIVE";

/// Confidence assigned by the keyword overrides, not model-derived.
const OVERRIDE_CONFIDENCE: f64 = 0.95;

const STRONG_POSITIVE: &[&str] = &["love", "amazing", "excellent", "great"];
const STRONG_NEGATIVE: &[&str] = &["hate", "terrible", "awful", "worst"];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
    pub topic: String,
    pub category: String,
}

pub struct SentenceClassifier {
    sentiment: Arc<dyn SentimentModel>,
    summarizer: Arc<dyn Summarizer>,
}

impl SentenceClassifier {
    pub fn new(sentiment: Arc<dyn SentimentModel>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            sentiment,
            summarizer,
        }
    }

    /// Classifies one sentence. Override keywords win before the model is
    /// consulted; the positive list is checked first. Topic and category
    /// are attached on every path.
    pub async fn classify(&self, sentence: &str) -> Result<Classification> {
        let lower = sentence.to_lowercase();
        let topic = summarize::summarize_block(self.summarizer.as_ref(), sentence).await;
        let category = detect_category(sentence).to_string();

        if STRONG_POSITIVE.iter().any(|w| lower.contains(w)) {
            return Ok(Classification {
                label: POSITIVE_LABEL.to_string(),
                confidence: OVERRIDE_CONFIDENCE,
                topic,
                category,
            });
        }
        if STRONG_NEGATIVE.iter().any(|w| lower.contains(w)) {
            return Ok(Classification {
                label: NEGATIVE_LABEL.to_string(),
                confidence: OVERRIDE_CONFIDENCE,
                topic,
                category,
            });
        }

        let scored = self.sentiment.classify(sentence).await?;
        Ok(Classification {
            label: scored.label,
            confidence: round4(scored.score),
            topic,
            category,
        })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
