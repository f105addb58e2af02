//! Report polishing through a chat-completion model.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::report::CategoryReport;
use crate::services::ChatCompletion;

const SYSTEM_PROMPT: &str = "You are a report generator.";
const FALLBACK_SUMMARY: &str = "Error generating summary.";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnhancedCategoryReport {
    pub summary: String,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub total_sentences: usize,
}

pub struct ReportEnhancer {
    chat: Arc<dyn ChatCompletion>,
}

impl ReportEnhancer {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    /// Asks the chat model for a polished summary per category. A failed
    /// call substitutes a fallback summary but keeps the already-computed
    /// statistics, and never aborts the other categories.
    pub async fn enhance(
        &self,
        report: &BTreeMap<String, CategoryReport>,
    ) -> BTreeMap<String, EnhancedCategoryReport> {
        let mut enhanced = BTreeMap::new();
        for (category, data) in report {
            let prompt = build_prompt(category, &data.sample_sentences);
            let summary = match self.chat.complete(SYSTEM_PROMPT, &prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("report enhancement for '{category}' failed: {e}");
                    FALLBACK_SUMMARY.to_string()
                }
            };
            enhanced.insert(
                category.clone(),
                EnhancedCategoryReport {
                    summary,
                    positive_percentage: data.positive_percentage,
                    negative_percentage: data.negative_percentage,
                    total_sentences: data.total_sentences,
                },
            );
        }
        enhanced
    }
}

fn build_prompt(category: &str, samples: &[String]) -> String {
    format!(
        "Analyze the following feedback about '{}':\n\
         \"{}\"\n\n\
         Summarize the sentiment and key issues clearly.\n\
         Include:\n\
         - A short heading\n\
         - Summary paragraph\n\
         - Percentage of positive/negative feedback\n",
        category,
        samples.join(". ")
    )
}
