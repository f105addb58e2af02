//! Category-wise aggregation of classified feedback.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use utoipa::ToSchema;

use crate::categories::TOPIC_FILTERS;
use crate::classify::{SentenceClassifier, NEGATIVE_LABEL, POSITIVE_LABEL};
use crate::services::Summarizer;
use crate::summarize;

const SAMPLE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryReport {
    pub total_sentences: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub sample_sentences: Vec<String>,
    pub paragraph: String,
}

pub struct CategoryAggregator {
    classifier: Arc<SentenceClassifier>,
    summarizer: Arc<dyn Summarizer>,
}

impl CategoryAggregator {
    pub fn new(classifier: Arc<SentenceClassifier>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            classifier,
            summarizer,
        }
    }

    /// Classifies every sentence and groups the POSITIVE/NEGATIVE ones by
    /// detected category. Sentences with any other label, or landing in the
    /// "general" fallback, never enter a bucket; categories with empty
    /// buckets are omitted from the result.
    pub async fn generate(&self, sentences: &[String]) -> Result<BTreeMap<String, CategoryReport>> {
        let mut buckets: Vec<Vec<(Tone, String)>> =
            TOPIC_FILTERS.iter().map(|_| Vec::new()).collect();

        for sentence in sentences {
            let result = self.classifier.classify(sentence).await?;
            let Some(slot) = TOPIC_FILTERS
                .iter()
                .position(|(category, _)| *category == result.category)
            else {
                continue;
            };
            if result.label == POSITIVE_LABEL {
                buckets[slot].push((Tone::Positive, sentence.clone()));
            } else if result.label == NEGATIVE_LABEL {
                buckets[slot].push((Tone::Negative, sentence.clone()));
            }
        }

        let mut report = BTreeMap::new();
        for ((category, _), entries) in TOPIC_FILTERS.iter().zip(&buckets) {
            if entries.is_empty() {
                continue;
            }

            let total = entries.len();
            let positive = entries
                .iter()
                .filter(|(tone, _)| *tone == Tone::Positive)
                .count();
            let negative = total - positive;

            let sample_sentences: Vec<String> = entries
                .iter()
                .take(SAMPLE_LIMIT)
                .map(|(_, text)| text.clone())
                .collect();

            let block = entries
                .iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let paragraph = summarize::summarize_block(self.summarizer.as_ref(), &block).await;

            report.insert(
                (*category).to_string(),
                CategoryReport {
                    total_sentences: total,
                    positive_count: positive,
                    negative_count: negative,
                    positive_percentage: round2(positive as f64 / total as f64 * 100.0),
                    negative_percentage: round2(negative as f64 / total as f64 * 100.0),
                    sample_sentences,
                    paragraph,
                },
            );
        }

        Ok(report)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::{FixedSentiment, FixedSummarizer};
    use crate::services::SentimentModel;

    fn aggregator_with(model: Arc<dyn SentimentModel>) -> CategoryAggregator {
        let summarizer: Arc<dyn Summarizer> =
            Arc::new(FixedSummarizer("residents report recurring issues".to_string()));
        let classifier = Arc::new(SentenceClassifier::new(model, summarizer.clone()));
        CategoryAggregator::new(classifier, summarizer)
    }

    fn neutral_model() -> Arc<dyn SentimentModel> {
        Arc::new(FixedSentiment {
            label: "NEUTRAL".to_string(),
            score: 0.5,
        })
    }

    #[tokio::test]
    async fn groups_sentences_by_category() {
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec![
            "The water supply is terrible".to_string(),
            "Great doctors at the clinic".to_string(),
        ];
        let report = aggregator.generate(&sentences).await.unwrap();

        assert_eq!(report.len(), 2);
        let water = &report["water"];
        assert_eq!(water.total_sentences, 1);
        assert_eq!(water.negative_count, 1);
        assert_eq!(water.positive_percentage, 0.0);
        assert_eq!(water.negative_percentage, 100.0);

        let healthcare = &report["healthcare"];
        assert_eq!(healthcare.total_sentences, 1);
        assert_eq!(healthcare.positive_count, 1);
        assert_eq!(healthcare.positive_percentage, 100.0);
        assert_eq!(healthcare.paragraph, "residents report recurring issues");
    }

    #[tokio::test]
    async fn empty_categories_are_omitted() {
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec!["I love the new school building".to_string()];
        let report = aggregator.generate(&sentences).await.unwrap();

        assert_eq!(report.len(), 1);
        assert!(report.contains_key("education"));
        assert!(!report.contains_key("roads"));
    }

    #[tokio::test]
    async fn neutral_labels_never_enter_buckets() {
        // No override words, so every sentence gets the model's NEUTRAL label.
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec![
            "The road was resurfaced in June".to_string(),
            "A road crew visited yesterday".to_string(),
        ];
        let report = aggregator.generate(&sentences).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn general_sentences_are_excluded() {
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec!["I love the weather lately".to_string()];
        let report = aggregator.generate(&sentences).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn samples_are_capped_at_three_in_arrival_order() {
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec![
            "The highway is terrible at night".to_string(),
            "Terrible potholes on every street".to_string(),
            "I hate the traffic downtown".to_string(),
            "Awful road markings everywhere".to_string(),
        ];
        let report = aggregator.generate(&sentences).await.unwrap();

        let roads = &report["roads"];
        assert_eq!(roads.total_sentences, 4);
        assert_eq!(roads.negative_count, 4);
        assert_eq!(roads.sample_sentences.len(), 3);
        assert_eq!(roads.sample_sentences[0], "The highway is terrible at night");
    }

    #[tokio::test]
    async fn percentages_cover_the_tagged_subset() {
        let aggregator = aggregator_with(neutral_model());
        let sentences = vec![
            "I love the new highway".to_string(),
            "The highway exit is terrible".to_string(),
            "Terrible street lighting again".to_string(),
        ];
        let report = aggregator.generate(&sentences).await.unwrap();

        let roads = &report["roads"];
        assert_eq!(roads.positive_count + roads.negative_count, roads.total_sentences);
        assert_eq!(roads.positive_percentage, 33.33);
        assert_eq!(roads.negative_percentage, 66.67);
    }
}
