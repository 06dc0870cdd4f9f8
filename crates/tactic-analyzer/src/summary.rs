use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassificationRecord, TacticType};

/// Aggregate view over one run's classifications
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TacticSummary {
    pub total: usize,
    pub counts: BTreeMap<TacticType, usize>,
    /// Most frequent labelled tactic; ties go to the earlier taxonomy entry
    pub most_missed: Option<TacticType>,
    pub mean_confidence: Option<f64>,
}

impl TacticSummary {
    pub fn from_classifications(records: &[ClassificationRecord]) -> Self {
        let mut counts = BTreeMap::new();
        let mut confidence_sum = 0.0;
        for record in records {
            *counts.entry(record.classification.tactic_type).or_insert(0) += 1;
            confidence_sum += record.classification.confidence;
        }

        let most_missed = counts
            .iter()
            .filter(|(tactic_type, _)| **tactic_type != TacticType::Unknown)
            .fold(None, |best: Option<(TacticType, usize)>, (&tactic_type, &count)| {
                match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((tactic_type, count)),
                }
            })
            .map(|(tactic_type, _)| tactic_type);

        let mean_confidence =
            (!records.is_empty()).then(|| confidence_sum / records.len() as f64);

        Self {
            total: records.len(),
            counts,
            most_missed,
            mean_confidence,
        }
    }
}
