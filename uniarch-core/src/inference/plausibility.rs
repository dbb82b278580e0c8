//! Plausibility-scored inference over typical industrial row widths.
//!
//! Power-quality meters lay out the first fields of a row in a recognisable
//! way: mains frequency first, then phase voltages, then phase currents. For
//! every width in [`CANDIDATE_WIDTHS`] that divides the payload evenly, the
//! first row is scored against those ranges and the best-scoring width wins.

use log::debug;

use super::{InferenceStrategy, RowWidthInference};
use crate::bytes::{field_count, read_f32_be};

/// Candidate widths, in tie-break order
pub const CANDIDATE_WIDTHS: [usize; 12] = [47, 46, 48, 40, 32, 24, 16, 12, 10, 8, 6, 4];

/// Score given to a candidate whose first row holds NaN or infinity
pub const NON_FINITE_PENALTY: i32 = -1000;

/// Fields of the first row that are inspected
const INSPECTED_FIELDS: usize = 16;

/// Values with a larger magnitude are penalised
const MAGNITUDE_LIMIT: f32 = 1e6;

/// Picks a width from [`CANDIDATE_WIDTHS`] by first-row plausibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlausibilityScoring;

impl RowWidthInference for PlausibilityScoring {
    fn infer(&self, payload: &[u8]) -> usize {
        let total_fields = field_count(payload);

        let mut best: Option<(usize, i32)> = None;
        for width in CANDIDATE_WIDTHS {
            if total_fields < width || total_fields % width != 0 {
                continue;
            }
            let score = plausibility_score(payload, width);
            // Strictly greater keeps the earlier candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((width, score));
            }
        }

        match best {
            Some((width, score)) => {
                debug!("Plausibility chose width {} (score {})", width, score);
                width
            }
            None => {
                debug!(
                    "No candidate width divides {} fields, treating payload as one row",
                    total_fields
                );
                total_fields
            }
        }
    }

    fn strategy(&self) -> InferenceStrategy {
        InferenceStrategy::Plausibility
    }
}

/// Score the first row of `payload` when read as rows of `width` fields.
pub fn plausibility_score(payload: &[u8], width: usize) -> i32 {
    let mut score = 0;

    for i in 0..width.min(INSPECTED_FIELDS) {
        let Some(v) = read_f32_be(payload, i) else {
            break;
        };

        if !v.is_finite() {
            return NON_FINITE_PENALTY;
        }

        // Mains frequency
        if i == 0 && (45.0..=65.0).contains(&v) {
            score += 4;
        }
        // Phase voltages
        if (1..=6).contains(&i) && (100.0..=550.0).contains(&v) {
            score += 2;
        }
        // Phase currents
        if (7..=12).contains(&i) && (0.0..=500.0).contains(&v) {
            score += 1;
        }
        if v.abs() > MAGNITUDE_LIMIT {
            score -= 3;
        }
    }

    score
}
