//! Marker-periodicity inference.
//!
//! Many archives start each row (or each group of rows) with the marker field
//! `0x000000AD`. The spacing between consecutive markers therefore hints at
//! the row width:
//!
//! 1. Scan up to [`MAX_SCAN_FIELDS`] fields and record where markers occur.
//! 2. Rank the gaps between consecutive markers by frequency, then by size,
//!    and keep the top three as candidates. Gaps of 1 are repeated markers,
//!    not row boundaries.
//! 3. Add the sum of the two most frequent gaps, for archives where one row
//!    spans two sub-periods.
//! 4. Score each candidate by how many of its first [`MAX_SAMPLE_ROWS`] rows
//!    begin with a marker. The best score wins, the narrower width on ties.

use std::collections::BTreeMap;

use log::{debug, trace};

use super::{InferenceStrategy, RowWidthInference, DEFAULT_ROW_WIDTH, MIN_ROW_WIDTH};
use crate::bytes::{fields_be, is_marker_at, FIELD_SIZE, MARKER};

/// Upper bound on fields scanned for markers
pub const MAX_SCAN_FIELDS: usize = 30_000;

/// Upper bound on rows sampled when scoring a candidate
pub const MAX_SAMPLE_ROWS: usize = 300;

/// Number of ranked gaps kept as base candidates
const BASE_CANDIDATES: usize = 3;

/// Minimum marker count for the spacing to mean anything
const MIN_MARKERS: usize = 3;

/// Infers the row width from marker spacing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerPeriodicity;

impl RowWidthInference for MarkerPeriodicity {
    fn infer(&self, payload: &[u8]) -> usize {
        let positions = marker_positions(payload);
        if positions.len() < MIN_MARKERS {
            debug!(
                "Only {} marker(s) in payload, using default width {}",
                positions.len(),
                DEFAULT_ROW_WIDTH
            );
            return DEFAULT_ROW_WIDTH;
        }

        let ranked = rank_gaps(&positions);
        let candidates = candidate_widths(&ranked);
        trace!("Marker gaps {:?} -> candidates {:?}", ranked, candidates);

        let scored: Vec<(usize, Option<usize>)> = candidates
            .iter()
            .map(|&width| (width, marker_score(payload, width)))
            .collect();

        match pick_best(&scored) {
            Some(width) => {
                debug!(
                    "Marker periodicity chose width {} from {:?}",
                    width, scored
                );
                width
            }
            None => {
                debug!(
                    "No valid marker candidate in {:?}, using default width {}",
                    scored, DEFAULT_ROW_WIDTH
                );
                DEFAULT_ROW_WIDTH
            }
        }
    }

    fn strategy(&self) -> InferenceStrategy {
        InferenceStrategy::MarkerPeriodicity
    }
}

/// Field indexes of every marker within the first [`MAX_SCAN_FIELDS`] fields.
pub fn marker_positions(payload: &[u8]) -> Vec<usize> {
    fields_be(payload)
        .take(MAX_SCAN_FIELDS)
        .enumerate()
        .filter(|&(_, field)| field == MARKER)
        .map(|(index, _)| index)
        .collect()
}

/// Gaps between consecutive markers as `(gap, count)`, most frequent first,
/// larger gap first among equal counts.
pub fn rank_gaps(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for pair in positions.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > 1 {
            *counts.entry(gap).or_default() += 1;
        }
    }

    let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    ranked
}

/// Candidate widths from ranked gaps: the top three gaps plus the sum of the
/// two most frequent ones. Duplicates are dropped, order is preserved.
pub fn candidate_widths(ranked: &[(usize, usize)]) -> Vec<usize> {
    let mut candidates: Vec<usize> = ranked
        .iter()
        .take(BASE_CANDIDATES)
        .map(|&(gap, _)| gap)
        .collect();

    if let [(first, _), (second, _), ..] = ranked {
        let composite = first + second;
        if !candidates.contains(&composite) {
            candidates.push(composite);
        }
    }

    candidates
}

/// Number of sampled rows of `width` fields whose first field is a marker.
///
/// Returns `None` when the width is implausible (below [`MIN_ROW_WIDTH`]) or
/// one row of it would not fit in the payload.
pub fn marker_score(payload: &[u8], width: usize) -> Option<usize> {
    if width < MIN_ROW_WIDTH {
        return None;
    }
    let row_bytes = width.checked_mul(FIELD_SIZE)?;
    if row_bytes > payload.len() {
        return None;
    }

    let sample_rows = (payload.len() / row_bytes).min(MAX_SAMPLE_ROWS);
    let score = (0..sample_rows)
        .filter(|&row| is_marker_at(payload, row * width))
        .count();
    Some(score)
}

/// Highest score wins, the smaller width breaks ties. Invalid candidates
/// never win.
fn pick_best(scored: &[(usize, Option<usize>)]) -> Option<usize> {
    scored
        .iter()
        .filter_map(|&(width, score)| score.map(|s| (width, s)))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(width, _)| width)
}
