//! Single-value "key insight" metrics.

use super::groups::{group_ratings, population_variance};
use super::sentiment::Lexicon;
use super::AnalysisOptions;
use crate::db::models::{Dataset, Dimension, GroupStats, Song};

/// Variance points removed per unit of rating variance.
const BIAS_VARIANCE_WEIGHT: f64 = 20.0;

/// How consistent the ratings are, 0-100. Identical ratings score 100.
///
/// `max(0, 100 - variance × 20)` over rated songs only. Empty → 0.
pub fn bias_score(ds: &Dataset) -> u32 {
    let ratings: Vec<f64> = ds.admitted(false).map(|s| s.rating).collect();
    match population_variance(&ratings) {
        Some(var) => (100.0 - var * BIAS_VARIANCE_WEIGHT).max(0.0).round() as u32,
        None => 0,
    }
}

/// Genre whose ratings vary the most.
///
/// None if the dataset is empty or every genre is perfectly consistent.
/// On equal variance the first genre encountered wins.
pub fn biggest_surprise(ds: &Dataset, opts: &AnalysisOptions) -> Option<GroupStats> {
    let mut best: Option<GroupStats> = None;
    for group in group_ratings(ds, Dimension::Genre, opts) {
        let current = best.as_ref().map(|b| b.variance).unwrap_or(0.0);
        if group.variance > current {
            best = Some(group);
        }
    }
    best
}

/// Highest-rated song whose review nonetheless contains a negative marker.
///
/// Ties go to the first song encountered. Unrated songs never qualify.
pub fn hidden_gem<'a>(ds: &'a Dataset, lexicon: &Lexicon) -> Option<&'a Song> {
    let mut best: Option<&Song> = None;
    for song in ds.iter() {
        let review = song.review.to_lowercase();
        if !lexicon.gem_markers().any(|w| review.contains(w.as_str())) {
            continue;
        }
        let current = best.map(|b| b.rating).unwrap_or(0.0);
        if song.rating > current {
            best = Some(song);
        }
    }
    best
}
