//! Lexical review sentiment and the rating-vs-review expectation gap.

use serde::Deserialize;

use super::AnalysisOptions;
use crate::db::models::{Dataset, ExpectationGap};

const DEFAULT_POSITIVE: &[&str] = &[
    "good", "great", "best", "love", "amazing", "excellent", "nice", "strong", "pleasant",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "bad", "worst", "hate", "terrible", "annoying", "boring", "weird", "trash", "awful",
];

/// Words that mark a review as grudging; used to spot hidden gems.
const DEFAULT_GEM_MARKERS: &[&str] = &[
    "bad", "boring", "annoying", "weird", "hate", "trash", "terrible",
];

/// Neutral sentiment: a review with no lexicon hits.
const SENTIMENT_BASELINE: i32 = 5;

/// Word lists used for lexical scoring. Matching is case-insensitive substring.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub gem_markers: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: to_owned(DEFAULT_POSITIVE),
            negative: to_owned(DEFAULT_NEGATIVE),
            gem_markers: to_owned(DEFAULT_GEM_MARKERS),
        }
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Lexicon {
    /// Lowercase and dedupe every list; an empty list falls back to the built-in one.
    pub fn normalized(self) -> Self {
        let clean = |words: Vec<String>, fallback: &[&str]| -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for w in words {
                let w = w.trim().to_lowercase();
                if !w.is_empty() && !out.contains(&w) {
                    out.push(w);
                }
            }
            if out.is_empty() { to_owned(fallback) } else { out }
        };
        Self {
            positive: clean(self.positive, DEFAULT_POSITIVE),
            negative: clean(self.negative, DEFAULT_NEGATIVE),
            gem_markers: clean(self.gem_markers, DEFAULT_GEM_MARKERS),
        }
    }

    pub fn gem_markers(&self) -> impl Iterator<Item = &String> {
        self.gem_markers.iter()
    }

    /// `(positive hits - negative hits) + 5`. Each word counts once however often it appears.
    ///
    /// Nominally 0-10 but not clamped.
    pub fn sentiment_score(&self, review: &str) -> i32 {
        let review = review.to_lowercase();
        let hits = |words: &[String]| words.iter().filter(|w| review.contains(w.as_str())).count() as i32;
        hits(&self.positive) - hits(&self.negative) + SENTIMENT_BASELINE
    }
}

/// Songs whose rating disagrees most with their review, largest |gap| first.
///
/// The sort is stable, so equal gaps keep dataset order.
pub fn expectation_gaps(
    ds: &Dataset,
    lexicon: &Lexicon,
    limit: usize,
    opts: &AnalysisOptions,
) -> Vec<ExpectationGap> {
    let mut gaps: Vec<ExpectationGap> = ds
        .admitted(opts.include_unrated)
        .map(|song| {
            let sentiment = lexicon.sentiment_score(&song.review);
            ExpectationGap {
                title: song.title.clone(),
                artists: song.artists.join(" & "),
                rating: song.rating,
                sentiment,
                gap: song.rating - sentiment as f64,
            }
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.gap
            .abs()
            .partial_cmp(&a.gap.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    gaps.truncate(limit);
    gaps
}
