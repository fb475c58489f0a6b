pub mod groups;
pub mod insights;
pub mod sentiment;
pub mod trends;

use serde::{Deserialize, Serialize};

use crate::db::models::{
    Dataset, Dimension, ExpectationGap, GenreDistribution, GroupStats, LengthPoint, Overview,
    SongRef, YearRating,
};
use sentiment::Lexicon;

/// Tunables for the aggregation engine. Loaded from the `[analysis]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Count 0-rated (unrated) songs in rating aggregates.
    pub include_unrated: bool,
    /// Split race/gender on `&` like other fields. false = group on the whole label.
    pub split_demographics: bool,
    /// Songs in each of the top/bottom lists.
    pub top_n: usize,
    /// Rows kept in the expectation-gap chart.
    pub gap_limit: usize,
    /// Minimum ratings for a genre to count as polarizing.
    pub min_variance_members: usize,
    /// Genres shown in the ranking.
    pub genre_ranking_limit: usize,
    /// Polarizing genres shown in the report.
    pub polarizing_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_unrated: false,
            split_demographics: true,
            top_n: 5,
            gap_limit: 15,
            min_variance_members: 3,
            genre_ranking_limit: 10,
            polarizing_limit: 5,
        }
    }
}

impl AnalysisOptions {
    /// A requested list length, or `top_n` when none was given.
    pub fn top_n_or(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.top_n)
    }

    pub fn gap_limit_or(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.gap_limit)
    }
}

/// Every aggregate for one dataset, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub overview: Overview,
    pub bias_score: u32,
    pub biggest_surprise: Option<GroupStats>,
    pub hidden_gem: Option<SongRef>,

    pub genres: Vec<GroupStats>,
    pub countries: Vec<GroupStats>,
    pub races: Vec<GroupStats>,
    pub genders: Vec<GroupStats>,
    pub languages: Vec<GroupStats>,
    pub genre_ranking: Vec<GroupStats>,
    pub genre_distributions: Vec<GenreDistribution>,
    pub polarizing_genres: Vec<GenreDistribution>,

    pub expectation_gaps: Vec<ExpectationGap>,
    pub release_years: Vec<YearRating>,
    pub track_lengths: Vec<LengthPoint>,

    pub top_songs: Vec<SongRef>,
    pub bottom_songs: Vec<SongRef>,
}

impl Breakdown {
    pub fn groups(&self, dim: Dimension) -> Option<&[GroupStats]> {
        match dim {
            Dimension::Genre => Some(self.genres.as_slice()),
            Dimension::Country => Some(self.countries.as_slice()),
            Dimension::Race => Some(self.races.as_slice()),
            Dimension::Gender => Some(self.genders.as_slice()),
            Dimension::Language => Some(self.languages.as_slice()),
            Dimension::Artist => None,
        }
    }
}

/// Compute every aggregate. Pure: same dataset and options give the same breakdown.
pub fn compute_breakdown(ds: &Dataset, opts: &AnalysisOptions, lexicon: &Lexicon) -> Breakdown {
    log::debug!("Computing breakdown for {} songs", ds.len());

    Breakdown {
        overview: groups::overview(ds),
        bias_score: insights::bias_score(ds),
        biggest_surprise: insights::biggest_surprise(ds, opts),
        hidden_gem: insights::hidden_gem(ds, lexicon).map(SongRef::from),

        genres: groups::group_ratings(ds, Dimension::Genre, opts),
        countries: groups::group_ratings(ds, Dimension::Country, opts),
        races: groups::group_ratings(ds, Dimension::Race, opts),
        genders: groups::group_ratings(ds, Dimension::Gender, opts),
        languages: groups::group_ratings(ds, Dimension::Language, opts),
        genre_ranking: groups::genre_ranking(ds, opts.genre_ranking_limit, opts),
        genre_distributions: groups::genre_distributions(ds, 1, opts),
        polarizing_genres: groups::polarizing_genres(
            ds,
            opts.min_variance_members,
            opts.polarizing_limit,
            opts,
        ),

        expectation_gaps: sentiment::expectation_gaps(ds, lexicon, opts.gap_limit, opts),
        release_years: trends::release_year_trend(ds, opts),
        track_lengths: trends::track_length_points(ds, opts),

        top_songs: trends::top_songs(ds, opts.top_n, opts),
        bottom_songs: trends::bottom_songs(ds, opts.top_n, opts),
    }
}
