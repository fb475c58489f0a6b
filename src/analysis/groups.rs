//! Group-by-key with multi-membership.
//!
//! A song whose field holds n members contributes its full rating to all n
//! groups. Groups keep first-encountered order.

use std::collections::{HashMap, HashSet};

use super::AnalysisOptions;
use crate::db::models::{Dataset, Dimension, GenreDistribution, GroupStats, Overview, Song};

/// Arithmetic mean. None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divisor = n). None for an empty slice.
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Collect ratings per key in first-seen order.
fn partition<'a>(
    songs: impl Iterator<Item = &'a Song>,
    dim: Dimension,
    split: bool,
) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for song in songs {
        let keys: Vec<String> = if split {
            song.values(dim).to_vec()
        } else {
            song.label(dim).into_iter().collect()
        };

        // Blank cells belong to no group
        for key in keys.into_iter().filter(|k| !k.is_empty()) {
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(song.rating);
        }
    }

    groups
}

fn split_policy(dim: Dimension, opts: &AnalysisOptions) -> bool {
    !dim.is_demographic() || opts.split_demographics
}

fn stats_for(key: String, ratings: &[f64]) -> GroupStats {
    GroupStats {
        key,
        count: ratings.len(),
        mean: mean(ratings).unwrap_or(0.0),
        variance: population_variance(ratings).unwrap_or(0.0),
    }
}

/// Mean rating (and spread) for every member of a dimension.
pub fn group_ratings(ds: &Dataset, dim: Dimension, opts: &AnalysisOptions) -> Vec<GroupStats> {
    partition(ds.admitted(opts.include_unrated), dim, split_policy(dim, opts))
        .into_iter()
        .map(|(key, ratings)| stats_for(key, &ratings))
        .collect()
}

/// Genres sorted by mean rating, best first.
pub fn genre_ranking(ds: &Dataset, limit: usize, opts: &AnalysisOptions) -> Vec<GroupStats> {
    let mut groups = group_ratings(ds, Dimension::Genre, opts);
    groups.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(std::cmp::Ordering::Equal));
    groups.truncate(limit);
    groups
}

/// Rating distribution per genre for groups with at least `min_members` ratings,
/// widest spread first. Equal variances keep first-seen order.
pub fn genre_distributions(
    ds: &Dataset,
    min_members: usize,
    opts: &AnalysisOptions,
) -> Vec<GenreDistribution> {
    let mut dists: Vec<GenreDistribution> =
        partition(ds.admitted(opts.include_unrated), Dimension::Genre, true)
            .into_iter()
            .filter(|(_, ratings)| ratings.len() >= min_members)
            .map(|(genre, ratings)| GenreDistribution {
                variance: population_variance(&ratings).unwrap_or(0.0),
                genre,
                ratings,
            })
            .collect();
    dists.sort_by(|a, b| b.variance.partial_cmp(&a.variance).unwrap_or(std::cmp::Ordering::Equal));
    dists
}

/// Genres where ratings spread the most, highest variance first.
pub fn polarizing_genres(
    ds: &Dataset,
    min_members: usize,
    limit: usize,
    opts: &AnalysisOptions,
) -> Vec<GenreDistribution> {
    let mut dists = genre_distributions(ds, min_members, opts);
    dists.truncate(limit);
    dists
}

/// Headline counts for the whole dataset.
pub fn overview(ds: &Dataset) -> Overview {
    let rated: Vec<f64> = ds.admitted(false).map(|s| s.rating).collect();

    let unique = |dim: Dimension| -> usize {
        ds.iter()
            .flat_map(|s| s.values(dim).iter().map(String::as_str))
            .filter(|v| !v.is_empty())
            .collect::<HashSet<&str>>()
            .len()
    };

    Overview {
        total_songs: ds.len(),
        rated_songs: rated.len(),
        mean_rating: mean(&rated),
        unique_artists: unique(Dimension::Artist),
        unique_genres: unique(Dimension::Genre),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::song;

    #[test]
    fn test_mean_and_variance() {
        let r = [6.0, 8.0, 10.0];
        assert!((mean(&r).unwrap() - 8.0).abs() < 1e-9);
        assert!((population_variance(&r).unwrap() - 2.667).abs() < 0.01);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_variance(&[]), None);
    }

    #[test]
    fn test_multi_membership() {
        let ds = Dataset::new(vec![
            song("A", 8.0).genres(&["Pop", "Rock"]).build(),
            song("B", 6.0).genres(&["Rock"]).build(),
        ]);
        let groups = group_ratings(&ds, Dimension::Genre, &AnalysisOptions::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Pop");
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[1].key, "Rock");
        assert_eq!(groups[1].count, 2);
        assert!((groups[1].mean - 7.0).abs() < 1e-9);
        assert!((groups[1].variance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrated_excluded_by_default() {
        let ds = Dataset::new(vec![
            song("A", 8.0).genres(&["Pop"]).build(),
            song("B", 0.0).genres(&["Pop"]).build(),
        ]);
        let groups = group_ratings(&ds, Dimension::Genre, &AnalysisOptions::default());
        assert_eq!(groups[0].count, 1);
        assert!((groups[0].mean - 8.0).abs() < 1e-9);

        let opts = AnalysisOptions { include_unrated: true, ..Default::default() };
        let groups = group_ratings(&ds, Dimension::Genre, &opts);
        assert_eq!(groups[0].count, 2);
        assert!((groups[0].mean - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_demographics_split_or_atomic() {
        let ds = Dataset::new(vec![
            song("A", 8.0).races(&["Black", "White"]).build(),
            song("B", 6.0).races(&["White"]).build(),
        ]);

        let split = group_ratings(&ds, Dimension::Race, &AnalysisOptions::default());
        let keys: Vec<&str> = split.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Black", "White"]);

        let opts = AnalysisOptions { split_demographics: false, ..Default::default() };
        let atomic = group_ratings(&ds, Dimension::Race, &opts);
        let keys: Vec<&str> = atomic.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Black & White", "White"]);
    }

    #[test]
    fn test_atomic_policy_only_affects_demographics() {
        let ds = Dataset::new(vec![song("A", 8.0).genres(&["Pop", "Rock"]).build()]);
        let opts = AnalysisOptions { split_demographics: false, ..Default::default() };
        assert_eq!(group_ratings(&ds, Dimension::Genre, &opts).len(), 2);
    }

    #[test]
    fn test_distributions_widest_first() {
        let ds = Dataset::new(vec![
            song("A", 5.0).genres(&["Flat"]).build(),
            song("B", 5.0).genres(&["Flat"]).build(),
            song("C", 1.0).genres(&["Wide"]).build(),
            song("D", 10.0).genres(&["Wide"]).build(),
        ]);
        let d = genre_distributions(&ds, 1, &AnalysisOptions::default());
        assert_eq!(d[0].genre, "Wide");
        assert!((d[0].variance - 20.25).abs() < 1e-9);
        assert_eq!(d[1].genre, "Flat");
        assert_eq!(d[1].variance, 0.0);
    }

    #[test]
    fn test_blank_members_join_no_group() {
        let ds = Dataset::new(vec![
            song("A", 8.0).genres(&[""]).races(&[""]).build(),
            song("B", 6.0).genres(&["Pop"]).build(),
        ]);
        let opts = AnalysisOptions::default();
        let genres = group_ratings(&ds, Dimension::Genre, &opts);
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].key, "Pop");

        let atomic = AnalysisOptions { split_demographics: false, ..Default::default() };
        assert!(group_ratings(&ds, Dimension::Race, &atomic).is_empty());
        assert_eq!(overview(&ds).unique_genres, 1);
    }

    #[test]
    fn test_genre_ranking_sorted() {
        let ds = Dataset::new(vec![
            song("A", 5.0).genres(&["Jazz"]).build(),
            song("B", 9.0).genres(&["Pop"]).build(),
            song("C", 7.0).genres(&["Rock"]).build(),
        ]);
        let ranked = genre_ranking(&ds, 2, &AnalysisOptions::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, "Pop");
        assert_eq!(ranked[1].key, "Rock");
    }

    #[test]
    fn test_polarizing_requires_min_members() {
        let ds = Dataset::new(vec![
            song("A", 2.0).genres(&["Pop"]).build(),
            song("B", 10.0).genres(&["Pop"]).build(),
            song("C", 5.0).genres(&["Rock"]).build(),
            song("D", 6.0).genres(&["Rock"]).build(),
            song("E", 7.0).genres(&["Rock"]).build(),
        ]);
        let opts = AnalysisOptions::default();
        let all = genre_distributions(&ds, 1, &opts);
        assert_eq!(all.len(), 2);

        let polar = polarizing_genres(&ds, 3, 5, &opts);
        assert_eq!(polar.len(), 1);
        assert_eq!(polar[0].genre, "Rock");
        assert_eq!(polar[0].ratings, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_overview() {
        let ds = Dataset::new(vec![
            song("A", 8.0).artists(&["X", "Y"]).genres(&["Pop"]).build(),
            song("B", 6.0).artists(&["X"]).genres(&["Pop", "Rock"]).build(),
            song("C", 0.0).artists(&["Z"]).build(),
        ]);
        let o = overview(&ds);
        assert_eq!(o.total_songs, 3);
        assert_eq!(o.rated_songs, 2);
        assert!((o.mean_rating.unwrap() - 7.0).abs() < 1e-9);
        assert_eq!(o.unique_artists, 3);
        assert_eq!(o.unique_genres, 2);
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::default();
        let opts = AnalysisOptions::default();
        for dim in Dimension::ALL {
            assert!(group_ratings(&ds, dim, &opts).is_empty());
        }
        assert!(genre_ranking(&ds, 10, &opts).is_empty());
        assert!(polarizing_genres(&ds, 3, 5, &opts).is_empty());
        let o = overview(&ds);
        assert_eq!(o.total_songs, 0);
        assert_eq!(o.mean_rating, None);
    }
}
