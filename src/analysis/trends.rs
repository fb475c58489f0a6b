use std::collections::BTreeMap;

use super::groups::mean;
use super::AnalysisOptions;
use crate::db::models::{Dataset, LengthPoint, Song, SongRef, YearRating};

/// Mean rating per release year, oldest first. Songs without a parseable date are skipped.
pub fn release_year_trend(ds: &Dataset, opts: &AnalysisOptions) -> Vec<YearRating> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for song in ds.admitted(opts.include_unrated) {
        if let Some(year) = song.release_year {
            by_year.entry(year).or_default().push(song.rating);
        }
    }

    by_year
        .into_iter()
        .map(|(year, ratings)| YearRating {
            year,
            count: ratings.len(),
            mean: mean(&ratings).unwrap_or(0.0),
        })
        .collect()
}

/// (length in minutes, rating) for every song with a usable track length.
pub fn track_length_points(ds: &Dataset, opts: &AnalysisOptions) -> Vec<LengthPoint> {
    ds.admitted(opts.include_unrated)
        .filter_map(|song| {
            let minutes = song.length_minutes.filter(|m| m.is_finite())?;
            Some(LengthPoint {
                title: song.title.clone(),
                artists: song.artists.join(" & "),
                minutes,
                rating: song.rating,
            })
        })
        .collect()
}

/// Songs ordered by rating, highest first. Stable: equal ratings keep dataset order.
fn ranked<'a>(ds: &'a Dataset, opts: &AnalysisOptions) -> Vec<&'a Song> {
    let mut songs: Vec<&Song> = ds.admitted(opts.include_unrated).collect();
    songs.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    songs
}

/// The `n` highest-rated songs, descending.
pub fn top_songs(ds: &Dataset, n: usize, opts: &AnalysisOptions) -> Vec<SongRef> {
    ranked(ds, opts).into_iter().take(n).map(SongRef::from).collect()
}

/// The `n` lowest-rated songs, ascending (worst first).
pub fn bottom_songs(ds: &Dataset, n: usize, opts: &AnalysisOptions) -> Vec<SongRef> {
    ranked(ds, opts).into_iter().rev().take(n).map(SongRef::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::song;

    fn titles(songs: &[SongRef]) -> Vec<&str> {
        songs.iter().map(|s| s.title.as_str()).collect()
    }

    fn numbered(n: usize) -> Dataset {
        Dataset::new(
            (1..=n)
                .map(|i| song(&format!("S{i}"), i as f64 * 0.5).build())
                .collect(),
        )
    }

    #[test]
    fn test_year_trend_sorted_and_filtered() {
        let ds = Dataset::new(vec![
            song("A", 8.0).year(2020).build(),
            song("B", 6.0).year(1999).build(),
            song("C", 4.0).year(2020).build(),
            song("D", 9.0).build(),
        ]);
        let trend = release_year_trend(&ds, &AnalysisOptions::default());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].year, 1999);
        assert_eq!(trend[1].year, 2020);
        assert_eq!(trend[1].count, 2);
        assert!((trend[1].mean - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_length_points_skip_missing() {
        let ds = Dataset::new(vec![
            song("A", 8.0).length(3.5).build(),
            song("B", 6.0).build(),
            song("C", 7.0).length(f64::NAN).build(),
        ]);
        let points = track_length_points(&ds, &AnalysisOptions::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].title, "A");
        assert_eq!(points[0].minutes, 3.5);
    }

    #[test]
    fn test_top_bottom_seven_songs_overlap() {
        let ds = numbered(7);
        let opts = AnalysisOptions::default();
        let top = top_songs(&ds, 5, &opts);
        let bottom = bottom_songs(&ds, 5, &opts);
        assert_eq!(titles(&top), vec!["S7", "S6", "S5", "S4", "S3"]);
        assert_eq!(titles(&bottom), vec!["S1", "S2", "S3", "S4", "S5"]);
    }

    #[test]
    fn test_top_bottom_disjoint_when_large() {
        let ds = numbered(12);
        let opts = AnalysisOptions::default();
        let top = top_songs(&ds, 5, &opts);
        let bottom = bottom_songs(&ds, 5, &opts);
        assert!(top.iter().all(|t| bottom.iter().all(|b| b.title != t.title)));
        assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert!(bottom.windows(2).all(|w| w[0].rating <= w[1].rating));
    }

    #[test]
    fn test_top_stable_on_ties() {
        let ds = Dataset::new(vec![
            song("First", 8.0).build(),
            song("Second", 8.0).build(),
            song("Third", 8.0).build(),
        ]);
        let top = top_songs(&ds, 2, &AnalysisOptions::default());
        assert_eq!(titles(&top), vec!["First", "Second"]);
    }

    #[test]
    fn test_unrated_not_in_bottom() {
        let ds = Dataset::new(vec![
            song("Rated", 3.0).build(),
            song("Unrated", 0.0).build(),
        ]);
        let bottom = bottom_songs(&ds, 5, &AnalysisOptions::default());
        assert_eq!(titles(&bottom), vec!["Rated"]);
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::default();
        let opts = AnalysisOptions::default();
        assert!(release_year_trend(&ds, &opts).is_empty());
        assert!(track_length_points(&ds, &opts).is_empty());
        assert!(top_songs(&ds, 5, &opts).is_empty());
        assert!(bottom_songs(&ds, 5, &opts).is_empty());
    }
}
