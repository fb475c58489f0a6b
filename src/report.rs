//! Text and JSON rendering of a [`Breakdown`].
//!
//! This is the only place empty insights turn into display sentinels
//! ("N/A", "None found").

use crate::analysis::Breakdown;
use crate::db::models::{
    ExpectationGap, GenreDistribution, GroupStats, LengthPoint, SongRef, YearRating,
};

const NO_SURPRISE: &str = "N/A";
const NO_GEM: &str = "None found";
const REVIEW_SNIPPET_CHARS: usize = 60;

/// Card colour class for a rating.
pub fn rating_class(rating: f64) -> &'static str {
    if rating >= 7.0 {
        "high"
    } else if rating >= 5.0 {
        "mid"
    } else {
        "low"
    }
}

/// Cut text to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Like [`truncate`] but keeps the result within `width` columns.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        truncate(text, width.saturating_sub(3))
    } else {
        text.to_string()
    }
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn heading(out: &mut String, title: &str) {
    line(out, title);
    line(out, "=".repeat(title.chars().count()));
}

/// Pretty JSON of every aggregate, for chart tooling.
pub fn to_json(b: &Breakdown) -> serde_json::Result<String> {
    serde_json::to_string_pretty(b)
}

/// Interactive-page style summary: insights, charts as tables, song cards.
pub fn render_dashboard(b: &Breakdown) -> String {
    let mut out = String::new();

    heading(&mut out, "Key Insights");
    let surprise = b
        .biggest_surprise
        .as_ref()
        .map(|g| g.key.as_str())
        .unwrap_or(NO_SURPRISE);
    let gem = b
        .hidden_gem
        .as_ref()
        .map(|s| s.title.as_str())
        .unwrap_or(NO_GEM);
    line(&mut out, format!("Bias score:       {}%", b.bias_score));
    line(&mut out, format!("Biggest surprise: {surprise}"));
    line(&mut out, format!("Hidden gem:       {gem}"));
    line(&mut out, "");

    out.push_str(&render_groups("Ratings by Genre", &b.genres));
    out.push_str(&render_groups("Ratings by Country", &b.countries));
    out.push_str(&render_groups("Ratings by Race", &b.races));
    out.push_str(&render_groups("Ratings by Gender", &b.genders));
    out.push_str(&render_groups("Ratings by Language", &b.languages));
    out.push_str(&render_distributions("Genre Rating Spread", &b.genre_distributions));
    out.push_str(&render_gaps(&b.expectation_gaps));
    out.push_str(&render_trend(&b.release_years));
    out.push_str(&render_lengths(&b.track_lengths));
    out.push_str(&render_cards("Top Tracks", &b.top_songs));
    out.push_str(&render_cards("Bottom Tracks", &b.bottom_songs));

    out
}

/// Printable four-section report.
pub fn render_report(b: &Breakdown) -> String {
    let mut out = String::new();
    let o = &b.overview;

    heading(&mut out, "Your Music Breakdown");
    line(&mut out, "Personalized Listening Analysis");
    line(&mut out, "");

    line(&mut out, "Quick Stats");
    line(&mut out, format!("  Total Songs Analyzed: {}", o.total_songs));
    let average = match o.mean_rating {
        Some(m) => format!("{m:.2}/10"),
        None => NO_SURPRISE.to_string(),
    };
    line(&mut out, format!("  Average Rating: {average}"));
    line(&mut out, format!("  Unique Artists: {}", o.unique_artists));
    line(&mut out, format!("  Genres Explored: {}", o.unique_genres));
    line(&mut out, "");
    out.push_str(&render_ranked("Your Top Tracks", &b.top_songs));

    heading(&mut out, "Genre Analysis");
    out.push_str(&render_groups("Top Rated Genres", &b.genre_ranking));
    line(&mut out, "Most Polarizing Genres");
    line(&mut out, "  (Genres where your ratings varied the most)");
    if b.polarizing_genres.is_empty() {
        line(&mut out, "  Not enough songs per genre yet.");
    }
    for d in &b.polarizing_genres {
        line(&mut out, format!("  {:<30} Variance: {:.2}", fit(&d.genre, 30), d.variance));
    }
    line(&mut out, "");

    heading(&mut out, "Artist Demographics");
    out.push_str(&render_groups("Ratings by Artist Race", &b.races));
    out.push_str(&render_groups("Ratings by Artist Gender", &b.genders));

    heading(&mut out, "Key Insights");
    out.push_str(&render_ranked("Your Bottom Tracks", &b.bottom_songs));
    out.push_str(&render_groups("Language Preferences", &b.languages));

    line(&mut out, "Generated by Your Music Breakdown");
    out
}

/// "Key  mean/10 (n songs)" table.
pub fn render_groups(title: &str, groups: &[GroupStats]) -> String {
    let mut out = String::new();
    line(&mut out, title);
    if groups.is_empty() {
        line(&mut out, "  (no rated songs)");
    }
    for g in groups {
        line(
            &mut out,
            format!("  {:<30} {:>5.2}/10 ({} songs)", fit(&g.key, 30), g.mean, g.count),
        );
    }
    line(&mut out, "");
    out
}

fn render_distributions(title: &str, dists: &[GenreDistribution]) -> String {
    let mut out = String::new();
    line(&mut out, title);
    line(
        &mut out,
        format!("  {:<30} {:>5} {:>5} {:>5} {:>8}", "Genre", "Min", "Max", "N", "Var"),
    );
    for d in dists {
        let min = d.ratings.iter().copied().fold(f64::INFINITY, f64::min);
        let max = d.ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        line(
            &mut out,
            format!(
                "  {:<30} {:>5.1} {:>5.1} {:>5} {:>8.2}",
                fit(&d.genre, 30),
                min,
                max,
                d.ratings.len(),
                d.variance
            ),
        );
    }
    line(&mut out, "");
    out
}

/// Expectation-gap table.
pub fn render_gaps(gaps: &[ExpectationGap]) -> String {
    let mut out = String::new();
    line(&mut out, "Expectation Gap (rating - review sentiment)");
    line(&mut out, format!("  {:<45} {:>6} {:>5} {:>6}", "Song", "Rating", "Sent", "Gap"));
    line(&mut out, format!("  {}", "-".repeat(65)));
    for g in gaps {
        let name = if g.artists.is_empty() {
            g.title.clone()
        } else {
            format!("{} - {}", g.title, g.artists)
        };
        line(
            &mut out,
            format!(
                "  {:<45} {:>6.1} {:>5} {:>+6.1}",
                fit(&name, 45),
                g.rating,
                g.sentiment,
                g.gap
            ),
        );
    }
    line(&mut out, "  positive = rated higher than the review suggests");
    line(&mut out, "");
    out
}

/// Average rating per release year.
pub fn render_trend(years: &[YearRating]) -> String {
    let mut out = String::new();
    line(&mut out, "Ratings by Release Year");
    for y in years {
        line(&mut out, format!("  {:<6} {:>5.2}/10 ({} songs)", y.year, y.mean, y.count));
    }
    line(&mut out, "");
    out
}

/// Track length vs rating.
pub fn render_lengths(points: &[LengthPoint]) -> String {
    let mut out = String::new();
    line(&mut out, "Track Length vs Rating");
    line(&mut out, format!("  {:<45} {:>7} {:>6}", "Song", "Minutes", "Rating"));
    for p in points {
        let name = if p.artists.is_empty() {
            p.title.clone()
        } else {
            format!("{} - {}", p.title, p.artists)
        };
        line(&mut out, format!("  {:<45} {:>7.2} {:>6.1}", fit(&name, 45), p.minutes, p.rating));
    }
    line(&mut out, "");
    out
}

/// Song cards as on the breakdown page.
pub fn render_cards(title: &str, songs: &[SongRef]) -> String {
    let mut out = String::new();
    line(&mut out, title);
    for s in songs {
        line(&mut out, format!("  [{}] {}  {}", rating_class(s.rating), s.title, s.rating_text));
        line(&mut out, format!("      {}", s.artists));
        line(&mut out, format!("      {} • {}", s.genres, s.languages));
        line(&mut out, format!("      \"{}\"", s.review));
        line(&mut out, format!("      {}  {}", s.album, s.date_released));
    }
    line(&mut out, "");
    out
}

/// Numbered list with a review snippet, as in the printable report.
pub fn render_ranked(title: &str, songs: &[SongRef]) -> String {
    let mut out = String::new();
    line(&mut out, title);
    for (i, s) in songs.iter().enumerate() {
        line(&mut out, format!("  {}. {}", i + 1, s.title));
        line(&mut out, format!("     {} • {:.1}/10", s.artists, s.rating));
        line(&mut out, format!("     \"{}\"", truncate(&s.review, REVIEW_SNIPPET_CHARS)));
    }
    line(&mut out, "");
    out
}
