use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use super::csv::{columns, RawRow};
use crate::db::models::Song;

// Leading decimal number, the way spreadsheet exports write ratings: "7.5/10", "8", ".5"
static LEADING_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());

// Year-only or year-month dates: "2019", "2019-05", "2019/5"
static YEAR_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>\d{4})(?:[-/](?P<month>\d{1,2}))?$").unwrap()
});

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%a, %d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Normalize parsed rows into songs. Rows without a title are skipped.
pub fn normalize(rows: &[RawRow]) -> Vec<Song> {
    rows.iter().filter_map(normalize_row).collect()
}

/// Build a `Song` from one row, or None if the title is blank.
pub fn normalize_row(row: &RawRow) -> Option<Song> {
    let title = row.get(columns::TITLE).trim();
    if title.is_empty() {
        return None;
    }

    let rating_text = row.get(columns::RATING).to_string();
    let date_released = row.get(columns::DATE_RELEASED).to_string();
    let track_length = row.get(columns::TRACK_LENGTH).to_string();

    Some(Song {
        title: title.to_string(),
        artists: multi(row, columns::ARTISTS),
        genres: multi(row, columns::GENRE),
        rating: parse_rating(&rating_text),
        review: row.get(columns::REVIEW).to_string(),
        album: row.get(columns::ALBUM).to_string(),
        countries: multi(row, columns::COUNTRY),
        races: multi(row, columns::RACE),
        genders: multi(row, columns::GENDER),
        languages: multi(row, columns::LANGUAGE),
        release_year: parse_year(&date_released),
        length_minutes: parse_track_length(&track_length),
        rating_text,
        date_released,
        track_length,
    })
}

/// Members of a multi-valued column. Empty only when the file has no such column.
fn multi(row: &RawRow, header: &str) -> Vec<String> {
    if row.contains(header) {
        split_multi(row.get(header))
    } else {
        Vec::new()
    }
}

/// Split an `&`-delimited cell into trimmed members.
///
/// Blank segments are dropped, but a cell with none left still has one blank member.
pub fn split_multi(field: &str) -> Vec<String> {
    let members: Vec<String> = field
        .split('&')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if members.is_empty() {
        vec![String::new()]
    } else {
        members
    }
}

/// Parse "X.X/10" into X.X. Anything unparseable, negative or non-finite is 0.
pub fn parse_rating(text: &str) -> f64 {
    let left = text.split('/').next().unwrap_or("");
    match leading_float(left) {
        Some(r) if r.is_finite() && r >= 0.0 => r,
        _ => 0.0,
    }
}

/// Parse "MM:SS" into fractional minutes. None if either component is not a number.
pub fn parse_track_length(text: &str) -> Option<f64> {
    let mut parts = text.split(':');
    let minutes = leading_int(parts.next()?)?;
    let seconds = leading_int(parts.next()?)?;
    Some(minutes as f64 + seconds as f64 / 60.0)
}

/// Extract the calendar year from a loosely formatted date.
pub fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = YEAR_MONTH_RE.captures(text) {
        let year: i32 = caps["year"].parse().ok()?;
        if let Some(month) = caps.name("month") {
            let m: u32 = month.as_str().parse().ok()?;
            if !(1..=12).contains(&m) {
                return None;
            }
        }
        return Some(year);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.year());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.year());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d.year());
        }
    }

    log::debug!("Unparseable release date: {text:?}");
    None
}

fn leading_float(s: &str) -> Option<f64> {
    let m = LEADING_FLOAT_RE.find(s.trim_start())?;
    m.as_str().parse().ok()
}

fn leading_int(s: &str) -> Option<i64> {
    let m = LEADING_INT_RE.find(s.trim_start())?;
    m.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    // === Rating ===

    #[test]
    fn test_rating_fraction() {
        assert_eq!(parse_rating("7.5/10"), 7.5);
        assert_eq!(parse_rating("10/10"), 10.0);
        assert_eq!(parse_rating(" 8 / 10"), 8.0);
    }

    #[test]
    fn test_rating_invalid_is_zero() {
        assert_eq!(parse_rating(""), 0.0);
        assert_eq!(parse_rating("abc"), 0.0);
        assert_eq!(parse_rating("/10"), 0.0);
        assert_eq!(parse_rating("-3/10"), 0.0);
    }

    #[test]
    fn test_rating_leading_number_only() {
        assert_eq!(parse_rating("6.5 stars"), 6.5);
        assert_eq!(parse_rating(".5/10"), 0.5);
        assert_eq!(parse_rating("9"), 9.0);
    }

    // === Multi-valued fields ===

    #[test]
    fn test_split_multi() {
        assert_eq!(split_multi("Drake & Rihanna"), vec!["Drake", "Rihanna"]);
        assert_eq!(split_multi("Pop"), vec!["Pop"]);
        assert_eq!(split_multi(" Rock &  & Blues "), vec!["Rock", "Blues"]);
    }

    #[test]
    fn test_split_multi_never_empty() {
        assert_eq!(split_multi(""), vec![""]);
        assert_eq!(split_multi("   "), vec![""]);
        assert_eq!(split_multi("&"), vec![""]);
        assert_eq!(split_multi(" & "), vec![""]);
    }

    // === Track length ===

    #[test]
    fn test_track_length() {
        let m = parse_track_length("3:45").unwrap();
        assert!((m - 3.75).abs() < 1e-9);
        assert_eq!(parse_track_length("0:30"), Some(0.5));
        assert_eq!(parse_track_length("10:00"), Some(10.0));
    }

    #[test]
    fn test_track_length_invalid() {
        assert_eq!(parse_track_length(""), None);
        assert_eq!(parse_track_length("4"), None);
        assert_eq!(parse_track_length("ab:cd"), None);
        assert_eq!(parse_track_length("3:xx"), None);
    }

    // === Release year ===

    #[test]
    fn test_year_iso() {
        assert_eq!(parse_year("2019-05-03"), Some(2019));
        assert_eq!(parse_year("2019-05-03T10:00:00Z"), Some(2019));
        assert_eq!(parse_year("2019-05-03 10:00:00"), Some(2019));
    }

    #[test]
    fn test_year_partial() {
        assert_eq!(parse_year("1977"), Some(1977));
        assert_eq!(parse_year("1977-05"), Some(1977));
        assert_eq!(parse_year("1977-13"), None);
    }

    #[test]
    fn test_year_us_and_long_forms() {
        assert_eq!(parse_year("05/03/2019"), Some(2019));
        assert_eq!(parse_year("May 3, 2019"), Some(2019));
        assert_eq!(parse_year("3 May 2019"), Some(2019));
        assert_eq!(parse_year("Dec 25 1999"), Some(1999));
    }

    #[test]
    fn test_year_unparseable() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("sometime in the 90s"), None);
        assert_eq!(parse_year("unknown"), None);
    }

    // === Rows ===

    #[test]
    fn test_normalize_row_full() {
        let r = row(&[
            ("Title", "Song A"),
            ("Artist(s)", "A & B"),
            ("Genre", "Pop & Rock"),
            ("Rating", "8.5/10"),
            ("Review", "great"),
            ("Album", "Album A"),
            ("Date Released", "2020-01-01"),
            ("Length of Track", "3:30"),
            ("Country of Origin (artist(s))", "USA & UK"),
            ("Race of Artist(s)", "Black & White"),
            ("Gender of Artist(s)", "Male"),
            ("Language", "English"),
        ]);
        let s = normalize_row(&r).unwrap();
        assert_eq!(s.title, "Song A");
        assert_eq!(s.artists, vec!["A", "B"]);
        assert_eq!(s.genres, vec!["Pop", "Rock"]);
        assert_eq!(s.rating, 8.5);
        assert_eq!(s.rating_text, "8.5/10");
        assert_eq!(s.countries, vec!["USA", "UK"]);
        assert_eq!(s.races, vec!["Black", "White"]);
        assert_eq!(s.genders, vec!["Male"]);
        assert_eq!(s.languages, vec!["English"]);
        assert_eq!(s.release_year, Some(2020));
        assert_eq!(s.length_minutes, Some(3.5));
    }

    #[test]
    fn test_normalize_row_sparse() {
        let s = normalize_row(&row(&[("Title", "Lonely")])).unwrap();
        assert_eq!(s.rating, 0.0);
        assert!(s.genres.is_empty());
        assert_eq!(s.release_year, None);
        assert_eq!(s.length_minutes, None);
    }

    #[test]
    fn test_normalize_blank_cell_vs_missing_column() {
        let s = normalize_row(&row(&[("Title", "A"), ("Genre", ""), ("Language", "&")])).unwrap();
        assert_eq!(s.genres, vec![""]);
        assert_eq!(s.languages, vec![""]);
        assert!(s.countries.is_empty());
    }

    #[test]
    fn test_normalize_skips_blank_title() {
        let rows = vec![row(&[("Title", "A")]), row(&[("Title", "  ")])];
        assert_eq!(normalize(&rows).len(), 1);
    }
}
