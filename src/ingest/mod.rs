pub mod csv;
pub mod normalize;

use crate::db::models::Dataset;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No songs with a title found in the upload")]
    NoSongs,
}

/// Parse and normalize CSV text into a dataset. Never fails; may be empty.
pub fn ingest_text(text: &str) -> Dataset {
    let rows = csv::parse(text);
    let songs = normalize::normalize(&rows);

    let unrated = songs.iter().filter(|s| !s.is_rated()).count();
    log::info!(
        "Ingested {} songs ({} unrated, {} without release year, {} without track length)",
        songs.len(),
        unrated,
        songs.iter().filter(|s| s.release_year.is_none()).count(),
        songs.iter().filter(|s| s.length_minutes.is_none()).count(),
    );

    Dataset::new(songs)
}

/// Read a whole CSV file. Invalid UTF-8 is replaced rather than rejected.
pub fn read_file(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("{} is not valid UTF-8, replacing invalid bytes", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    // Excel likes to prepend a byte-order mark
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
,Title,Artist(s),Genre,Rating,Review
1,Song A,Artist A,Pop,8.0/10,\"great, really great\"
2,,Artist B,Rock,6.0/10,meh
3,Song C,Artist C & Artist D,Rock & Pop,7.0/10,boring
";

    #[test]
    fn test_count_invariant() {
        let ds = ingest_text(SAMPLE);
        // One song per data row with a non-empty title
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.songs[0].title, "Song A");
        assert_eq!(ds.songs[1].title, "Song C");
    }

    #[test]
    fn test_quoted_review_survives_pipeline() {
        let ds = ingest_text(SAMPLE);
        assert_eq!(ds.songs[0].review, "great, really great");
        assert_eq!(ds.songs[1].artists, vec!["Artist C", "Artist D"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(ingest_text("").is_empty());
    }

    #[test]
    fn test_read_file_strips_bom() {
        let path = std::env::temp_dir().join(format!("breakdown-bom-{}.csv", std::process::id()));
        std::fs::write(&path, "\u{feff}Title,Rating\nA,5/10\n").unwrap();
        let text = read_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.starts_with("Title"));
    }

    #[test]
    fn test_read_file_missing() {
        let err = read_file(Path::new("/nonexistent/breakdown/none.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
