use serde::{Deserialize, Serialize};

/// A normalized, typed song record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Song {
    pub title: String,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    /// 0.0 means unrated (missing or invalid in the source).
    pub rating: f64,
    /// Rating cell exactly as exported, e.g. "7.5/10".
    pub rating_text: String,
    pub review: String,
    pub album: String,
    pub date_released: String,
    pub track_length: String,
    pub countries: Vec<String>,
    pub races: Vec<String>,
    pub genders: Vec<String>,
    pub languages: Vec<String>,

    // Derived
    pub release_year: Option<i32>,
    pub length_minutes: Option<f64>,
}

impl Song {
    pub fn is_rated(&self) -> bool {
        self.rating > 0.0
    }

    /// Members of a multi-valued field.
    pub fn values(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Artist => &self.artists,
            Dimension::Genre => &self.genres,
            Dimension::Country => &self.countries,
            Dimension::Race => &self.races,
            Dimension::Gender => &self.genders,
            Dimension::Language => &self.languages,
        }
    }

    /// The whole field as one label ("Black & White"), or None if blank.
    pub fn label(&self, dim: Dimension) -> Option<String> {
        let values = self.values(dim);
        if values.is_empty() {
            None
        } else {
            Some(values.join(" & "))
        }
    }
}

/// A multi-valued song field that songs can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Artist,
    Genre,
    Country,
    Race,
    Gender,
    Language,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Artist,
        Dimension::Genre,
        Dimension::Country,
        Dimension::Race,
        Dimension::Gender,
        Dimension::Language,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Genre => "genre",
            Self::Country => "country",
            Self::Race => "race",
            Self::Gender => "gender",
            Self::Language => "language",
        }
    }

    /// Race and gender historically grouped on the raw label rather than split members.
    pub fn is_demographic(&self) -> bool {
        matches!(self, Self::Race | Self::Gender)
    }
}

/// All songs from one upload. Rebuilt in full on every upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub songs: Vec<Song>,
}

impl Dataset {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }

    /// Songs admitted into rating aggregates.
    pub fn admitted(&self, include_unrated: bool) -> impl Iterator<Item = &Song> {
        self.songs
            .iter()
            .filter(move |s| include_unrated || s.is_rated())
    }
}

/// Rating statistics for one group of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
}

/// Full rating distribution of a genre (box-plot data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDistribution {
    pub genre: String,
    pub ratings: Vec<f64>,
    pub variance: f64,
}

/// Reference to a song in a ranked list or insight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRef {
    pub title: String,
    pub artists: String,
    pub rating: f64,
    pub rating_text: String,
    pub genres: String,
    pub languages: String,
    pub review: String,
    pub album: String,
    pub date_released: String,
}

impl From<&Song> for SongRef {
    fn from(s: &Song) -> Self {
        Self {
            title: s.title.clone(),
            artists: s.artists.join(" & "),
            rating: s.rating,
            rating_text: s.rating_text.clone(),
            genres: s.genres.join(" & "),
            languages: s.languages.join(" & "),
            review: s.review.clone(),
            album: s.album.clone(),
            date_released: s.date_released.clone(),
        }
    }
}

/// Gap between the stated rating and the sentiment of the review text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationGap {
    pub title: String,
    pub artists: String,
    pub rating: f64,
    pub sentiment: i32,
    /// rating - sentiment; positive = rated higher than the review suggests.
    pub gap: f64,
}

/// Mean rating for one release year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRating {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
}

/// One point of the track-length scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthPoint {
    pub title: String,
    pub artists: String,
    pub minutes: f64,
    pub rating: f64,
}

/// Headline numbers for the report cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_songs: usize,
    pub rated_songs: usize,
    pub mean_rating: Option<f64>,
    pub unique_artists: usize,
    pub unique_genres: usize,
}

/// Handoff store statistics.
#[derive(Debug)]
pub struct StorageStats {
    pub keys: i64,
    pub dataset_bytes: i64,
    pub dataset_updated_at: Option<String>,
}
