/// Column headers recognized in a rated-songs export.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const ARTISTS: &str = "Artist(s)";
    pub const GENRE: &str = "Genre";
    pub const RATING: &str = "Rating";
    pub const REVIEW: &str = "Review";
    pub const ALBUM: &str = "Album";
    pub const DATE_RELEASED: &str = "Date Released";
    pub const TRACK_LENGTH: &str = "Length of Track";
    pub const COUNTRY: &str = "Country of Origin (artist(s))";
    pub const RACE: &str = "Race of Artist(s)";
    pub const GENDER: &str = "Gender of Artist(s)";
    pub const LANGUAGE: &str = "Language";
}

/// One CSV data line keyed by header, before any type coercion.
///
/// Field order follows the effective header list. Looking up a header that
/// the file did not have yields `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn get(&self, header: &str) -> &str {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(h, _)| *h == header) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((header, value)),
        }
    }

    /// Whether the file had this column at all.
    pub fn contains(&self, header: &str) -> bool {
        self.fields.iter().any(|(h, _)| h == header)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::default();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Parse raw CSV text into rows keyed by header.
///
/// Never fails: malformed quoting, short rows and misaligned columns all
/// produce best-effort output. Rows without a `Title` are dropped.
pub fn parse(raw_text: &str) -> Vec<RawRow> {
    let mut lines = raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let header_values = split_line(header_line);
    // Spreadsheet exports sometimes carry a row-number column with a blank header.
    let has_index_column = header_values.first().is_some_and(|h| h.is_empty());
    let headers: Vec<String> = header_values.into_iter().filter(|h| !h.is_empty()).collect();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    let mut shifted = 0usize;

    for line in lines {
        let values = split_line(line);

        let offset = if has_index_column && values.first().is_some_and(|v| starts_with_integer(v)) {
            shifted += 1;
            1
        } else {
            0
        };

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = values.get(i + offset).cloned().unwrap_or_default();
                (header.clone(), value)
            })
            .collect();

        if row.get(columns::TITLE).is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }

    if shifted > 0 {
        log::debug!("Skipped leading row-index column on {shifted} rows");
    }
    if dropped > 0 {
        log::debug!("Dropped {dropped} rows with no title");
    }

    rows
}

/// Split one CSV line into trimmed fields, honouring double quotes.
///
/// `""` inside a quoted field is a literal quote. An unterminated quote runs
/// to the end of the line.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// True if `s` begins with an integer: optional whitespace, optional sign, a digit.
fn starts_with_integer(s: &str) -> bool {
    let s = s.trim_start();
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    s.starts_with(|c: char| c.is_ascii_digit())
}
