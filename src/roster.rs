use serde::Serialize;

pub const DEFAULT_DELIMITER: char = ',';

/// A name as it appears in the roster, paired with the key used for asset
/// and named-seat lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub normalized_key: String,
}

impl RosterEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            normalized_key: normalize_key(name),
        }
    }
}

pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterPosition {
    pub row: usize,
    pub col: usize,
}

/// Ordered group rows. Row-major order over all names is the canonical index
/// space shared by selection and swap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    rows: Vec<Vec<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, DEFAULT_DELIMITER)
    }

    pub fn parse_with(text: &str, delimiter: char) -> Self {
        let rows = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split(delimiter)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        Self { rows }
    }

    pub fn to_text(&self) -> String {
        self.to_text_with(DEFAULT_DELIMITER)
    }

    pub fn to_text_with(&self, delimiter: char) -> String {
        let delimiter = delimiter.to_string();
        self.rows
            .iter()
            .map(|row| row.join(&delimiter))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flatten(&self) -> Vec<(usize, usize, &str)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, names)| {
                names
                    .iter()
                    .enumerate()
                    .map(move |(col, name)| (row, col, name.as_str()))
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<RosterEntry> {
        self.flatten()
            .into_iter()
            .map(|(_, _, name)| RosterEntry::new(name))
            .collect()
    }

    pub fn position(&self, index: usize) -> Option<RosterPosition> {
        let mut remaining = index;
        for (row, names) in self.rows.iter().enumerate() {
            if remaining < names.len() {
                return Some(RosterPosition { row, col: remaining });
            }
            remaining -= names.len();
        }
        None
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        let pos = self.position(index)?;
        Some(self.rows[pos.row][pos.col].as_str())
    }

    /// Exchanges the names at two canonical indices. Returns `false` and leaves
    /// the roster untouched when either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
            return false;
        };
        if pa == pb {
            return true;
        }
        if pa.row == pb.row {
            self.rows[pa.row].swap(pa.col, pb.col);
        } else {
            let name_a = std::mem::take(&mut self.rows[pa.row][pa.col]);
            let name_b = std::mem::replace(&mut self.rows[pb.row][pb.col], name_a);
            self.rows[pa.row][pa.col] = name_b;
        }
        true
    }
}

/// Name of the file a roster is exported to: `<stem>-updated.txt`.
pub fn export_file_name(source_name: &str) -> String {
    let base = source_name.rsplit(['/', '\\']).next().unwrap_or(source_name);
    let stem = if base.to_ascii_lowercase().ends_with(".txt") {
        &base[..base.len() - 4]
    } else {
        base
    };
    format!("{stem}-updated.txt")
}
