//! Data contracts shared with the library backend.

use serde::{Deserialize, Deserializer, Serialize};

/// Reading status of a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    ToRead,
    Reading,
    // Older add flows posted `completed` for the same state.
    #[serde(alias = "completed")]
    Finished,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::ToRead, Status::Reading, Status::Finished];

    /// Wire value, as used in query strings and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToRead => "to_read",
            Status::Reading => "reading",
            Status::Finished => "finished",
        }
    }

    /// Human label shown in selectors.
    pub fn label(&self) -> &'static str {
        match self {
            Status::ToRead => "to-read",
            Status::Reading => "reading",
            Status::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "to_read" => Ok(Status::ToRead),
            "reading" => Ok(Status::Reading),
            "finished" | "completed" => Ok(Status::Finished),
            _ => Err("unknown status; expected to_read, reading or finished"),
        }
    }
}

/// Book metadata as returned by search and embedded in library items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub google_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A user's record for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub google_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default)]
    pub my_rating: Option<u8>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub my_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl LibraryEntry {
    /// Rating with "unrated" collapsed to zero.
    pub fn rating(&self) -> u8 {
        self.my_rating.unwrap_or(0)
    }
}

/// The `{book, entry}` pair the library endpoints return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub book: Book,
    pub entry: LibraryEntry,
}

/// Body of `POST /api/library`: the full book plus its initial status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToLibrary {
    #[serde(flatten)]
    pub book: Book,
    pub status: Status,
}

/// What the backend answers to an add, depending on its version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Created {
    Item(LibraryItem),
    Entry(LibraryEntry),
}

impl Created {
    pub fn entry(&self) -> &LibraryEntry {
        match self {
            Created::Item(item) => &item.entry,
            Created::Entry(entry) => entry,
        }
    }
}

/// Partial update for `PATCH /api/library/<google_id>`.
///
/// Absent fields are left out of the body. The date fields distinguish
/// "untouched" (`None`) from "cleared" (`Some(None)`, sent as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_notes: Option<String>,
}

impl EntryPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn rating(rating: u8) -> Self {
        Self {
            my_rating: Some(rating),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
