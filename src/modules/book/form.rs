use chrono::NaiveDateTime;
use thiserror::Error;

use booktrack_kernel::models::{EntryPatch, LibraryEntry, Status};

use crate::utils::{self, StarRating};

/// Format of the date inputs, minute precision.
pub const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("'{value}' is not a valid {field}; expected YYYY-MM-DDTHH:MM")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    StartedAt,
    FinishedAt,
}

impl DateField {
    pub fn name(&self) -> &'static str {
        match self {
            DateField::StartedAt => "started_at",
            DateField::FinishedAt => "finished_at",
        }
    }
}

/// The editable entry form on the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailForm {
    pub status: Status,
    /// Raw input values; empty means cleared.
    pub started_at: String,
    pub finished_at: String,
    /// Stars shown, starting from the stored rating.
    pub rating: StarRating,
    /// Rating picked in this form; 0 until a star is clicked.
    pub chosen: u8,
    pub notes: String,
}

impl DetailForm {
    pub fn from_entry(entry: &LibraryEntry) -> Self {
        Self {
            status: entry.status,
            started_at: utils::datetime_local(entry.started_at.as_deref()),
            finished_at: utils::datetime_local(entry.finished_at.as_deref()),
            rating: StarRating::new(entry.rating()),
            chosen: 0,
            notes: entry.my_notes.clone().unwrap_or_default(),
        }
    }

    /// Type into a date input. Accepts an empty value or minute-precision
    /// local time; anything else leaves the field as it was.
    pub fn set_date(&mut self, field: DateField, value: &str) -> Result<(), FormError> {
        let value = value.trim();
        if !value.is_empty() && NaiveDateTime::parse_from_str(value, DATETIME_LOCAL).is_err() {
            return Err(FormError::InvalidDateTime {
                field: field.name(),
                value: value.to_string(),
            });
        }
        let slot = match field {
            DateField::StartedAt => &mut self.started_at,
            DateField::FinishedAt => &mut self.finished_at,
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn click_star(&mut self, index: u8) -> Result<(), FormError> {
        self.rating = StarRating::click(index).ok_or(FormError::InvalidRating(index))?;
        self.chosen = self.rating.value();
        Ok(())
    }

    /// Everything the form holds, as one partial update. The rating is only
    /// sent once a star was clicked; empty dates become explicit nulls.
    pub fn payload(&self) -> EntryPatch {
        EntryPatch {
            status: Some(self.status),
            my_rating: (self.chosen > 0).then_some(self.chosen),
            started_at: Some(non_empty(&self.started_at)),
            finished_at: Some(non_empty(&self.finished_at)),
            my_notes: Some(self.notes.clone()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
