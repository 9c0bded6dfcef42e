//! Row display fields for note lists.

use crate::model::note::Note;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

/// `dd.MM.yyyy HH:mm`, e.g. `14.11.2023 22:13`.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Deterministic `createdDate` renderer at a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl DateFormatter {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Formats epoch milliseconds with `DISPLAY_DATE_FORMAT`.
    ///
    /// Timestamps outside chrono's range fall back to the raw number.
    pub fn format(&self, epoch_ms: i64) -> String {
        match DateTime::from_timestamp_millis(epoch_ms) {
            Some(utc) => utc
                .with_timezone(&self.offset)
                .format(DISPLAY_DATE_FORMAT)
                .to_string(),
            None => epoch_ms.to_string(),
        }
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

/// Display fields for one list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRow {
    pub title: String,
    pub content: String,
    pub formatted_date: String,
}

impl NoteRow {
    pub fn bind(note: &Note, formatter: &DateFormatter) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            formatted_date: formatter.format(note.created_date),
        }
    }
}
