//! Note ordering, lifecycle, date handling and per-day count aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::{effective_color, DEFAULT_CATEGORY_NAME};
use crate::error::CoreError;
use crate::types::{DbId, PublicId};

/// Maximum length of a note title in characters.
pub const MAX_NOTE_TITLE_LENGTH: usize = 255;

/// Wire format of a note date (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failures of the note engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("A date must be provided for new notes")]
    MissingDate,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Year {0} is out of range")]
    InvalidYear(i32),

    #[error("Note title exceeds maximum length of {MAX_NOTE_TITLE_LENGTH} characters")]
    TitleTooLong,

    #[error("Cannot {action} a note that is {from}")]
    InvalidTransition { from: NoteState, action: NoteAction },

    #[error("Invalid storage type '{0}'. Must be one of: inline, external")]
    InvalidStorageType(String),

    #[error("External attachments require a file_url")]
    MissingFileUrl,
}

impl From<NoteError> for CoreError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::InvalidTransition { .. } => CoreError::Conflict(err.to_string()),
            _ => CoreError::Validation(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Order index for a new note given the current maximum among the notes that
/// share its `(user, date)`. The first note of a day gets `0`.
pub fn next_order_index(current_max: Option<i32>) -> i32 {
    current_max.map_or(0, |max| max + 1)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub fn parse_note_date(raw: &str) -> Result<NaiveDate, NoteError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| NoteError::InvalidDate)
}

/// Half-open date range `[first day of month, first day of next month)`.
pub fn month_range(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), NoteError> {
    if !(1..=12).contains(&month) {
        return Err(NoteError::InvalidMonth(month));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(NoteError::InvalidYear(year))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(NoteError::InvalidYear(year))?;
    Ok((start, end))
}

pub fn validate_title(title: &str) -> Result<(), NoteError> {
    if title.chars().count() > MAX_NOTE_TITLE_LENGTH {
        return Err(NoteError::TitleTooLong);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a note. Notes are never hard-deleted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Active,
    SoftDeleted,
    Archived,
}

/// A requested lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    SoftDelete,
    Archive,
    Restore,
}

impl NoteState {
    /// Derive the state from the stored flags. Deletion wins over archiving.
    pub fn from_flags(is_deleted: bool, is_archived: bool) -> Self {
        match (is_deleted, is_archived) {
            (true, _) => Self::SoftDeleted,
            (false, true) => Self::Archived,
            (false, false) => Self::Active,
        }
    }

    pub fn is_deleted(self) -> bool {
        matches!(self, Self::SoftDeleted)
    }

    pub fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Apply a lifecycle action, returning the new state.
    ///
    /// Soft delete is allowed from `Active` and `Archived`; archive only from
    /// `Active`; restore from anything except `Active`.
    pub fn apply(self, action: NoteAction) -> Result<Self, NoteError> {
        match (self, action) {
            (Self::Active | Self::Archived, NoteAction::SoftDelete) => Ok(Self::SoftDeleted),
            (Self::Active, NoteAction::Archive) => Ok(Self::Archived),
            (Self::SoftDeleted | Self::Archived, NoteAction::Restore) => Ok(Self::Active),
            (from, action) => Err(NoteError::InvalidTransition { from, action }),
        }
    }
}

impl fmt::Display for NoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::SoftDeleted => "deleted",
            Self::Archived => "archived",
        })
    }
}

impl fmt::Display for NoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SoftDelete => "delete",
            Self::Archive => "archive",
            Self::Restore => "restore",
        })
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Where an attachment's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Inline,
    External,
}

impl StorageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::External => "external",
        }
    }
}

impl FromStr for StorageType {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(Self::Inline),
            "external" => Ok(Self::External),
            other => Err(NoteError::InvalidStorageType(other.to_string())),
        }
    }
}

/// Check the storage type / URL pairing of a new attachment.
pub fn validate_attachment(storage: StorageType, file_url: Option<&str>) -> Result<(), NoteError> {
    match (storage, file_url.map(str::trim)) {
        (StorageType::External, None | Some("")) => Err(NoteError::MissingFileUrl),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Count aggregation
// ---------------------------------------------------------------------------

/// One `(date, category)` group as returned by the grouped count query.
#[derive(Debug, Clone)]
pub struct CountRow {
    pub date: NaiveDate,
    pub category_id: Option<PublicId>,
    pub numeric_id: Option<DbId>,
    pub name: Option<String>,
    pub palette_color: Option<String>,
    pub inline_color: Option<String>,
    pub count: i64,
}

/// Per-category note count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category_id: Option<PublicId>,
    pub numeric_id: Option<DbId>,
    pub name: String,
    pub color: String,
    pub count: i64,
}

/// Fold grouped count rows into `YYYY-MM-DD -> [CategoryCount]`.
///
/// Rows for the same date and category are merged. Notes without a category
/// share one bucket named [`DEFAULT_CATEGORY_NAME`]. Within a day, buckets
/// keep the order in which they first appear.
pub fn aggregate_counts<I>(rows: I) -> BTreeMap<String, Vec<CategoryCount>>
where
    I: IntoIterator<Item = CountRow>,
{
    let mut by_date: BTreeMap<String, Vec<CategoryCount>> = BTreeMap::new();

    for row in rows {
        let day = by_date
            .entry(row.date.format(DATE_FORMAT).to_string())
            .or_default();

        if let Some(existing) = day.iter_mut().find(|c| c.category_id == row.category_id) {
            existing.count += row.count;
            continue;
        }

        let (name, color) = match row.category_id {
            Some(_) => (
                row.name.unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string()),
                effective_color(row.palette_color.as_deref(), row.inline_color.as_deref()),
            ),
            None => (
                DEFAULT_CATEGORY_NAME.to_string(),
                effective_color(None, None),
            ),
        };

        day.push(CategoryCount {
            category_id: row.category_id,
            numeric_id: row.numeric_id,
            name,
            color,
            count: row.count,
        });
    }

    by_date
}
