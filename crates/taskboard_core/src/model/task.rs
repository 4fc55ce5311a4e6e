//! Task domain model.
//!
//! # Responsibility
//! - Define the mutable record for one unit of work inside a project.
//! - Provide field edits, completion toggling and a display summary.
//!
//! # Invariants
//! - `id` is fixed at construction and never changes.
//! - Constructors coerce textual due dates into `DueDate::At` when the text
//!   parses; `edit` stores values as given and never coerces.
//! - `DueDate::At` holds millisecond precision, the precision of the
//!   snapshot wire, so a saved task reloads equal to itself.
//! - `priority` is an open value; no domain restriction is enforced.

use crate::model::id::{EntityId, TaskId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Open task priority.
///
/// Observed labels are `low`, `medium` and `high`, but any text is accepted.
/// Numeric priorities stay numeric, on the wire too.
///
/// Ordering puts every rank before every label; ranks compare numerically
/// and labels compare as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Rank(i64),
    Label(String),
}

impl Priority {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label.as_str()),
            Self::Rank(_) => None,
        }
    }

    pub fn as_rank(&self) -> Option<i64> {
        match self {
            Self::Rank(rank) => Some(*rank),
            Self::Label(_) => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rank(rank) => write!(f, "{rank}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::Rank(value)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Rank(rank) => serializer.serialize_i64(*rank),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PriorityRepr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match PriorityRepr::deserialize(deserializer)? {
            PriorityRepr::Text(value) => Self::Label(value),
            PriorityRepr::Integer(value) => Self::Rank(value),
            // Whole floats such as `2.0` are ranks; fractional ones keep their text.
            PriorityRepr::Float(value)
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 =>
            {
                Self::Rank(value as i64)
            }
            PriorityRepr::Float(value) => Self::Label(value.to_string()),
        })
    }
}

/// Due date of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDate {
    /// A proper point in time, truncated to milliseconds.
    At(DateTime<Utc>),
    /// Text stored as given: either set through `Task::edit`, or construction
    /// input that did not parse as a date.
    Text(String),
}

impl DueDate {
    /// Converts textual input into `DueDate::At` when it parses.
    ///
    /// Accepted shapes: RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// (read as UTC) and bare `YYYY-MM-DD` (midnight UTC).
    pub fn coerce(self) -> Self {
        match self {
            Self::Text(text) => match parse_due_date(&text) {
                Some(at) => Self::At(at),
                None => Self::Text(text),
            },
            Self::At(at) => Self::At(at.trunc_subsecs(3)),
        }
    }

    /// Returns the point in time when this due date holds one.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            Self::Text(_) => None,
        }
    }

    /// ISO-8601 form used on the snapshot wire.
    ///
    /// Points in time use millisecond precision with a `Z` suffix; text is
    /// passed through unchanged.
    pub fn to_iso_string(&self) -> String {
        match self {
            Self::At(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Text(text) => text.clone(),
        }
    }

    /// Short `M/D/YYYY` rendering for list rows.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::At(at) => at.format("%-m/%-d/%Y").to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<DateTime<Utc>> for DueDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::At(value.trunc_subsecs(3))
    }
}

impl From<NaiveDate> for DueDate {
    fn from(value: NaiveDate) -> Self {
        Self::At(value.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl From<&str> for DueDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DueDate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parses the due-date text shapes accepted by task constructors.
pub fn parse_due_date(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(at.with_timezone(&Utc).trunc_subsecs(3));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().trunc_subsecs(3));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    None
}

/// Editable task field, addressed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Priority,
    DueDate,
}

impl TaskField {
    /// Resolves a wire field name (`title`, `description`, `priority`, `dueDate`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "priority" => Some(Self::Priority),
            "dueDate" => Some(Self::DueDate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
        }
    }
}

/// Untyped value handed to `Task::edit`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(DateTime<Utc>),
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
            Self::Date(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Typed single-field edit.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEdit {
    Title(String),
    Description(String),
    Priority(Priority),
    DueDate(DueDate),
}

impl TaskEdit {
    /// Builds an edit for `field`; due-date text is kept verbatim.
    pub fn for_field(field: TaskField, value: FieldValue) -> Self {
        match field {
            TaskField::Title => Self::Title(value.into_text()),
            TaskField::Description => Self::Description(value.into_text()),
            TaskField::Priority => match value {
                FieldValue::Integer(rank) => Self::Priority(Priority::Rank(rank)),
                other => Self::Priority(Priority::Label(other.into_text())),
            },
            TaskField::DueDate => match value {
                FieldValue::Date(at) => Self::DueDate(DueDate::from(at)),
                other => Self::DueDate(DueDate::Text(other.into_text())),
            },
        }
    }

    pub fn field(&self) -> TaskField {
        match self {
            Self::Title(_) => TaskField::Title,
            Self::Description(_) => TaskField::Description,
            Self::Priority(_) => TaskField::Priority,
            Self::DueDate(_) => TaskField::DueDate,
        }
    }
}

/// Task-level operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// `edit` was called with a field name outside the editable set.
    InvalidField(String),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(name) => write!(
                f,
                "invalid task field `{name}`; expected title|description|priority|dueDate"
            ),
        }
    }
}

impl Error for TaskError {}

/// One unit of work owned by a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: DueDate,
    pub is_completed: bool,
}

impl Task {
    /// Creates an open task with a generated id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<Priority>,
        due_date: impl Into<DueDate>,
    ) -> Self {
        Self::with_id(EntityId::generate(), title, description, priority, due_date)
    }

    /// Creates an open task with a caller-provided id.
    ///
    /// Used by snapshot rehydration where identity already exists.
    /// No validation is applied to `title` or `priority`.
    pub fn with_id(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<Priority>,
        due_date: impl Into<DueDate>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            priority: priority.into(),
            due_date: due_date.into().coerce(),
            is_completed: false,
        }
    }

    /// Sets the initial completion flag.
    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Overwrites one field addressed by wire name.
    ///
    /// # Errors
    /// - `TaskError::InvalidField` when `field` is not editable; the task is
    ///   left untouched.
    pub fn edit(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), TaskError> {
        let field =
            TaskField::parse(field).ok_or_else(|| TaskError::InvalidField(field.to_string()))?;
        self.apply(TaskEdit::for_field(field, value.into()));
        Ok(())
    }

    /// Applies a typed edit.
    pub fn apply(&mut self, edit: TaskEdit) {
        match edit {
            TaskEdit::Title(title) => self.title = title,
            TaskEdit::Description(description) => self.description = description,
            TaskEdit::Priority(priority) => self.priority = priority,
            TaskEdit::DueDate(due_date) => self.due_date = due_date,
        }
    }

    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Human-readable one-line summary: `title (priority) – due M/D/YYYY`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) – due {}",
            self.title,
            self.priority,
            self.due_date.to_display_string()
        )
    }
}
