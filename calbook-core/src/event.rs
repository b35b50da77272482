//! Event records and the field edits that can be applied to them.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_range::{end_of_day, parse_datetime, start_of_day};
use crate::error::{CalbookError, CalbookResult};
use crate::recurrence::SeriesId;

/// Opaque unique identifier of a committed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Sorts before every generated id.
    pub(crate) const MIN: EventId = EventId(Uuid::nil());

    pub fn new() -> Self {
        EventId(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }

    /// Accepts `true`/`false` (is public) as well as `public`/`private`.
    pub fn parse(value: &str) -> CalbookResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "public" => Ok(Visibility::Public),
            "false" | "private" => Ok(Visibility::Private),
            other => Err(CalbookError::Validation(format!(
                "visibility must be true/false or public/private, got '{}'",
                other
            ))),
        }
    }
}

/// One scheduled event.
///
/// All-day events are pinned to a single date and stored as the span
/// 00:00:00..=23:59:59 of that date, so every date and overlap query can
/// treat them exactly like timed events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
    pub location: String,
    pub visibility: Visibility,
    /// Label of the owning calendar's timezone, stamped on commit.
    pub timezone: String,
    pub all_day: bool,
    /// Lookup-only link to the series this event was expanded from.
    pub series_id: Option<SeriesId>,
}

impl Event {
    /// A timed event spanning `[start, end]`.
    pub fn timed(
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CalbookResult<Self> {
        let event = Event {
            id: EventId::new(),
            subject: subject.into(),
            start,
            end,
            description: String::new(),
            location: String::new(),
            visibility: Visibility::Public,
            timezone: String::new(),
            all_day: false,
            series_id: None,
        };
        event.validate()?;
        Ok(event)
    }

    /// An all-day event on `date`.
    pub fn all_day(subject: impl Into<String>, date: NaiveDate) -> CalbookResult<Self> {
        let mut event = Event::timed(subject, start_of_day(date), end_of_day(date))?;
        event.all_day = true;
        Ok(event)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn validate(&self) -> CalbookResult<()> {
        if self.subject.trim().is_empty() {
            return Err(CalbookError::Validation("subject cannot be empty".into()));
        }
        if self.end < self.start {
            return Err(CalbookError::Validation(format!(
                "end {} is before start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn is_multi_day(&self) -> bool {
        self.start_date() != self.end_date()
    }

    /// True if `date` lies within `[start_date, end_date]`.
    pub fn spans_date(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }

    /// True if `instant` is inside this event. Timed events use the closed
    /// interval `[start, end]`; all-day events cover their whole date.
    pub fn is_busy_at(&self, instant: NaiveDateTime) -> bool {
        if self.all_day {
            self.start_date() == instant.date()
        } else {
            self.start <= instant && instant <= self.end
        }
    }

    /// Apply a field edit in place, rejecting edits that would leave the
    /// event invalid. On error the event is unchanged.
    pub fn apply(&mut self, edit: &EventEdit) -> CalbookResult<()> {
        let mut next = self.clone();
        match edit {
            EventEdit::Subject(subject) => next.subject = subject.clone(),
            EventEdit::Start(start) => {
                next.start = *start;
                next.all_day = false;
            }
            EventEdit::End(end) => {
                next.end = *end;
                next.all_day = false;
            }
            EventEdit::Description(description) => next.description = description.clone(),
            EventEdit::Location(location) => next.location = location.clone(),
            EventEdit::Visibility(visibility) => next.visibility = *visibility,
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)
    }
}

/// A change to exactly one editable field of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEdit {
    Subject(String),
    Start(NaiveDateTime),
    End(NaiveDateTime),
    Description(String),
    Location(String),
    Visibility(Visibility),
}

impl EventEdit {
    /// Build an edit from a property name (case-insensitive) and its textual value.
    pub fn parse(property: &str, value: &str) -> CalbookResult<Self> {
        match property.to_ascii_lowercase().as_str() {
            "subject" | "name" => Ok(EventEdit::Subject(value.to_string())),
            "start" => Ok(EventEdit::Start(parse_datetime(value)?)),
            "end" => Ok(EventEdit::End(parse_datetime(value)?)),
            "description" => Ok(EventEdit::Description(value.to_string())),
            "location" => Ok(EventEdit::Location(value.to_string())),
            "public" | "ispublic" | "visibility" => {
                Ok(EventEdit::Visibility(Visibility::parse(value)?))
            }
            other => Err(CalbookError::Validation(format!(
                "'{}' is not an editable property (subject, start, end, description, location, public)",
                other
            ))),
        }
    }

    pub fn property(&self) -> &'static str {
        match self {
            EventEdit::Subject(_) => "subject",
            EventEdit::Start(_) => "start",
            EventEdit::End(_) => "end",
            EventEdit::Description(_) => "description",
            EventEdit::Location(_) => "location",
            EventEdit::Visibility(_) => "public",
        }
    }
}
