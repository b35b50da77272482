//! Weekday-pattern recurrence and its expansion into dated occurrences.
//!
//! A definition never owns its occurrences. Each call to
//! [`RecurrenceDefinition::expand`] recomputes them from scratch, and once
//! committed they live in the calendar independently, linked back only by
//! their `series_id`.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CalbookError, CalbookResult};
use crate::event::{Event, EventId};
use crate::weekdays::Weekdays;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesId(Uuid);

impl SeriesId {
    pub fn new() -> Self {
        SeriesId(Uuid::new_v4())
    }
}

impl Default for SeriesId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When a series stops producing occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Stop after this many occurrences.
    ByCount(u32),
    /// Stop after this date (inclusive).
    ByEndDate(NaiveDate),
}

impl Termination {
    /// Build from optional inputs where exactly one must be present.
    pub fn from_parts(count: Option<u32>, until: Option<NaiveDate>) -> CalbookResult<Self> {
        match (count, until) {
            (Some(n), None) => Ok(Termination::ByCount(n)),
            (None, Some(date)) => Ok(Termination::ByEndDate(date)),
            (Some(_), Some(_)) => Err(CalbookError::Validation(
                "a series ends either after a count or on a date, not both".into(),
            )),
            (None, None) => Err(CalbookError::Validation(
                "a series needs an occurrence count or an end date".into(),
            )),
        }
    }
}

/// Start and end of one occurrence, before it is materialized as an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A recurring event: a template span repeated on a set of weekdays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceDefinition {
    series_id: SeriesId,
    template: Event,
    weekdays: Weekdays,
    termination: Termination,
}

impl RecurrenceDefinition {
    /// Validate and build a definition.
    ///
    /// The template supplies subject, description, location, visibility,
    /// the all-day flag, the time of day and the duration; its start date is
    /// where expansion begins. A `series_id` already set on the template is
    /// kept, otherwise a new one is generated.
    pub fn new(
        mut template: Event,
        weekdays: Weekdays,
        termination: Termination,
    ) -> CalbookResult<Self> {
        template.validate()?;

        if weekdays.is_empty() {
            return Err(CalbookError::Validation("repeat days cannot be empty".into()));
        }

        match termination {
            Termination::ByCount(0) => {
                return Err(CalbookError::Validation(
                    "occurrence count must be greater than zero".into(),
                ));
            }
            Termination::ByEndDate(until) if until <= template.start_date() => {
                return Err(CalbookError::Validation(format!(
                    "series end date {} must be after its start date {}",
                    until,
                    template.start_date()
                )));
            }
            _ => {}
        }

        let series_id = template.series_id.unwrap_or_default();
        template.series_id = Some(series_id);

        Ok(RecurrenceDefinition {
            series_id,
            template,
            weekdays,
            termination,
        })
    }

    pub fn series_id(&self) -> SeriesId {
        self.series_id
    }

    pub fn subject(&self) -> &str {
        &self.template.subject
    }

    pub fn template(&self) -> &Event {
        &self.template
    }

    pub fn weekdays(&self) -> Weekdays {
        self.weekdays
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub(crate) fn relabel_timezone(&mut self, timezone: &str) {
        self.template.timezone = timezone.to_string();
    }

    /// Dated spans of every occurrence, ascending.
    ///
    /// Walks forward one day at a time from the template's start date and
    /// emits a span on each repeat weekday, until the count is reached or the
    /// end date is passed.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        let duration: Duration = self.template.end - self.template.start;
        let time_of_day = self.template.start.time();

        let mut spans = Vec::new();
        let mut date = self.template.start_date();

        loop {
            let within_bound = match self.termination {
                Termination::ByCount(n) => spans.len() < n as usize,
                Termination::ByEndDate(until) => date <= until,
            };
            if !within_bound {
                break;
            }

            if self.weekdays.contains(date.weekday()) {
                let start = date.and_time(time_of_day);
                spans.push(Occurrence {
                    start,
                    end: start + duration,
                });
            }

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        spans
    }

    /// Materialize every occurrence as an event with a fresh id, tagged with
    /// this definition's series id.
    pub fn expand(&self) -> Vec<Event> {
        self.occurrences()
            .into_iter()
            .map(|occurrence| Event {
                id: EventId::new(),
                start: occurrence.start,
                end: occurrence.end,
                ..self.template.clone()
            })
            .collect()
    }
}
