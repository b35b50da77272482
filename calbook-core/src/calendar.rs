//! A named calendar: one owner's events and the recurring series that
//! produced some of them.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::conflict;
use crate::date_range::DateRange;
use crate::error::{CalbookError, CalbookResult};
use crate::event::{Event, EventEdit, EventId};
use crate::index::EventIndex;
use crate::recurrence::{RecurrenceDefinition, SeriesId};

#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    timezone: String,
    index: EventIndex,
    series: BTreeMap<SeriesId, RecurrenceDefinition>,
}

impl Calendar {
    /// An empty calendar. The timezone is only a label stamped on every
    /// committed event; it is not validated here.
    pub fn new(name: impl Into<String>, timezone: impl Into<String>) -> Self {
        Calendar {
            name: name.into(),
            timezone: timezone.into(),
            index: EventIndex::new(),
            series: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Relabel the calendar and its events. Stored wall-clock times are kept.
    pub(crate) fn set_timezone(&mut self, timezone: &str) {
        self.timezone = timezone.to_string();
        self.index.relabel_timezone(timezone);
        for definition in self.series.values_mut() {
            definition.relabel_timezone(timezone);
        }
    }

    // WRITES:

    /// Add a single event.
    ///
    /// Returns `Ok(true)` when committed. On a collision a strict add fails
    /// with [`CalbookError::Conflict`] and a lenient add returns `Ok(false)`.
    pub fn add_event(&mut self, mut event: Event, strict: bool) -> CalbookResult<bool> {
        event.timezone = self.timezone.clone();
        let id = event.id;
        let committed = conflict::try_add(&mut self.index, event, strict)?;
        if committed {
            debug!(calendar = %self.name, %id, "added event");
        }
        Ok(committed)
    }

    /// Expand a recurring definition and add all of its occurrences, or none.
    ///
    /// On success the definition is kept for lookup by series id.
    pub fn add_recurring_event(
        &mut self,
        definition: RecurrenceDefinition,
        strict: bool,
    ) -> CalbookResult<bool> {
        let occurrences: Vec<Event> = definition
            .expand()
            .into_iter()
            .map(|mut event| {
                event.timezone = self.timezone.clone();
                event
            })
            .collect();
        let count = occurrences.len();

        let committed = conflict::try_add_series(&mut self.index, occurrences, strict)?;
        if committed {
            info!(
                calendar = %self.name,
                series = %definition.series_id(),
                subject = definition.subject(),
                occurrences = count,
                "added recurring event"
            );
            let mut definition = definition;
            definition.relabel_timezone(&self.timezone);
            self.series.insert(definition.series_id(), definition);
        }
        Ok(committed)
    }

    /// Edit the event with this subject and exact start.
    ///
    /// Returns `Ok(false)` if the edit would collide with another event, in
    /// which case nothing changes.
    pub fn edit_single_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        edit: &EventEdit,
    ) -> CalbookResult<bool> {
        let id = self.find_event(subject, start)?.id;
        match conflict::try_update(&mut self.index, id, edit) {
            Ok(()) => Ok(true),
            Err(err) if err.is_conflict() => {
                debug!(calendar = %self.name, %id, error = %err, "edit declined");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Edit every event with this subject starting at or after `from`.
    /// Each event is edited independently; returns how many were changed.
    pub fn edit_events_from(&mut self, subject: &str, from: NaiveDateTime, edit: &EventEdit) -> usize {
        let ids: Vec<EventId> = self
            .index
            .starting_from(from)
            .filter(|event| event.subject == subject)
            .map(|event| event.id)
            .collect();
        self.edit_each(&ids, edit)
    }

    /// Edit every event with this subject. Each event is edited
    /// independently; returns how many were changed.
    pub fn edit_all_events(&mut self, subject: &str, edit: &EventEdit) -> usize {
        let ids: Vec<EventId> = self
            .index
            .by_subject(subject)
            .into_iter()
            .map(|event| event.id)
            .collect();
        self.edit_each(&ids, edit)
    }

    fn edit_each(&mut self, ids: &[EventId], edit: &EventEdit) -> usize {
        let mut applied = 0;
        for &id in ids {
            match conflict::try_update(&mut self.index, id, edit) {
                Ok(()) => applied += 1,
                Err(err) => {
                    warn!(calendar = %self.name, %id, property = edit.property(), error = %err, "skipped event");
                }
            }
        }
        applied
    }

    pub fn remove_event(&mut self, id: EventId) -> CalbookResult<Event> {
        self.index
            .remove(id)
            .ok_or_else(|| CalbookError::NotFound(format!("event {}", id)))
    }

    // READS:

    pub fn get_event(&self, id: EventId) -> CalbookResult<&Event> {
        self.index
            .get(id)
            .ok_or_else(|| CalbookError::NotFound(format!("event {}", id)))
    }

    /// First event (in time order) with this subject and exact start.
    pub fn find_event(&self, subject: &str, start: NaiveDateTime) -> CalbookResult<&Event> {
        self.index
            .by_subject(subject)
            .into_iter()
            .find(|event| event.start == start)
            .ok_or_else(|| {
                CalbookError::NotFound(format!("no event '{}' starting at {}", subject, start))
            })
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        self.index.on_date(date)
    }

    /// Events touching any date in `[start, end]`.
    pub fn events_in_range(&self, start: NaiveDate, end: NaiveDate) -> CalbookResult<Vec<&Event>> {
        Ok(self.index.in_range(DateRange::new(start, end)?))
    }

    /// Events whose `[start, end]` overlaps the closed window `[from, to]`.
    pub fn events_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> CalbookResult<Vec<&Event>> {
        if to < from {
            return Err(CalbookError::Validation(format!(
                "window end {} is before window start {}",
                to, from
            )));
        }
        Ok(self
            .index
            .in_range(DateRange::new(from.date(), to.date())?)
            .into_iter()
            .filter(|event| event.start <= to && from <= event.end)
            .collect())
    }

    pub fn all_events(&self) -> Vec<&Event> {
        self.index.all()
    }

    pub fn recurring_definitions(&self) -> Vec<&RecurrenceDefinition> {
        self.series.values().collect()
    }

    pub fn recurring_definition(&self, series_id: SeriesId) -> CalbookResult<&RecurrenceDefinition> {
        self.series
            .get(&series_id)
            .ok_or_else(|| CalbookError::NotFound(format!("series {}", series_id)))
    }

    /// Committed events that were expanded from this series, in time order.
    pub fn series_events(&self, series_id: SeriesId) -> Vec<&Event> {
        self.index
            .iter()
            .filter(|event| event.series_id == Some(series_id))
            .collect()
    }

    /// True if any timed event contains `instant` or any all-day event falls
    /// on its date.
    pub fn is_busy_at(&self, instant: NaiveDateTime) -> bool {
        self.index
            .on_date(instant.date())
            .iter()
            .any(|event| event.is_busy_at(instant))
    }
}
