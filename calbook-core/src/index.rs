//! Id-keyed event storage with derived lookup structures.
//!
//! The id map owns every event. The date, subject and time-order structures
//! hold ids only and are rebuilt for an event whenever it is inserted,
//! replaced or removed. Empty buckets are dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::date_range::DateRange;
use crate::event::{Event, EventId};

#[derive(Debug, Default, Clone)]
pub struct EventIndex {
    events: HashMap<EventId, Event>,
    /// Keyed by the event's start date.
    by_date: BTreeMap<NaiveDate, BTreeSet<EventId>>,
    by_subject: HashMap<String, BTreeSet<EventId>>,
    by_time: BTreeSet<(NaiveDateTime, EventId)>,
    /// Events whose span crosses midnight and so cannot be found by their
    /// start-date bucket alone.
    multi_day: BTreeSet<EventId>,
}

impl EventIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.events.contains_key(&id)
    }

    /// Insert an event, replacing any event that already has its id.
    pub fn insert(&mut self, event: Event) -> Option<Event> {
        let replaced = self.remove(event.id);
        debug!(id = %event.id, subject = %event.subject, "indexing event");
        self.link(&event);
        self.events.insert(event.id, event);
        replaced
    }

    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        let event = self.events.remove(&id)?;
        self.unlink(&event);
        debug!(id = %id, subject = %event.subject, "removed event");
        Some(event)
    }

    /// Overwrite an existing event in place, touching only the secondary
    /// structures keyed by fields that actually changed. Returns false if no
    /// event has this id.
    pub fn replace(&mut self, updated: Event) -> bool {
        let Some(current) = self.events.get(&updated.id) else {
            return false;
        };

        let subject_changed = current.subject != updated.subject;
        let span_changed = current.start != updated.start || current.end != updated.end;
        let current = current.clone();

        if subject_changed {
            detach_subject(&mut self.by_subject, &current.subject, current.id);
            self.by_subject
                .entry(updated.subject.clone())
                .or_default()
                .insert(updated.id);
        }
        if span_changed {
            self.unlink_span(&current);
            self.link_span(&updated);
        }

        self.events.insert(updated.id, updated);
        true
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Events with exactly this subject, in time order.
    pub fn by_subject(&self, subject: &str) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .filter_map(|id| self.events.get(id))
            .collect();
        sort_by_time(&mut events);
        events
    }

    /// Events whose span touches `date`, in time order.
    pub fn on_date(&self, date: NaiveDate) -> Vec<&Event> {
        self.in_range(DateRange::single(date))
    }

    /// Events whose span shares at least one date with `range`, in time order.
    pub fn in_range(&self, range: DateRange) -> Vec<&Event> {
        let mut ids: BTreeSet<EventId> = self
            .by_date
            .range(range.start..=range.end)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();

        ids.extend(self.multi_day.iter().copied().filter(|id| {
            self.events
                .get(id)
                .is_some_and(|e| range.overlaps(e.start_date(), e.end_date()))
        }));

        let mut events: Vec<&Event> = ids.iter().filter_map(|id| self.events.get(id)).collect();
        sort_by_time(&mut events);
        events
    }

    /// Every event, ordered by start then id.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.by_time.iter().filter_map(|(_, id)| self.events.get(id))
    }

    pub fn all(&self) -> Vec<&Event> {
        self.iter().collect()
    }

    /// Events starting at or after `from`, in time order.
    pub fn starting_from(&self, from: NaiveDateTime) -> impl Iterator<Item = &Event> + '_ {
        self.by_time
            .range((from, EventId::MIN)..)
            .filter_map(|(_, id)| self.events.get(id))
    }

    /// Relabel every event's timezone. No secondary structure depends on it.
    pub fn relabel_timezone(&mut self, timezone: &str) {
        for event in self.events.values_mut() {
            event.timezone = timezone.to_string();
        }
    }

    fn link(&mut self, event: &Event) {
        self.by_subject
            .entry(event.subject.clone())
            .or_default()
            .insert(event.id);
        self.link_span(event);
    }

    fn unlink(&mut self, event: &Event) {
        detach_subject(&mut self.by_subject, &event.subject, event.id);
        self.unlink_span(event);
    }

    fn link_span(&mut self, event: &Event) {
        self.by_date
            .entry(event.start_date())
            .or_default()
            .insert(event.id);
        self.by_time.insert((event.start, event.id));
        if event.is_multi_day() {
            self.multi_day.insert(event.id);
        }
    }

    fn unlink_span(&mut self, event: &Event) {
        detach_date(&mut self.by_date, event.start_date(), event.id);
        self.by_time.remove(&(event.start, event.id));
        self.multi_day.remove(&event.id);
    }
}

fn detach_subject(buckets: &mut HashMap<String, BTreeSet<EventId>>, subject: &str, id: EventId) {
    if let Some(ids) = buckets.get_mut(subject) {
        ids.remove(&id);
        if ids.is_empty() {
            buckets.remove(subject);
        }
    }
}

fn detach_date(buckets: &mut BTreeMap<NaiveDate, BTreeSet<EventId>>, date: NaiveDate, id: EventId) {
    if let Some(ids) = buckets.get_mut(&date) {
        ids.remove(&id);
        if ids.is_empty() {
            buckets.remove(&date);
        }
    }
}

fn sort_by_time(events: &mut [&Event]) {
    events.sort_by(|a, b| (a.start, a.id).cmp(&(b.start, b.id)));
}
