//! Overlap detection and the validate-then-commit gate for writes.
//!
//! Two events conflict when their closed intervals `[start, end]` share any
//! instant, so an event ending at 11:00 conflicts with one starting at 11:00.
//! Nothing reaches the index unless the whole write has been checked first.

use tracing::debug;

use crate::date_range::DateRange;
use crate::error::{CalbookError, CalbookResult};
use crate::event::{Event, EventEdit, EventId};
use crate::index::EventIndex;

/// Closed-interval overlap between two events.
pub fn conflicts(a: &Event, b: &Event) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// First indexed event that overlaps `candidate`, ignoring the event with
/// id `exclude` (the event being edited).
pub fn find_conflict<'a>(
    index: &'a EventIndex,
    candidate: &Event,
    exclude: Option<EventId>,
) -> Option<&'a Event> {
    // Anything overlapping must touch one of the candidate's dates.
    let range = DateRange {
        start: candidate.start_date(),
        end: candidate.end_date(),
    };
    index
        .in_range(range)
        .into_iter()
        .filter(|existing| Some(existing.id) != exclude)
        .find(|existing| conflicts(candidate, existing))
}

fn conflict_error(candidate: &Event, existing: &Event) -> CalbookError {
    CalbookError::Conflict(format!(
        "'{}' ({} to {}) overlaps '{}' ({} to {})",
        candidate.subject, candidate.start, candidate.end, existing.subject, existing.start, existing.end
    ))
}

/// Commit `event` if it collides with nothing.
///
/// On collision a strict add fails with [`CalbookError::Conflict`]; a lenient
/// add returns `Ok(false)`. Either way the index is untouched.
pub fn try_add(index: &mut EventIndex, event: Event, strict: bool) -> CalbookResult<bool> {
    event.validate()?;

    if let Some(existing) = find_conflict(index, &event, None) {
        if strict {
            return Err(conflict_error(&event, existing));
        }
        debug!(subject = %event.subject, with = %existing.subject, "declined conflicting event");
        return Ok(false);
    }

    index.insert(event);
    Ok(true)
}

/// Commit every occurrence of a series, or none of them.
///
/// Each candidate is checked against the index and against the candidates
/// before it. A strict add stops at the first collision with an error; a
/// lenient add returns `Ok(false)`.
pub fn try_add_series(
    index: &mut EventIndex,
    occurrences: Vec<Event>,
    strict: bool,
) -> CalbookResult<bool> {
    for (i, candidate) in occurrences.iter().enumerate() {
        candidate.validate()?;

        let collision = find_conflict(index, candidate, None)
            .or_else(|| occurrences[..i].iter().find(|earlier| conflicts(candidate, earlier)));

        if let Some(existing) = collision {
            if strict {
                return Err(conflict_error(candidate, existing));
            }
            debug!(
                subject = %candidate.subject,
                with = %existing.subject,
                "declined conflicting series"
            );
            return Ok(false);
        }
    }

    for occurrence in occurrences {
        index.insert(occurrence);
    }
    Ok(true)
}

/// Apply `edit` to the event `id` if the edited event collides with nothing
/// else. On any error the event and every index are left as they were.
pub fn try_update(index: &mut EventIndex, id: EventId, edit: &EventEdit) -> CalbookResult<()> {
    let current = index
        .get(id)
        .ok_or_else(|| CalbookError::NotFound(format!("event {}", id)))?;

    let mut shadow = current.clone();
    shadow.apply(edit)?;

    if let Some(existing) = find_conflict(index, &shadow, Some(id)) {
        return Err(conflict_error(&shadow, existing));
    }

    index.replace(shadow);
    Ok(())
}
