//! iCalendar export.

use chrono::Duration;
use icalendar::{Component, EventLike, Property, ValueType};

use crate::calendar::Calendar;
use crate::error::CalbookResult;
use crate::event::Event;

/// Generate a VCALENDAR holding every event of `calendar`.
///
/// Timed events carry the calendar's timezone as a TZID parameter. All-day
/// events are written as VALUE=DATE with the exclusive end date RFC 5545
/// expects.
pub fn generate_ics(calendar: &Calendar) -> CalbookResult<String> {
    let mut cal = icalendar::Calendar::new();
    cal.name(calendar.name());
    cal.timezone(calendar.timezone());

    for event in calendar.all_events() {
        cal.push(ics_event(event, calendar.timezone()));
    }
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

fn ics_event(event: &Event, timezone: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.id.to_string());
    ics_event.summary(&event.subject);

    if event.all_day {
        let start = event.start_date();
        let end = start + Duration::days(1);
        add_date_property(&mut ics_event, "DTSTART", &start.format("%Y%m%d").to_string());
        add_date_property(&mut ics_event, "DTEND", &end.format("%Y%m%d").to_string());
    } else {
        add_zoned_property(&mut ics_event, "DTSTART", &event.start.format("%Y%m%dT%H%M%S").to_string(), timezone);
        add_zoned_property(&mut ics_event, "DTEND", &event.end.format("%Y%m%dT%H%M%S").to_string(), timezone);
    }

    if !event.description.is_empty() {
        ics_event.description(&event.description);
    }
    if !event.location.is_empty() {
        ics_event.location(&event.location);
    }
    // PUBLIC is the implied default
    if !event.visibility.is_public() {
        ics_event.add_property("CLASS", "PRIVATE");
    }
    if let Some(series_id) = event.series_id {
        ics_event.add_property("RELATED-TO", series_id.to_string());
    }

    ics_event.done()
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, value: &str) {
    let mut prop = Property::new(name, value);
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, value: &str, tzid: &str) {
    let mut prop = Property::new(name, value);
    if !tzid.is_empty() {
        prop.add_parameter("TZID", tzid);
    }
    ics_event.append_property(prop);
}

/// Replace the icalendar crate's PRODID with ours and drop CALSCALE:GREGORIAN,
/// which is the default.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//calbook//EN\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
