//! CSV export in the column layout spreadsheet and calendar imports expect.

use crate::calendar::Calendar;
use crate::event::Event;

const HEADER: &str =
    "Subject,Start Date,Start Time,End Date,End Time,All Day Event,Description,Location,Private";

const DATE_FORMAT: &str = "%m/%d/%Y";
const TIME_FORMAT: &str = "%I:%M %p";

/// One header line plus one row per event, in start-time order.
pub fn generate_csv(calendar: &Calendar) -> String {
    let mut out = String::from(HEADER);
    out.push_str("\r\n");

    for event in calendar.all_events() {
        out.push_str(&row(event));
        out.push_str("\r\n");
    }
    out
}

fn row(event: &Event) -> String {
    let (start_time, end_time) = if event.all_day {
        (String::new(), String::new())
    } else {
        (
            event.start.format(TIME_FORMAT).to_string(),
            event.end.format(TIME_FORMAT).to_string(),
        )
    };

    let fields = [
        quote(&event.subject),
        event.start.format(DATE_FORMAT).to_string(),
        start_time,
        event.end.format(DATE_FORMAT).to_string(),
        end_time,
        flag(event.all_day).to_string(),
        quote(&event.description),
        quote(&event.location),
        flag(!event.visibility.is_public()).to_string(),
    ];
    fields.join(",")
}

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Quote a field if it holds a comma, quote or line break, doubling any
/// embedded quotes.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
