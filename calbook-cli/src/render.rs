//! TUI rendering traits for calbook types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to calbook-core types using owo_colors.

use calbook_core::{Event, RecurrenceDefinition, Termination};
use owo_colors::OwoColorize;

use crate::session::Reply;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Human-readable span of an event.
pub fn render_event_time(event: &Event) -> String {
    if event.all_day {
        return format!("{} (all day)", event.start_date());
    }
    if event.is_multi_day() {
        return format!(
            "{} to {}",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%Y-%m-%d %H:%M")
        );
    }
    format!(
        "{} {}-{}",
        event.start_date(),
        event.start.format("%H:%M"),
        event.end.format("%H:%M")
    )
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.subject.bold(), render_event_time(self).dimmed());
        if !self.location.is_empty() {
            line.push_str(&format!(" @ {}", self.location));
        }
        if !self.visibility.is_public() {
            line.push_str(&format!(" {}", "(private)".dimmed()));
        }
        line
    }
}

impl Render for RecurrenceDefinition {
    fn render(&self) -> String {
        let ends = match self.termination() {
            Termination::ByCount(n) => format!("{} times", n),
            Termination::ByEndDate(date) => format!("until {}", date),
        };
        format!(
            "{} {} {}",
            self.subject().bold(),
            render_event_time(self.template()).dimmed(),
            format!("repeats {} {}", self.weekdays(), ends).cyan()
        )
    }
}

impl Render for Reply {
    fn render(&self) -> String {
        match self {
            Reply::Done(message) => format!("  {}", message.green()),
            Reply::Declined(message) => format!("  {}", message.yellow()),
            Reply::Events { heading, events } => {
                let mut lines = vec![heading.bold().to_string()];
                if events.is_empty() {
                    lines.push(format!("  {}", "No events".dimmed()));
                }
                lines.extend(events.iter().map(|e| format!("  - {}", e.render())));
                lines.join("\n")
            }
            Reply::Series(series) => {
                if series.is_empty() {
                    return format!("  {}", "No recurring events".dimmed());
                }
                series
                    .iter()
                    .map(|s| format!("  - {}", s.render()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Reply::Status { at, busy } => {
                let status = if *busy {
                    "busy".red().to_string()
                } else {
                    "available".green().to_string()
                };
                format!("  {} at {}", status, at.format("%Y-%m-%d %H:%M"))
            }
            Reply::Exit => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calbook_core::{Weekdays, parse_date, parse_datetime};

    fn timed(start: &str, end: &str) -> Event {
        Event::timed(
            "Standup",
            parse_datetime(start).unwrap(),
            parse_datetime(end).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn event_time_same_day() {
        let event = timed("2024-01-10T09:00", "2024-01-10T09:15");
        assert_eq!(render_event_time(&event), "2024-01-10 09:00-09:15");
    }

    #[test]
    fn event_time_multi_day() {
        let event = timed("2024-01-10T22:00", "2024-01-11T02:00");
        assert_eq!(
            render_event_time(&event),
            "2024-01-10 22:00 to 2024-01-11 02:00"
        );
    }

    #[test]
    fn event_time_all_day() {
        let event = Event::all_day("Holiday", parse_date("2024-12-25").unwrap()).unwrap();
        assert_eq!(render_event_time(&event), "2024-12-25 (all day)");
    }

    #[test]
    fn series_shows_pattern_and_end() {
        let definition = RecurrenceDefinition::new(
            timed("2024-01-08T09:00", "2024-01-08T09:15"),
            Weekdays::parse("fwm").unwrap(),
            Termination::ByCount(4),
        )
        .unwrap();
        let rendered = definition.render();
        assert!(rendered.contains("repeats MWF 4 times"), "{}", rendered);
    }

    #[test]
    fn empty_event_list_says_so() {
        let reply = Reply::Events {
            heading: "Events on 2024-01-10".into(),
            events: vec![],
        };
        assert!(reply.render().contains("No events"));
    }
}
