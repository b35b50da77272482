//! Runs parsed commands against the calendar registry.

use anyhow::{Context, Result};
use calbook_core::{
    CalbookConfig, CalendarRegistry, Event, RecurrenceDefinition, export_to_path,
};
use chrono::NaiveDateTime;
use tracing::debug;

use crate::command::{CalendarProperty, Command, When};

/// What a command produced, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Done(String),
    /// A lenient add or edit that collided and changed nothing.
    Declined(String),
    Events {
        heading: String,
        events: Vec<Event>,
    },
    Series(Vec<RecurrenceDefinition>),
    Status {
        at: NaiveDateTime,
        busy: bool,
    },
    Exit,
}

pub struct Session {
    registry: CalendarRegistry,
    config: CalbookConfig,
}

impl Session {
    /// A session with the configured default calendar created and in use.
    pub fn new(config: CalbookConfig) -> Result<Self> {
        let mut registry = CalendarRegistry::new();
        registry
            .create(&config.default_calendar, &config.default_timezone)
            .context("Could not create the default calendar")?;

        Ok(Session { registry, config })
    }

    pub fn registry(&self) -> &CalendarRegistry {
        &self.registry
    }

    /// Name of the calendar commands currently apply to.
    pub fn active_name(&self) -> &str {
        self.registry.active_name().unwrap_or_default()
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!(?command, "executing");

        match command {
            Command::CreateCalendar { name, timezone } => {
                self.registry.create(&name, &timezone)?;
                Ok(Reply::Done(format!("Created calendar {} ({})", name, timezone)))
            }
            Command::EditCalendar {
                name,
                property,
                value,
            } => match property {
                CalendarProperty::Name => {
                    self.registry.rename(&name, &value)?;
                    Ok(Reply::Done(format!("Renamed calendar {} to {}", name, value)))
                }
                CalendarProperty::Timezone => {
                    self.registry.set_timezone(&name, &value)?;
                    Ok(Reply::Done(format!("Calendar {} now uses {}", name, value)))
                }
            },
            Command::UseCalendar { name } => {
                self.registry.use_calendar(&name)?;
                Ok(Reply::Done(format!("Using calendar {}", name)))
            }
            Command::CreateEvent {
                subject,
                when,
                repeat,
                auto_decline,
            } => {
                let strict = auto_decline || self.config.auto_decline;
                let event = match when {
                    When::Timed { start, end } => Event::timed(&subject, start, end)?,
                    When::AllDay(date) => Event::all_day(&subject, date)?,
                };
                let calendar = self.registry.active_mut()?;

                let (added, what) = match repeat {
                    Some(repeat) => {
                        let definition =
                            RecurrenceDefinition::new(event, repeat.weekdays, repeat.termination)?;
                        let count = definition.occurrences().len();
                        let added = calendar.add_recurring_event(definition, strict)?;
                        (added, format!("series {} ({} occurrences)", subject, count))
                    }
                    None => (calendar.add_event(event, strict)?, format!("event {}", subject)),
                };

                if added {
                    Ok(Reply::Done(format!("Created {}", what)))
                } else {
                    Ok(Reply::Declined(format!(
                        "Skipped {}: it conflicts with an existing event",
                        what
                    )))
                }
            }
            Command::EditEvent {
                subject,
                start,
                edit,
            } => {
                let applied = self
                    .registry
                    .active_mut()?
                    .edit_single_event(&subject, start, &edit)?;
                if applied {
                    Ok(Reply::Done(format!("Updated {} of {}", edit.property(), subject)))
                } else {
                    Ok(Reply::Declined(format!(
                        "Left {} unchanged: the new {} conflicts with another event",
                        subject,
                        edit.property()
                    )))
                }
            }
            Command::EditEventsFrom {
                subject,
                from,
                edit,
            } => {
                let count = self
                    .registry
                    .active_mut()?
                    .edit_events_from(&subject, from, &edit);
                Ok(Reply::Done(updated(count, &subject)))
            }
            Command::EditAllEvents { subject, edit } => {
                let count = self.registry.active_mut()?.edit_all_events(&subject, &edit);
                Ok(Reply::Done(updated(count, &subject)))
            }
            Command::PrintOn { date } => {
                let events = self.registry.active()?.events_on(date);
                Ok(Reply::Events {
                    heading: format!("Events on {}", date),
                    events: events.into_iter().cloned().collect(),
                })
            }
            Command::PrintRange { from, to } => {
                let events = self.registry.active()?.events_between(from, to)?;
                Ok(Reply::Events {
                    heading: format!("Events from {} to {}", from, to),
                    events: events.into_iter().cloned().collect(),
                })
            }
            Command::PrintSeries => {
                let series = self.registry.active()?.recurring_definitions();
                Ok(Reply::Series(series.into_iter().cloned().collect()))
            }
            Command::ShowStatus { at } => Ok(Reply::Status {
                at,
                busy: self.registry.active()?.is_busy_at(at),
            }),
            Command::Export { file } => {
                let path = self.config.resolve_export_file(&file);
                let written = export_to_path(self.registry.active()?, &path)?;
                Ok(Reply::Done(format!("Exported to {}", written.display())))
            }
            Command::Exit => Ok(Reply::Exit),
        }
    }
}

fn updated(count: usize, subject: &str) -> String {
    let noun = if count == 1 { "event" } else { "events" };
    format!("Updated {} {} named {}", count, noun, subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(CalbookConfig::default()).unwrap()
    }

    fn run(session: &mut Session, line: &str) -> Result<Reply> {
        session.execute(Command::parse(line)?)
    }

    #[test]
    fn starts_with_default_calendar() {
        let session = session();
        assert_eq!(session.active_name(), "default");
        assert_eq!(
            session.registry().active().unwrap().timezone(),
            "America/New_York"
        );
    }

    #[test]
    fn lenient_create_reports_decline() {
        let mut s = session();
        run(&mut s, "create event A from 2024-01-10T09:00 to 2024-01-10T10:00").unwrap();
        let reply = run(&mut s, "create event B from 2024-01-10T10:00 to 2024-01-10T11:00").unwrap();
        assert!(matches!(reply, Reply::Declined(_)));
        assert_eq!(s.registry().active().unwrap().len(), 1);
    }

    #[test]
    fn auto_decline_create_is_an_error() {
        let mut s = session();
        run(&mut s, "create event A from 2024-01-10T09:00 to 2024-01-10T10:00").unwrap();
        let err = run(
            &mut s,
            "create event --autoDecline B from 2024-01-10T09:30 to 2024-01-10T11:00",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Conflict"));
    }

    #[test]
    fn config_auto_decline_makes_every_create_strict() {
        let config = CalbookConfig {
            auto_decline: true,
            ..CalbookConfig::default()
        };
        let mut s = Session::new(config).unwrap();
        run(&mut s, "create event A on 2024-01-10").unwrap();
        assert!(run(&mut s, "create event B on 2024-01-10").is_err());
    }

    #[test]
    fn series_and_status() {
        let mut s = session();
        let reply = run(
            &mut s,
            "create event Standup from 2023-05-08T09:00 to 2023-05-08T10:00 repeats MWF for 3 times",
        )
        .unwrap();
        assert_eq!(reply, Reply::Done("Created series Standup (3 occurrences)".into()));

        let Reply::Series(series) = run(&mut s, "print series").unwrap() else {
            panic!("expected series");
        };
        assert_eq!(series.len(), 1);

        assert_eq!(
            run(&mut s, "show status on 2023-05-10T09:30").unwrap(),
            Reply::Status {
                at: calbook_core::parse_datetime("2023-05-10T09:30").unwrap(),
                busy: true,
            }
        );
        let Reply::Status { busy, .. } = run(&mut s, "show status on 2023-05-09T09:30").unwrap() else {
            panic!("expected status");
        };
        assert!(!busy);
    }

    #[test]
    fn edits_go_to_the_active_calendar() {
        let mut s = session();
        run(&mut s, "create calendar --name home --timezone Europe/London").unwrap();
        run(&mut s, "use calendar --name home").unwrap();
        run(&mut s, "create event Dinner from 2024-01-10T19:00 to 2024-01-10T21:00").unwrap();

        let reply = run(&mut s, "edit events location Dinner \"Nonna's\"").unwrap();
        assert_eq!(reply, Reply::Done("Updated 1 event named Dinner".into()));

        let Reply::Events { events, .. } = run(&mut s, "print events on 2024-01-10").unwrap() else {
            panic!("expected events");
        };
        assert_eq!(events[0].location, "Nonna's");
        assert_eq!(events[0].timezone, "Europe/London");
        assert!(s.registry().get("default").unwrap().is_empty());
    }

    #[test]
    fn conflicting_single_edit_is_declined() {
        let mut s = session();
        run(&mut s, "create event A from 2024-01-10T09:00 to 2024-01-10T10:00").unwrap();
        run(&mut s, "create event B from 2024-01-10T11:00 to 2024-01-10T12:00").unwrap();
        let reply = run(&mut s, "edit event end A from 2024-01-10T09:00 with 2024-01-10T11:00").unwrap();
        assert!(matches!(reply, Reply::Declined(_)));
    }

    #[test]
    fn print_range_uses_closed_window() {
        let mut s = session();
        run(&mut s, "create event A from 2024-01-10T09:00 to 2024-01-10T10:00").unwrap();
        run(&mut s, "create event B from 2024-01-11T09:00 to 2024-01-11T10:00").unwrap();

        let Reply::Events { events, .. } =
            run(&mut s, "print events from 2024-01-10T10:00 to 2024-01-11T08:59").unwrap()
        else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, "A");
    }

    #[test]
    fn rename_and_retimezone_calendar() {
        let mut s = session();
        run(&mut s, "edit calendar --name default --property name personal").unwrap();
        run(&mut s, "edit calendar --name personal --property timezone Asia/Tokyo").unwrap();
        assert_eq!(s.active_name(), "personal");
        assert_eq!(s.registry().active().unwrap().timezone(), "Asia/Tokyo");
        assert!(run(&mut s, "edit calendar --name personal --property timezone Not/AZone").is_err());
    }

    #[test]
    fn export_writes_into_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        run(&mut s, "create event A on 2024-01-10").unwrap();

        let target = dir.path().join("out.csv");
        let line = format!("export cal \"{}\"", target.display());
        let reply = run(&mut s, &line).unwrap();

        assert!(matches!(reply, Reply::Done(msg) if msg.starts_with("Exported to")));
        assert!(target.exists());
    }
}
