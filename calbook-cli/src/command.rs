//! The text command language.
//!
//! One command per line. Tokens are separated by whitespace and a double
//! quoted token may contain spaces, so in
//! `create event "Team sync" on 2024-03-04` the subject is `Team sync`.

use anyhow::{Context, Result, bail};
use calbook_core::{EventEdit, Termination, Weekdays, parse_date, parse_datetime};
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProperty {
    Name,
    Timezone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat {
    pub weekdays: Weekdays,
    pub termination: Termination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateCalendar {
        name: String,
        timezone: String,
    },
    EditCalendar {
        name: String,
        property: CalendarProperty,
        value: String,
    },
    UseCalendar {
        name: String,
    },
    CreateEvent {
        subject: String,
        when: When,
        repeat: Option<Repeat>,
        auto_decline: bool,
    },
    EditEvent {
        subject: String,
        start: NaiveDateTime,
        edit: EventEdit,
    },
    EditEventsFrom {
        subject: String,
        from: NaiveDateTime,
        edit: EventEdit,
    },
    EditAllEvents {
        subject: String,
        edit: EventEdit,
    },
    PrintOn {
        date: NaiveDate,
    },
    PrintRange {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    PrintSeries,
    ShowStatus {
        at: NaiveDateTime,
    },
    Export {
        file: String,
    },
    Exit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = Tokens::new(tokenize(line)?);
        let verb = tokens.next("a command")?.to_ascii_lowercase();

        let command = match verb.as_str() {
            "create" => match tokens.next("calendar or event")?.to_ascii_lowercase().as_str() {
                "calendar" => parse_create_calendar(&mut tokens)?,
                "event" => parse_create_event(&mut tokens)?,
                other => bail!("Unknown create target '{}'. Expected calendar or event", other),
            },
            "edit" => match tokens.next("calendar, event or events")?.to_ascii_lowercase().as_str() {
                "calendar" => parse_edit_calendar(&mut tokens)?,
                "event" => parse_edit_event(&mut tokens)?,
                "events" => parse_edit_events(&mut tokens)?,
                other => bail!("Unknown edit target '{}'. Expected calendar, event or events", other),
            },
            "use" => {
                tokens.keyword("calendar")?;
                tokens.keyword("--name")?;
                Command::UseCalendar {
                    name: tokens.next("a calendar name")?,
                }
            }
            "print" => parse_print(&mut tokens)?,
            "show" => {
                tokens.keyword("status")?;
                tokens.keyword("on")?;
                Command::ShowStatus {
                    at: parse_datetime(&tokens.next("a date-time")?)?,
                }
            }
            "export" => {
                tokens.keyword("cal")?;
                Command::Export {
                    file: tokens.next("a file name")?,
                }
            }
            "exit" => Command::Exit,
            other => bail!("Unknown command '{}'", other),
        };

        tokens.finish()?;
        Ok(command)
    }
}

fn parse_create_calendar(tokens: &mut Tokens) -> Result<Command> {
    tokens.keyword("--name")?;
    let name = tokens.next("a calendar name")?;
    tokens.keyword("--timezone")?;
    let timezone = tokens.next("a timezone")?;
    Ok(Command::CreateCalendar { name, timezone })
}

fn parse_edit_calendar(tokens: &mut Tokens) -> Result<Command> {
    tokens.keyword("--name")?;
    let name = tokens.next("a calendar name")?;
    tokens.keyword("--property")?;
    let property = match tokens.next("name or timezone")?.to_ascii_lowercase().as_str() {
        "name" => CalendarProperty::Name,
        "timezone" => CalendarProperty::Timezone,
        other => bail!("Calendars have no property '{}'. Expected name or timezone", other),
    };
    let value = tokens.next("a value")?;
    Ok(Command::EditCalendar {
        name,
        property,
        value,
    })
}

fn parse_create_event(tokens: &mut Tokens) -> Result<Command> {
    let auto_decline = tokens.flag("--autoDecline");
    let subject = tokens.next("an event subject")?;

    let when = match tokens.next("from or on")?.to_ascii_lowercase().as_str() {
        "from" => {
            let start = parse_datetime(&tokens.next("a start date-time")?)?;
            tokens.keyword("to")?;
            let end = parse_datetime(&tokens.next("an end date-time")?)?;
            When::Timed { start, end }
        }
        "on" => When::AllDay(parse_date(&tokens.next("a date")?)?),
        other => bail!("Expected from or on after the subject, got '{}'", other),
    };

    let repeat = if tokens.flag("repeats") {
        Some(parse_repeat(tokens)?)
    } else {
        None
    };

    Ok(Command::CreateEvent {
        subject,
        when,
        repeat,
        auto_decline,
    })
}

fn parse_repeat(tokens: &mut Tokens) -> Result<Repeat> {
    let weekdays: Weekdays = tokens.next("repeat days like MWF")?.parse()?;

    let termination = match tokens.next("for or until")?.to_ascii_lowercase().as_str() {
        "for" => {
            let raw = tokens.next("an occurrence count")?;
            let count: u32 = raw
                .parse()
                .with_context(|| format!("'{}' is not a valid occurrence count", raw))?;
            tokens.keyword("times")?;
            Termination::ByCount(count)
        }
        "until" => Termination::ByEndDate(parse_date(&tokens.next("an end date")?)?),
        other => bail!("Expected for or until after the repeat days, got '{}'", other),
    };

    Ok(Repeat {
        weekdays,
        termination,
    })
}

fn parse_edit_event(tokens: &mut Tokens) -> Result<Command> {
    let property = tokens.next("a property")?;
    let subject = tokens.next("an event subject")?;
    tokens.keyword("from")?;
    let start = parse_datetime(&tokens.next("a start date-time")?)?;
    tokens.keyword("with")?;
    let edit = EventEdit::parse(&property, &tokens.next("a new value")?)?;
    Ok(Command::EditEvent {
        subject,
        start,
        edit,
    })
}

fn parse_edit_events(tokens: &mut Tokens) -> Result<Command> {
    let property = tokens.next("a property")?;
    let subject = tokens.next("an event subject")?;

    if tokens.flag("from") {
        let from = parse_datetime(&tokens.next("a start date-time")?)?;
        tokens.keyword("with")?;
        let edit = EventEdit::parse(&property, &tokens.next("a new value")?)?;
        return Ok(Command::EditEventsFrom {
            subject,
            from,
            edit,
        });
    }

    let edit = EventEdit::parse(&property, &tokens.next("a new value")?)?;
    Ok(Command::EditAllEvents { subject, edit })
}

fn parse_print(tokens: &mut Tokens) -> Result<Command> {
    match tokens.next("events or series")?.to_ascii_lowercase().as_str() {
        "series" => Ok(Command::PrintSeries),
        "events" => match tokens.next("on or from")?.to_ascii_lowercase().as_str() {
            "on" => Ok(Command::PrintOn {
                date: parse_date(&tokens.next("a date")?)?,
            }),
            "from" => {
                let from = parse_datetime(&tokens.next("a start date-time")?)?;
                tokens.keyword("to")?;
                let to = parse_datetime(&tokens.next("an end date-time")?)?;
                Ok(Command::PrintRange { from, to })
            }
            other => bail!("Expected on or from after print events, got '{}'", other),
        },
        other => bail!("Unknown print target '{}'. Expected events or series", other),
    }
}

/// Split a line into tokens, honouring double quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        bail!("Unterminated quote in: {}", line);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

struct Tokens {
    tokens: Vec<String>,
    pos: usize,
}

impl Tokens {
    fn new(tokens: Vec<String>) -> Self {
        Tokens { tokens, pos: 0 }
    }

    fn next(&mut self, expected: &str) -> Result<String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .with_context(|| format!("Expected {} but the command ended", expected))?;
        self.pos += 1;
        Ok(token)
    }

    fn keyword(&mut self, keyword: &str) -> Result<()> {
        let token = self.next(keyword)?;
        if !token.eq_ignore_ascii_case(keyword) {
            bail!("Expected '{}', got '{}'", keyword, token);
        }
        Ok(())
    }

    /// Consume the next token if it is `keyword`.
    fn flag(&mut self, keyword: &str) -> bool {
        let matches = self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.eq_ignore_ascii_case(keyword));
        if matches {
            self.pos += 1;
        }
        matches
    }

    fn finish(&self) -> Result<()> {
        if let Some(extra) = self.tokens.get(self.pos) {
            bail!("Unexpected '{}' at the end of the command", extra);
        }
        Ok(())
    }
}
