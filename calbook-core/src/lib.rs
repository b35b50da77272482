//! Core types for calbook.
//!
//! This crate holds everything the CLI drives:
//! - `Event`, `RecurrenceDefinition` and the `EventIndex` that stores events
//! - `conflict` for the overlap rules every write goes through
//! - `Calendar` and `CalendarRegistry` for named calendars
//! - `export` for CSV and iCalendar output

pub mod calendar;
pub mod config;
pub mod conflict;
pub mod date_range;
pub mod error;
pub mod event;
pub mod export;
pub mod index;
pub mod recurrence;
pub mod registry;
pub mod weekdays;

pub use calendar::Calendar;
pub use config::CalbookConfig;
pub use date_range::{DateRange, parse_date, parse_datetime};
pub use error::{CalbookError, CalbookResult};
pub use event::{Event, EventEdit, EventId, Visibility};
pub use export::{ExportFormat, export_to_path};
pub use index::EventIndex;
pub use recurrence::{Occurrence, RecurrenceDefinition, SeriesId, Termination};
pub use registry::CalendarRegistry;
pub use weekdays::Weekdays;
