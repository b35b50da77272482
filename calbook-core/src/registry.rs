//! Named calendars and which one is in use.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use tracing::info;

use crate::calendar::Calendar;
use crate::error::{CalbookError, CalbookResult};

/// Check that `timezone` is a known IANA zone name.
pub fn validate_timezone(timezone: &str) -> CalbookResult<Tz> {
    timezone
        .parse::<Tz>()
        .map_err(|_| CalbookError::InvalidTimezone(timezone.to_string()))
}

/// Independent calendars keyed by name, plus the active one.
#[derive(Debug, Default)]
pub struct CalendarRegistry {
    calendars: BTreeMap<String, Calendar>,
    active: Option<String>,
}

impl CalendarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty calendar. The first calendar created becomes active.
    pub fn create(&mut self, name: &str, timezone: &str) -> CalbookResult<&mut Calendar> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CalbookError::Validation("calendar name cannot be empty".into()));
        }
        if self.calendars.contains_key(name) {
            return Err(CalbookError::CalendarExists(name.to_string()));
        }
        validate_timezone(timezone)?;

        info!(calendar = name, timezone, "created calendar");
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
        Ok(self
            .calendars
            .entry(name.to_string())
            .or_insert_with(|| Calendar::new(name, timezone)))
    }

    pub fn use_calendar(&mut self, name: &str) -> CalbookResult<()> {
        if !self.calendars.contains_key(name) {
            return Err(not_found(name));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> CalbookResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(CalbookError::Validation("calendar name cannot be empty".into()));
        }
        if name == new_name {
            return self.get(name).map(|_| ());
        }
        if self.calendars.contains_key(new_name) {
            return Err(CalbookError::CalendarExists(new_name.to_string()));
        }

        let mut calendar = self.calendars.remove(name).ok_or_else(|| not_found(name))?;
        calendar.set_name(new_name);
        self.calendars.insert(new_name.to_string(), calendar);

        if self.active.as_deref() == Some(name) {
            self.active = Some(new_name.to_string());
        }
        info!(from = name, to = new_name, "renamed calendar");
        Ok(())
    }

    /// Relabel a calendar's timezone. Event times are not converted.
    pub fn set_timezone(&mut self, name: &str, timezone: &str) -> CalbookResult<()> {
        validate_timezone(timezone)?;
        self.get_mut(name)?.set_timezone(timezone);
        info!(calendar = name, timezone, "changed calendar timezone");
        Ok(())
    }

    pub fn get(&self, name: &str) -> CalbookResult<&Calendar> {
        self.calendars.get(name).ok_or_else(|| not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> CalbookResult<&mut Calendar> {
        self.calendars.get_mut(name).ok_or_else(|| not_found(name))
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> CalbookResult<&Calendar> {
        let name = self.active.as_deref().ok_or_else(no_active)?;
        self.get(name)
    }

    pub fn active_mut(&mut self) -> CalbookResult<&mut Calendar> {
        let name = self.active.clone().ok_or_else(no_active)?;
        self.get_mut(&name)
    }

    /// Calendar names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.calendars.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}

fn not_found(name: &str) -> CalbookError {
    CalbookError::NotFound(format!("calendar '{}'", name))
}

fn no_active() -> CalbookError {
    CalbookError::NotFound("no calendar in use. Create one or run `use calendar --name <name>`".into())
}
