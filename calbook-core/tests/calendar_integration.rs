//! Integration tests for the calendar store.
//!
//! These go through the public API only: registry, calendar, recurrence and
//! export working together.

use calbook_core::{
    CalbookError, Calendar, CalendarRegistry, Event, EventEdit, RecurrenceDefinition, Termination,
    Weekdays, parse_date, parse_datetime,
};
use chrono::NaiveDateTime;

fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn timed(subject: &str, start: &str, end: &str) -> Event {
    Event::timed(subject, dt(start), dt(end)).unwrap()
}

fn weekly(subject: &str, start: &str, end: &str, days: &str, count: u32) -> RecurrenceDefinition {
    RecurrenceDefinition::new(
        timed(subject, start, end),
        Weekdays::parse(days).unwrap(),
        Termination::ByCount(count),
    )
    .unwrap()
}

#[test]
fn test_mwf_series_lands_on_expected_dates() {
    let mut cal = Calendar::new("work", "America/New_York");
    let def = weekly("Standup", "2023-05-08T09:00", "2023-05-08T10:00", "MWF", 3);
    let series_id = def.series_id();

    assert!(cal.add_recurring_event(def, true).unwrap());

    let starts: Vec<_> = cal.series_events(series_id).iter().map(|e| e.start).collect();
    assert_eq!(
        starts,
        vec![
            dt("2023-05-08T09:00"),
            dt("2023-05-10T09:00"),
            dt("2023-05-12T09:00"),
        ]
    );
    assert_eq!(cal.recurring_definitions().len(), 1);
}

#[test]
fn test_strict_series_with_one_collision_adds_nothing() {
    let mut cal = Calendar::new("work", "America/New_York");
    cal.add_event(timed("Dentist", "2023-05-10T09:30", "2023-05-10T10:30"), true)
        .unwrap();
    let before = cal.len();

    let def = weekly("Standup", "2023-05-08T09:00", "2023-05-08T10:00", "MWF", 6);
    let err = cal.add_recurring_event(def, true).unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(cal.len(), before);
    assert!(cal.recurring_definitions().is_empty());
    assert!(cal.events_on(parse_date("2023-05-08").unwrap()).is_empty());
}

#[test]
fn test_lenient_series_collision_is_a_soft_decline() {
    let mut cal = Calendar::new("work", "America/New_York");
    cal.add_event(timed("Dentist", "2023-05-12T10:00", "2023-05-12T11:00"), true)
        .unwrap();

    // Ends exactly when the dentist starts on Friday.
    let def = weekly("Standup", "2023-05-08T09:00", "2023-05-08T10:00", "MWF", 3);
    assert!(!cal.add_recurring_event(def, false).unwrap());
    assert_eq!(cal.len(), 1);
}

#[test]
fn test_busy_checks_for_all_day_event() {
    let mut cal = Calendar::new("home", "America/New_York");
    cal.add_event(Event::all_day("Holiday", parse_date("2023-05-15").unwrap()).unwrap(), true)
        .unwrap();

    assert!(cal.is_busy_at(dt("2023-05-15T12:00")));
    assert!(!cal.is_busy_at(parse_datetime("2023-05-16T00:00:01").unwrap()));
}

#[test]
fn test_conflicting_single_edit_leaves_everything_unchanged() {
    let mut cal = Calendar::new("work", "America/New_York");
    cal.add_event(timed("Review", "2023-05-08T10:00", "2023-05-08T11:00"), true)
        .unwrap();
    cal.add_event(timed("Lunch", "2023-05-08T12:00", "2023-05-08T13:00"), true)
        .unwrap();

    let before = cal.find_event("Review", dt("2023-05-08T10:00")).unwrap().clone();
    let applied = cal
        .edit_single_event("Review", dt("2023-05-08T10:00"), &EventEdit::End(dt("2023-05-08T12:30")))
        .unwrap();

    assert!(!applied);
    assert_eq!(cal.find_event("Review", dt("2023-05-08T10:00")).unwrap(), &before);
    assert_eq!(cal.events_on(parse_date("2023-05-08").unwrap()).len(), 2);
}

#[test]
fn test_edit_of_missing_event_is_not_found() {
    let mut cal = Calendar::new("work", "America/New_York");
    let err = cal
        .edit_single_event("Ghost", dt("2023-05-08T10:00"), &EventEdit::Location("x".into()))
        .unwrap_err();
    assert!(matches!(err, CalbookError::NotFound(_)));
}

#[test]
fn test_batch_edit_is_lenient_per_event() {
    let mut cal = Calendar::new("work", "America/New_York");
    let def = weekly("Gym", "2023-05-08T07:00", "2023-05-08T08:00", "MW", 4);
    cal.add_recurring_event(def, true).unwrap();

    let applied = cal.edit_all_events("Gym", &EventEdit::End(dt("2023-05-08T08:30")));

    // Only the first Monday accepts an end on 2023-05-08; the rest would end
    // before they start, and are skipped without undoing the first.
    assert_eq!(applied, 1);
    let gym_on_monday = cal.find_event("Gym", dt("2023-05-08T07:00")).unwrap();
    assert_eq!(gym_on_monday.end, dt("2023-05-08T08:30"));
    let later = cal.find_event("Gym", dt("2023-05-17T07:00")).unwrap();
    assert_eq!(later.end, dt("2023-05-17T08:00"));
    assert_eq!(cal.len(), 4);
}

#[test]
fn test_edit_from_instant_only_touches_later_events() {
    let mut cal = Calendar::new("work", "America/New_York");
    let def = weekly("Gym", "2023-05-08T07:00", "2023-05-08T08:00", "MW", 4);
    cal.add_recurring_event(def, true).unwrap();

    let renamed = cal.edit_events_from("Gym", dt("2023-05-10T00:00"), &EventEdit::Subject("Swim".into()));
    assert_eq!(renamed, 3);
    assert!(cal.find_event("Gym", dt("2023-05-08T07:00")).is_ok());
    assert!(cal.find_event("Swim", dt("2023-05-15T07:00")).is_ok());
}

#[test]
fn test_edits_to_occurrences_do_not_touch_the_definition() {
    let mut cal = Calendar::new("work", "America/New_York");
    let def = weekly("Gym", "2023-05-08T07:00", "2023-05-08T08:00", "MW", 2);
    let series_id = def.series_id();
    cal.add_recurring_event(def, true).unwrap();

    let changed = cal.edit_all_events("Gym", &EventEdit::Location("Pool".into()));
    assert_eq!(changed, 2);

    let definition = cal.recurring_definition(series_id).unwrap();
    assert_eq!(definition.template().location, "");
    assert!(cal.series_events(series_id).iter().all(|e| e.location == "Pool"));
}

#[test]
fn test_multi_day_event_shows_up_in_every_date_it_spans() {
    let mut cal = Calendar::new("travel", "Europe/Berlin");
    cal.add_event(timed("Conference", "2023-06-01T09:00", "2023-06-03T17:00"), true)
        .unwrap();

    for day in ["2023-06-01", "2023-06-02", "2023-06-03"] {
        assert_eq!(cal.events_on(parse_date(day).unwrap()).len(), 1, "{}", day);
    }
    assert!(cal.events_on(parse_date("2023-06-04").unwrap()).is_empty());

    let in_range = cal
        .events_in_range(parse_date("2023-06-02").unwrap(), parse_date("2023-06-10").unwrap())
        .unwrap();
    assert_eq!(in_range.len(), 1);
}

#[test]
fn test_registry_calendars_do_not_share_events() {
    let mut registry = CalendarRegistry::new();
    registry.create("work", "America/New_York").unwrap();
    registry.create("home", "Asia/Tokyo").unwrap();

    registry
        .active_mut()
        .unwrap()
        .add_event(timed("Sprint", "2023-05-08T09:00", "2023-05-08T10:00"), true)
        .unwrap();
    registry.use_calendar("home").unwrap();
    registry
        .active_mut()
        .unwrap()
        .add_event(timed("Sprint", "2023-05-08T09:00", "2023-05-08T10:00"), true)
        .unwrap();

    let home = registry.get("home").unwrap();
    assert_eq!(home.all_events()[0].timezone, "Asia/Tokyo");
    assert_eq!(registry.get("work").unwrap().len(), 1);
}

#[test]
fn test_export_round_trip_through_file() {
    let mut cal = Calendar::new("work", "America/New_York");
    cal.add_recurring_event(
        weekly("Standup", "2023-05-08T09:00", "2023-05-08T09:15", "MWF", 3),
        true,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv = calbook_core::export_to_path(&cal, &dir.path().join("work.csv")).unwrap();
    let ics = calbook_core::export_to_path(&cal, &dir.path().join("work.ics")).unwrap();

    let csv = std::fs::read_to_string(csv).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let ics = std::fs::read_to_string(ics).unwrap();
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
}
