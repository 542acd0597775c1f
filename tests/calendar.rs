#![forbid(unsafe_code)]
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use smartgrind::{
    build_calendar, build_events, parse_timetable_str, timetable_to_ics, week_start,
    BadTimePolicy, BuildError, CalendarOptions, Error, TimeField, TimetableRow,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn opts() -> CalendarOptions {
    CalendarOptions {
        stamp: Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap(),
        ..CalendarOptions::default()
    }
}

fn ics_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn week_start_is_the_monday_on_or_before_anchor() {
    // 2025-10-23 est un jeudi
    assert_eq!(week_start(date(2025, 10, 23)), Some(date(2025, 10, 20)));
    assert_eq!(week_start(date(2025, 10, 20)), Some(date(2025, 10, 20)));
    assert_eq!(week_start(date(2025, 10, 26)), Some(date(2025, 10, 20)));

    let mut day = date(2024, 12, 25);
    for _ in 0..14 {
        let monday = week_start(day).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert!(monday <= day);
        assert!(day - monday < Duration::days(7));
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn single_row_becomes_one_dated_event() {
    let rows = vec![TimetableRow::new("Monday", "09:00", "10:30", "Algorithms")];
    for anchor in [date(2025, 10, 20), date(2025, 10, 23), date(2025, 10, 26)] {
        let events = build_events(&rows, anchor, &opts()).unwrap();
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.title, "Algorithms");
        assert_eq!(ev.date, date(2025, 10, 20));
        assert_eq!(ev.start, date(2025, 10, 20).and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(ev.end, date(2025, 10, 20).and_hms_opt(10, 30, 0).unwrap());
        assert_eq!(ev.location, None);
        assert_eq!(ev.description, None);
    }
}

#[test]
fn weekday_offsets_follow_monday_zero() {
    let days = ["Monday", "tuesday", "WEDNESDAY", " Thursday ", "friday", "Saturday", "sunday"];
    let rows: Vec<_> = days
        .iter()
        .map(|d| TimetableRow::new(*d, "08:00", "09:00", "Class"))
        .collect();
    let events = build_events(&rows, date(2025, 10, 23), &opts()).unwrap();
    assert_eq!(events.len(), 7);
    for (offset, ev) in events.iter().enumerate() {
        assert_eq!(ev.date, date(2025, 10, 20) + Duration::days(offset as i64));
    }
}

#[test]
fn unknown_weekdays_are_skipped_silently() {
    let rows = vec![
        TimetableRow::new("Funday", "09:00", "10:00", "Nap"),
        TimetableRow::new("Mon", "09:00", "10:00", "Abbrev"),
        TimetableRow::new("", "09:00", "10:00", "Blank"),
        TimetableRow::new("Tuesday", "09:00", "10:00", "Kept"),
    ];
    let events = build_events(&rows, date(2025, 10, 23), &opts()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Kept");
}

#[test]
fn unknown_weekday_with_bad_time_is_still_skipped() {
    let rows = vec![TimetableRow::new("Someday", "25:99", "??", "Ghost")];
    let events = build_events(&rows, date(2025, 10, 23), &opts()).unwrap();
    assert!(events.is_empty());
}

#[test]
fn bad_time_aborts_the_whole_build() {
    let rows = vec![
        TimetableRow::new("Monday", "09:00", "10:30", "Algorithms"),
        TimetableRow::new("Wednesday", "2:30PM", "25:99", "Databases"),
    ];
    let err = build_events(&rows, date(2025, 10, 23), &opts()).unwrap_err();
    let BuildError::TimeFormat(err) = err else {
        panic!("expected time format error, got {err:?}");
    };
    assert_eq!(err.row, 2);
    assert_eq!(err.field, TimeField::End);
    assert_eq!(err.value, "25:99");
    insta::assert_snapshot!(err.to_string(), @r#"row 2 (Databases): invalid end time "25:99" (expected HH:MM or H:MM AM/PM)"#);

    assert!(build_calendar(&rows, date(2025, 10, 23), &opts()).is_err());
}

#[test]
fn skip_row_policy_keeps_the_other_events() {
    let rows = vec![
        TimetableRow::new("Monday", "soon", "10:30", "Broken"),
        TimetableRow::new("Friday", "11:00", "12:00", "Operating Systems"),
    ];
    let opts = CalendarOptions {
        bad_time: BadTimePolicy::SkipRow,
        ..opts()
    };
    let events = build_events(&rows, date(2025, 10, 23), &opts).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Operating Systems");
    assert_eq!(events[0].date, date(2025, 10, 24));
}

#[test]
fn end_before_start_is_passed_through() {
    let rows = vec![TimetableRow::new("Monday", "18:00", "09:00", "Night study")];
    let events = build_events(&rows, date(2025, 10, 20), &opts()).unwrap();
    assert_eq!(events[0].duration_minutes(), -9 * 60);
}

#[test]
fn alarm_fires_offset_minutes_before_every_start() {
    let rows = vec![
        TimetableRow::new("Monday", "09:00", "10:30", "Algorithms"),
        TimetableRow::new("Wednesday", "2:30PM", "4:00PM", "Databases"),
        TimetableRow::new("Sunday", "00:10", "01:00", "Early"),
    ];
    let events = build_events(&rows, date(2025, 10, 23), &opts()).unwrap();
    for ev in &events {
        assert_eq!(ev.alarm_offset_minutes, 30);
        assert_eq!(ev.start - ev.alarm_at(), Duration::minutes(30));
        assert_eq!(ev.alarm_text(), format!("Reminder: {}", ev.title));
    }

    let bytes = build_calendar(&rows, date(2025, 10, 23), &opts()).unwrap();
    let triggers = ics_lines(&bytes)
        .into_iter()
        .filter(|l| l.starts_with("TRIGGER"))
        .collect::<Vec<_>>();
    assert_eq!(triggers, vec!["TRIGGER:-PT30M"; 3]);
}

#[test]
fn serialized_calendar_has_expected_shape() {
    let rows = vec![
        TimetableRow::new("Monday", "09:00", "10:30", "Algorithms")
            .with_location("Room 4")
            .with_notes("Bring laptop"),
        TimetableRow::new("Wednesday", "2:30PM", "4:00PM", "Databases"),
    ];
    let opts = CalendarOptions {
        alarm_minutes: 15,
        ..opts()
    };
    let bytes = build_calendar(&rows, date(2025, 10, 23), &opts).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\r\n"));

    let lines = ics_lines(&bytes);
    assert_eq!(lines.first().map(String::as_str), Some("BEGIN:VCALENDAR"));
    assert_eq!(lines.last().map(String::as_str), Some("END:VCALENDAR"));
    assert!(lines.contains(&"VERSION:2.0".to_string()));
    assert!(lines.contains(&"PRODID:-//smartgrind//timetable//EN".to_string()));
    assert_eq!(lines.iter().filter(|l| *l == "BEGIN:VEVENT").count(), 2);
    assert_eq!(lines.iter().filter(|l| *l == "BEGIN:VALARM").count(), 2);
    assert_eq!(lines.iter().filter(|l| *l == "ACTION:DISPLAY").count(), 2);
    assert_eq!(lines.iter().filter(|l| l.starts_with("UID:")).count(), 2);

    for expected in [
        "DTSTAMP:20251001T080000Z",
        "DTSTART:20251020T090000",
        "DTEND:20251020T103000",
        "SUMMARY:Algorithms",
        "LOCATION:Room 4",
        "DESCRIPTION:Bring laptop",
        "DESCRIPTION:Reminder: Algorithms",
        "DTSTART:20251022T143000",
        "DTEND:20251022T160000",
        "SUMMARY:Databases",
        "DESCRIPTION:Reminder: Databases",
        "TRIGGER:-PT15M",
    ] {
        assert!(lines.iter().any(|l| l == expected), "missing {expected} in\n{text}");
    }
    assert_eq!(lines.iter().filter(|l| l.starts_with("LOCATION")).count(), 1);
    assert!(!lines.iter().any(|l| l.starts_with("RRULE")));
}

#[test]
fn blank_optional_fields_are_not_serialized() {
    let csv = "Day,Start,End,Subject,Location,Notes\nTuesday,10:00,11:00,Maths,,\n";
    let bytes = timetable_to_ics(csv.as_bytes(), date(2025, 10, 23), &opts()).unwrap();
    let lines = ics_lines(&bytes);
    assert!(!lines.iter().any(|l| l.starts_with("LOCATION")));
    // seule la description du rappel subsiste
    let descriptions: Vec<_> = lines.iter().filter(|l| l.starts_with("DESCRIPTION")).collect();
    assert_eq!(descriptions, vec!["DESCRIPTION:Reminder: Maths"]);
}

#[test]
fn text_values_are_escaped() {
    let rows = vec![
        TimetableRow::new("Monday", "09:00", "10:00", "Maths; Physics")
            .with_location("Hall A, 2nd floor"),
    ];
    let bytes = build_calendar(&rows, date(2025, 10, 23), &opts()).unwrap();
    let lines = ics_lines(&bytes);
    assert!(lines.contains(&"SUMMARY:Maths\\; Physics".to_string()));
    assert!(lines.contains(&"LOCATION:Hall A\\, 2nd floor".to_string()));
}

#[test]
fn repeat_weeks_adds_weekly_rule() {
    let rows = vec![TimetableRow::new("Monday", "09:00", "10:30", "Algorithms")];
    let opts = CalendarOptions {
        repeat_weeks: 12,
        ..opts()
    };
    let bytes = build_calendar(&rows, date(2025, 10, 23), &opts).unwrap();
    assert!(ics_lines(&bytes).contains(&"RRULE:FREQ=WEEKLY;COUNT=12".to_string()));
}

#[test]
fn pipeline_reports_both_error_kinds() {
    let anchor = date(2025, 10, 23);
    let missing = timetable_to_ics("Day,Start,Subject\n".as_bytes(), anchor, &opts()).unwrap_err();
    assert!(matches!(missing, Error::Timetable(_)));
    assert!(missing.to_string().starts_with("missing required column: end"));

    let bad = timetable_to_ics(
        "Day,Start,End,Subject\nMonday,09:00,25:99,Algorithms\n".as_bytes(),
        anchor,
        &opts(),
    )
    .unwrap_err();
    assert!(matches!(bad, Error::Build(BuildError::TimeFormat(_))));
}

#[test]
fn sample_file_round_trip() {
    let rows = parse_timetable_str(include_str!("../demos/timetable.csv")).unwrap();
    let events = build_events(&rows, date(2025, 10, 23), &opts()).unwrap();
    let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Algorithms", "Databases", "Operating Systems"]);
    assert_eq!(events[1].start, date(2025, 10, 22).and_hms_opt(14, 30, 0).unwrap());
    assert_eq!(events[2].location.as_deref(), Some("Lab B"));
    assert_eq!(events[2].description, None);
}

#[test]
fn anchors_at_the_edge_of_the_date_range_fail_cleanly() {
    let rows = vec![
        TimetableRow::new("Monday", "09:00", "10:00", "First"),
        TimetableRow::new("Sunday", "09:00", "10:00", "Last"),
    ];
    for anchor in [NaiveDate::MAX, NaiveDate::MIN] {
        assert_eq!(
            build_events(&rows, anchor, &opts()),
            Err(BuildError::DateOutOfRange(anchor))
        );
        assert!(matches!(
            timetable_to_ics(
                "Day,Start,End,Subject\nSunday,09:00,10:00,Last\n".as_bytes(),
                anchor,
                &opts()
            ),
            Err(Error::Build(BuildError::DateOutOfRange(_)))
        ));
    }
}
