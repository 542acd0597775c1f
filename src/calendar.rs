use crate::model::{parse_weekday, CalendarEvent, EventId, TimetableRow};
use crate::time::parse_time_of_day;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};
use ics::properties::{Description, DtEnd, DtStart, Location, RRule, Summary, Trigger};
use ics::{escape_text, Alarm, ICalendar};
use std::fmt;
use thiserror::Error;

const ICS_DATETIME: &str = "%Y%m%dT%H%M%S";

/// Que faire d'une ligne dont l'heure est illisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadTimePolicy {
    /// Interrompt toute la construction (comportement historique).
    #[default]
    Abort,
    /// Ignore seulement la ligne fautive.
    SkipRow,
}

/// Options de construction du calendrier
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub alarm_minutes: u32,
    pub bad_time: BadTimePolicy,
    pub repeat_weeks: u32,
    pub calendar_name: String,
    pub stamp: DateTime<Utc>,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            alarm_minutes: 30,
            bad_time: BadTimePolicy::Abort,
            repeat_weeks: 1,
            calendar_name: "smartgrind".to_string(),
            stamp: Utc::now(),
        }
    }
}

impl CalendarOptions {
    pub fn prodid(&self) -> String {
        format!("-//{}//timetable//EN", self.calendar_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => f.write_str("start"),
            TimeField::End => f.write_str("end"),
        }
    }
}

/// Heure illisible dans une ligne (numéro de ligne de données, à partir de 1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row} ({subject}): invalid {field} time \"{value}\" (expected HH:MM or H:MM AM/PM)")]
pub struct TimeFormatError {
    pub row: usize,
    pub subject: String,
    pub field: TimeField,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),
    #[error("date out of range for anchor {0}")]
    DateOutOfRange(NaiveDate),
}

/// Lundi de la semaine contenant `anchor` (lundi = 0).
pub fn week_start(anchor: NaiveDate) -> Option<NaiveDate> {
    let offset = u64::from(anchor.weekday().num_days_from_monday());
    anchor.checked_sub_days(Days::new(offset))
}

/// Construit un événement daté par ligne dont le jour est reconnu.
///
/// Les jours inconnus sont ignorés sans erreur. Une heure illisible
/// interrompt tout, sauf avec [`BadTimePolicy::SkipRow`].
pub fn build_events(
    rows: &[TimetableRow],
    anchor: NaiveDate,
    opts: &CalendarOptions,
) -> Result<Vec<CalendarEvent>, BuildError> {
    let monday = week_start(anchor).ok_or(BuildError::DateOutOfRange(anchor))?;
    let mut out = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let Some(weekday) = parse_weekday(&row.day) else {
            #[cfg(feature = "logging")]
            tracing::debug!(row = idx + 1, day = %row.day, "skipping row with unknown weekday");
            continue;
        };
        let date = monday
            .checked_add_days(Days::new(u64::from(weekday.num_days_from_monday())))
            .ok_or(BuildError::DateOutOfRange(anchor))?;

        let (start, end) = match row_times(idx + 1, row, date) {
            Ok(times) => times,
            Err(_err) if opts.bad_time == BadTimePolicy::SkipRow => {
                #[cfg(feature = "logging")]
                tracing::warn!(err = %_err, "skipping row with invalid time");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        out.push(CalendarEvent {
            uid: EventId::random(),
            title: row.subject.clone(),
            date,
            start,
            end,
            location: row.location.clone(),
            description: row.notes.clone(),
            alarm_offset_minutes: opts.alarm_minutes,
            repeat_weeks: opts.repeat_weeks.max(1),
        });
    }

    Ok(out)
}

fn row_times(
    row_number: usize,
    row: &TimetableRow,
    date: NaiveDate,
) -> Result<(NaiveDateTime, NaiveDateTime), TimeFormatError> {
    let parse = |field: TimeField, value: &str| {
        parse_time_of_day(value)
            .map(|time| date.and_time(time))
            .ok_or_else(|| TimeFormatError {
                row: row_number,
                subject: row.subject.clone(),
                field,
                value: value.to_string(),
            })
    };
    Ok((parse(TimeField::Start, &row.start)?, parse(TimeField::End, &row.end)?))
}

/// Sérialise les événements en iCalendar (lignes CRLF).
pub fn write_calendar(events: &[CalendarEvent], opts: &CalendarOptions) -> Vec<u8> {
    let mut calendar = ICalendar::new("2.0", opts.prodid());
    let stamp = opts.stamp.format("%Y%m%dT%H%M%SZ").to_string();
    for event in events {
        calendar.add_event(event.to_ics(&stamp));
    }
    let bytes = calendar.to_string().into_bytes();

    #[cfg(feature = "logging")]
    tracing::debug!(events = events.len(), bytes = bytes.len(), "calendar serialized");

    bytes
}

/// Chaîne complète : lignes → événements → octets `.ics`.
pub fn build_calendar(
    rows: &[TimetableRow],
    anchor: NaiveDate,
    opts: &CalendarOptions,
) -> Result<Vec<u8>, BuildError> {
    let events = build_events(rows, anchor, opts)?;
    Ok(write_calendar(&events, opts))
}

impl CalendarEvent {
    pub fn to_ics(&self, stamp: &str) -> ics::Event<'static> {
        let mut event = ics::Event::new(self.uid.as_str().to_string(), stamp.to_string());

        event.push(DtStart::new(self.start.format(ICS_DATETIME).to_string()));
        event.push(DtEnd::new(self.end.format(ICS_DATETIME).to_string()));
        event.push(Summary::new(escape_text(self.title.clone())));

        if let Some(location) = &self.location {
            event.push(Location::new(escape_text(location.clone())));
        }
        if let Some(description) = &self.description {
            event.push(Description::new(escape_text(description.clone())));
        }
        if self.repeat_weeks > 1 {
            event.push(RRule::new(format!("FREQ=WEEKLY;COUNT={}", self.repeat_weeks)));
        }

        event.add_alarm(Alarm::display(
            Trigger::new(format!("-PT{}M", self.alarm_offset_minutes)),
            Description::new(escape_text(self.alarm_text())),
        ));

        event
    }
}
