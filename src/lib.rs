#![forbid(unsafe_code)]
//! Smartgrind — bibliothèque d'assistant de révision, sans état.
//!
//! - Lecture d'emploi du temps CSV (colonnes Day, Start, End, Subject, Location, Notes).
//! - Génération iCalendar : un événement daté par cours, rappel avant le début.
//! - Construction des prompts de résumé et de roadmap ; le transport du modèle reste externe.
//! - Heures locales flottantes ; le fuseau est laissé au client calendrier.

pub mod calendar;
pub mod model;
pub mod output;
pub mod prompt;
pub mod time;
pub mod timetable;

pub use calendar::{
    build_calendar, build_events, week_start, write_calendar, BadTimePolicy, BuildError,
    CalendarOptions, TimeField, TimeFormatError,
};
pub use model::{parse_weekday, CalendarEvent, EventId, TimetableRow};
pub use output::{CalendarSink, FileSink, StdoutSink, CALENDAR_MIME, DEFAULT_FILE_NAME};
pub use prompt::{
    extract_tips, generate_roadmap, is_greeting, prepare_summary_prompt, roadmap_prompt, summarize,
    summary_prompt, GenerateError, PromptError, SummaryStyle, TextGenerator,
};
pub use time::parse_time_of_day;
pub use timetable::{
    parse_timetable, parse_timetable_path, parse_timetable_str, SchemaError, TimetableError,
};

use chrono::NaiveDate;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Timetable(#[from] TimetableError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// CSV brut → octets `.ics` pour la semaine contenant `anchor`.
pub fn timetable_to_ics<R: Read>(
    reader: R,
    anchor: NaiveDate,
    opts: &CalendarOptions,
) -> Result<Vec<u8>, Error> {
    let rows = parse_timetable(reader)?;
    Ok(build_calendar(&rows, anchor, opts)?)
}
