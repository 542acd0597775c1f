use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ligne d'emploi du temps telle que lue dans le CSV.
///
/// Les cellules `day`, `start` et `end` restent brutes : leur interprétation
/// (jour de la semaine, heure) est faite par le builder, ligne par ligne.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimetableRow {
    pub day: String,
    pub start: String,
    pub end: String,
    pub subject: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub notes: Option<String>,
}

impl TimetableRow {
    pub fn new<D, S, E, T>(day: D, start: S, end: E, subject: T) -> Self
    where
        D: Into<String>,
        S: Into<String>,
        E: Into<String>,
        T: Into<String>,
    {
        Self {
            day: day.into(),
            start: start.into(),
            end: end.into(),
            subject: subject.into(),
            location: None,
            notes: None,
        }
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Jour reconnu pour cette ligne, `None` si le libellé est inconnu.
    pub fn weekday(&self) -> Option<Weekday> {
        parse_weekday(&self.day)
    }
}

/// Reconnaît un nom de jour complet en anglais, insensible à la casse.
///
/// Les abréviations (`mon`, `tue`...) ne sont pas acceptées.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.trim().to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Identifiant fort pour CalendarEvent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventId(String);

impl EventId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Occurrence datée d'un cours (heure locale flottante, sans fuseau).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarEvent {
    pub uid: EventId,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    pub description: Option<String>,
    pub alarm_offset_minutes: u32,
    /// Nombre de semaines couvertes ; au-delà de 1, une règle hebdomadaire est émise.
    pub repeat_weeks: u32,
}

impl CalendarEvent {
    /// Instant de déclenchement du rappel.
    pub fn alarm_at(&self) -> NaiveDateTime {
        self.start - Duration::minutes(i64::from(self.alarm_offset_minutes))
    }

    /// Texte affiché par le rappel.
    pub fn alarm_text(&self) -> String {
        format!("Reminder: {}", self.title)
    }

    /// Durée en minutes (négative si la fin précède le début).
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}
