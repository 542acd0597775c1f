use chrono::{NaiveDateTime, NaiveTime, Timelike};

const MERIDIEM_FORMATS: [&str; 2] = ["%I:%M%p", "%I:%M:%S%p"];
const CLOCK_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Format strict utilisé en dernier recours.
pub const STRICT_FORMAT: &str = "%H:%M";

/// Interprète une heure de cours : d'abord en mode souple, puis en `HH:MM` strict.
///
/// Formes acceptées : `9:00`, `09:00:00`, `2:30PM`, `2:30 pm`, `2PM`,
/// `9 a.m.`, ou une date-heure ISO dont seule l'heure est gardée.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    parse_flexible(raw)
        .or_else(|| NaiveTime::parse_from_str(raw.trim(), STRICT_FORMAT).ok())
        // seconde intercalaire (`:60`) : non représentable en iCalendar
        .filter(|time| time.nanosecond() < 1_000_000_000)
}

fn parse_flexible(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(clock) = split_meridiem(raw) {
        return MERIDIEM_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&clock, fmt).ok());
    }

    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.time())
        })
}

/// Normalise `2:30 p.m.` en `2:30PM` et `2pm` en `2:00PM`.
/// `None` si la chaîne ne se termine pas par AM/PM.
fn split_meridiem(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_uppercase();
    let (clock, suffix) = match (compact.strip_suffix("AM"), compact.strip_suffix("PM")) {
        (Some(clock), _) => (clock, "AM"),
        (_, Some(clock)) => (clock, "PM"),
        _ => return None,
    };
    if clock.is_empty() || !clock.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if clock.contains(':') {
        Some(format!("{clock}{suffix}"))
    } else {
        Some(format!("{clock}:00{suffix}"))
    }
}
