use crate::model::TimetableRow;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub const REQUIRED_COLUMNS: [&str; 4] = ["day", "start", "end", "subject"];

/// Colonne obligatoire absente de l'en-tête.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required column: {column} (example CSV header: Day, Start, End, Subject, Location, Notes)")]
pub struct SchemaError {
    pub column: &'static str,
}

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("reading timetable: {0}")]
    Io(#[from] std::io::Error),
}

/// Position des colonnes reconnues dans l'en-tête.
#[derive(Debug, Clone, Copy)]
struct Columns {
    day: usize,
    start: usize,
    end: usize,
    subject: usize,
    location: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, SchemaError> {
        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let name = if idx == 0 { name.trim_start_matches('\u{feff}') } else { name };
                name.trim().to_lowercase()
            })
            .collect();
        let find = |col: &str| names.iter().position(|n| n == col);

        let mut required = [0usize; 4];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(column).ok_or(SchemaError { column })?;
        }
        let [day, start, end, subject] = required;
        Ok(Self {
            day,
            start,
            end,
            subject,
            location: find("location"),
            notes: find("notes"),
        })
    }

    fn row(&self, rec: &StringRecord) -> TimetableRow {
        let cell = |idx: usize| rec.get(idx).unwrap_or("").to_string();
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| rec.get(i))
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        TimetableRow {
            day: cell(self.day),
            start: cell(self.start),
            end: cell(self.end),
            subject: cell(self.subject),
            location: optional(self.location),
            notes: optional(self.notes),
        }
    }
}

/// Lit un emploi du temps CSV : header `Day,Start,End,Subject[,Location][,Notes]`
/// dans n'importe quel ordre.
///
/// Seule la présence des colonnes est validée ici ; les heures sont
/// interprétées au moment de construire le calendrier.
pub fn parse_timetable<R: Read>(reader: R) -> Result<Vec<TimetableRow>, TimetableError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_header(rdr.headers()?)?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        out.push(columns.row(&rec?));
    }
    Ok(out)
}

pub fn parse_timetable_str(data: &str) -> Result<Vec<TimetableRow>, TimetableError> {
    parse_timetable(data.as_bytes())
}

pub fn parse_timetable_path<P: AsRef<Path>>(path: P) -> Result<Vec<TimetableRow>, TimetableError> {
    let file = File::open(path)?;
    parse_timetable(file)
}
