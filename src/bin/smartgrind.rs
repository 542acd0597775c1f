#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use smartgrind::{
    calendar::{build_events, write_calendar, BadTimePolicy, CalendarOptions},
    output::{CalendarSink, FileSink, StdoutSink, CALENDAR_MIME, DEFAULT_FILE_NAME},
    prompt::{extract_tips, prepare_summary_prompt, roadmap_prompt, PromptError, SummaryStyle},
    timetable::parse_timetable_path,
};
use std::fs;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Assistant de révision : emploi du temps → calendrier, prompts de résumé et de roadmap
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer un calendrier .ics depuis un emploi du temps CSV
    Calendar {
        #[arg(long)]
        csv: String,
        /// N'importe quelle date de la semaine voulue (YYYY-MM-DD), aujourd'hui par défaut
        #[arg(long)]
        anchor: Option<NaiveDate>,
        /// Rappel avant le cours, en minutes
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=1440))]
        alarm_minutes: u32,
        /// Répéter chaque cours sur N semaines (RRULE hebdomadaire)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=52))]
        repeat_weeks: u32,
        /// Ignorer les lignes aux heures illisibles au lieu d'échouer
        #[arg(long)]
        skip_bad_times: bool,
        /// Nom utilisé dans le PRODID
        #[arg(long, default_value = "smartgrind")]
        name: String,
        /// Fichier de sortie ("-" pour stdout)
        #[arg(long, default_value = DEFAULT_FILE_NAME)]
        out: String,
    },

    /// Valider un emploi du temps et lister ses lignes
    Rows {
        #[arg(long)]
        csv: String,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Afficher le prompt envoyé au modèle
    #[command(subcommand)]
    Prompt(PromptCommand),

    /// Extraire la section TIPS d'un résumé
    Tips {
        #[arg(long)]
        file: String,
    },
}

#[derive(Subcommand, Debug)]
enum PromptCommand {
    /// Prompt de résumé de notes
    Summary(SummaryArgs),
    /// Prompt de roadmap
    Roadmap {
        #[arg(long)]
        goal: String,
        #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(4..=52))]
        weeks: u32,
        /// Compétences, temps disponible par jour...
        #[arg(long, default_value = "")]
        background: String,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct NotesSource {
    /// Notes en texte brut
    #[arg(long)]
    text: Option<String>,
    /// Fichier texte (.txt) contenant les notes
    #[arg(long)]
    file: Option<String>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    source: NotesSource,
    /// concise | elaborate
    #[arg(long, default_value = "concise")]
    style: SummaryStyle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Calendar {
            csv,
            anchor,
            alarm_minutes,
            repeat_weeks,
            skip_bad_times,
            name,
            out,
        } => {
            let rows = parse_timetable_path(&csv).with_context(|| format!("reading {csv}"))?;
            let anchor = anchor.unwrap_or_else(|| Local::now().date_naive());
            let opts = CalendarOptions {
                alarm_minutes,
                bad_time: if skip_bad_times {
                    BadTimePolicy::SkipRow
                } else {
                    BadTimePolicy::Abort
                },
                repeat_weeks,
                calendar_name: name,
                ..CalendarOptions::default()
            };
            let events = build_events(&rows, anchor, &opts)?;
            let bytes = write_calendar(&events, &opts);
            if out == "-" {
                StdoutSink.write(&bytes)?;
            } else {
                let sink = FileSink::open(&out)?;
                sink.write(&bytes)?;
                eprintln!(
                    "{} event(s) written to {} ({CALENDAR_MIME})",
                    events.len(),
                    sink.path().display()
                );
            }
            0
        }
        Commands::Rows { csv, out_json } => {
            let rows = parse_timetable_path(&csv).with_context(|| format!("reading {csv}"))?;
            if let Some(path) = out_json {
                fs::write(&path, serde_json::to_string_pretty(&rows)?)
                    .with_context(|| format!("writing {path}"))?;
            }
            // impression compacte
            for r in &rows {
                println!(
                    "{} | {} → {} | {} | {}",
                    r.day,
                    r.start,
                    r.end,
                    r.subject,
                    r.location.as_deref().unwrap_or("-")
                );
            }
            0
        }
        Commands::Prompt(PromptCommand::Summary(args)) => {
            let notes = match args.source.file {
                Some(path) => {
                    fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
                }
                None => args.source.text.unwrap_or_default(),
            };
            println!("{}", prepare_summary_prompt(&notes, args.style)?);
            0
        }
        Commands::Prompt(PromptCommand::Roadmap {
            goal,
            weeks,
            background,
        }) => {
            if goal.trim().is_empty() {
                return Err(PromptError::EmptyGoal.into());
            }
            println!("{}", roadmap_prompt(&goal, weeks, &background));
            0
        }
        Commands::Tips { file } => {
            let summary =
                fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
            match extract_tips(&summary) {
                Some(tips) => {
                    println!("{tips}");
                    0
                }
                None => {
                    eprintln!("no TIPS section found");
                    // Code 2 = section absente
                    2
                }
            }
        }
    };

    std::process::exit(code);
}
