use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SUMMARY_MAX_TOKENS: u32 = 512;
pub const ROADMAP_MAX_TOKENS: u32 = 800;
pub const ROADMAP_WEEKS: std::ops::RangeInclusive<u32> = 4..=52;

pub const GREETING_PROMPT: &str = "Hey! How can I help you today?";

const GREETINGS: &[&str] = &[
    "hello", "hi", "hii", "hiii", "hiiii", "helo", "heloo", "helloo", "hey", "heyy", "heyyy",
    "hya", "hiya", "yo", "sup", "whatsup", "what's up", "wassup", "wassup?", "hey there", "hola",
    "namaste", "hlo", "hloo", "hlw", "hlwo", "hai", "haii", "haiii", "greetings", "good morning",
    "good afternoon", "good evening",
];

/// Ton du résumé demandé au modèle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    /// Révision de dernière minute.
    #[default]
    Concise,
    /// Explication simple, avec analogies.
    Elaborate,
}

impl SummaryStyle {
    fn instruction(self) -> &'static str {
        match self {
            SummaryStyle::Concise => "Summarize this for a last-minute exam revision. Be concise.",
            SummaryStyle::Elaborate => {
                "Explain this like I'm 5 years old. Use simple words and analogies."
            }
        }
    }
}

impl FromStr for SummaryStyle {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(SummaryStyle::Concise),
            "elaborate" => Ok(SummaryStyle::Elaborate),
            other => Err(PromptError::UnknownStyle(other.to_string())),
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStyle::Concise => f.write_str("concise"),
            SummaryStyle::Elaborate => f.write_str("elaborate"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("please provide some notes to summarize")]
    EmptyNotes,
    #[error("please enter a clear goal")]
    EmptyGoal,
    #[error("roadmap length must be between 4 and 52 weeks (got {0})")]
    WeeksOutOfRange(u32),
    #[error("unknown summary style: {0} (expected concise or elaborate)")]
    UnknownStyle(String),
}

/// Échec du modèle distant ; jamais propagé, rendu en texte.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct GenerateError(pub String);

/// Point d'accès au modèle de génération de texte (transport hors crate).
pub trait TextGenerator {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerateError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str, u32) -> Result<String, GenerateError>,
{
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerateError> {
        self(prompt, max_tokens)
    }
}

pub fn is_greeting(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    GREETINGS.contains(&text.as_str())
}

pub fn summary_prompt(notes: &str, style: SummaryStyle) -> String {
    format!(
        "You are an expert study coach. {style}\n\n\
         Format the output using clean Markdown. \
         DO NOT add weird characters, slashes, backslashes, escape symbols, or extra stars (*). \
         Write smooth, readable bullet points. \
         Output sections exactly as:\n\n\
         SUMMARY\n\n---> bullet points here\n\n\
         TIPS\n\n---> tips here\n\n\
         Notes:\n{notes}",
        style = style.instruction(),
    )
}

pub fn roadmap_prompt(goal: &str, weeks: u32, background: &str) -> String {
    format!(
        "You are an expert study/career mentor. Create a clean, distraction-free {weeks}-week roadmap \
         for a student whose main goal is: {goal}. \
         Include: weekly milestones, daily time budgets, 8-12 curated learning resources \
         (with short notes why each), and final deliverables to show on a resume.\n\
         Student background: {background}\n\
         Output: Use numbered weeks and bullet points; be concise.\n\
         Don't use slashes or asterisks; keep it short and easy to understand, with bullet points.",
        goal = goal.trim(),
        background = background.trim(),
    )
}

/// Section `TIPS` d'un résumé : ce qui suit le dernier marqueur.
pub fn extract_tips(summary: &str) -> Option<&str> {
    summary
        .rsplit_once("TIPS")
        .map(|(_, tips)| tips.trim())
}

/// Prompt réellement envoyé pour des notes : les salutations reçoivent
/// le prompt d'accueil au lieu d'une demande de résumé.
pub fn prepare_summary_prompt(notes: &str, style: SummaryStyle) -> Result<String, PromptError> {
    if notes.trim().is_empty() {
        return Err(PromptError::EmptyNotes);
    }
    if is_greeting(notes) {
        return Ok(GREETING_PROMPT.to_string());
    }
    Ok(summary_prompt(notes, style))
}

/// Demande un résumé au modèle.
pub fn summarize(
    generator: &dyn TextGenerator,
    notes: &str,
    style: SummaryStyle,
) -> Result<String, PromptError> {
    let prompt = prepare_summary_prompt(notes, style)?;
    Ok(generate_inline(generator, &prompt, SUMMARY_MAX_TOKENS))
}

pub fn generate_roadmap(
    generator: &dyn TextGenerator,
    goal: &str,
    weeks: u32,
    background: &str,
) -> Result<String, PromptError> {
    if goal.trim().is_empty() {
        return Err(PromptError::EmptyGoal);
    }
    if !ROADMAP_WEEKS.contains(&weeks) {
        return Err(PromptError::WeeksOutOfRange(weeks));
    }
    let prompt = roadmap_prompt(goal, weeks, background);
    Ok(generate_inline(generator, &prompt, ROADMAP_MAX_TOKENS))
}

fn generate_inline(generator: &dyn TextGenerator, prompt: &str, max_tokens: u32) -> String {
    match generator.generate(prompt, max_tokens) {
        Ok(text) => text,
        Err(err) => {
            #[cfg(feature = "logging")]
            tracing::warn!(%err, "text generation failed");
            format!("[generation failed: {err}]")
        }
    }
}
