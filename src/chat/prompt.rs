//! Prompt assembly: persona instructions, client context, recent history.

use std::fmt::Write as _;
use std::str::FromStr;

use serde_json::Value;

use crate::models::HealthRecord;
use crate::sentiment;

/// Number of days, ending today, of stored history rendered into the prompt.
pub const HISTORY_DAYS: u64 = 7;

const CASUAL_INSTRUCTIONS: &str = "\
You are the 'NeoHealth AI Assistant', a friendly and empathetic health companion integrated into the NeoHealth dashboard.
Your goal is to explain health data, provide wellness tips, and answer questions about the user's cycle, mood, and energy based on their data.

GUIDELINES:
1. Tone: Warm, professional, non-medical, and encouraging.
2. Context Aware: Use the provided user context and recent health history to tailor your answers.
3. Restrictions: DO NOT provide medical diagnoses or prescribe medication. Always advise consulting a doctor for serious issues.
4. Brevity: Keep responses concise (under 3 paragraphs) and easy to read on a mobile/chat interface.
5. Persona: You are an AI assistant, not a human doctor.

INPUT DATA EXPLANATION:
- Wellness Score (0-100): Calculated based on sleep, stress, and activity. >75 is excellent.
- Cycle Phases: Menstruation, Follicular, Ovulation, Luteal.
- Symptom ratings use a 0-4 scale where 0 is none and 4 is severe.";

const CLINICAL_INSTRUCTIONS: &str = "\
You are the 'NeoHealth AI Assistant' operating in clinical summary mode.
Answer strictly from the user context and recent health history provided below.

RESPONSE FORMAT:
1. Observation: one or two sentences describing what the data shows.
2. Likely factors: a short bulleted list tied to specific days or values.
3. Suggested next steps: at most three non-prescriptive actions.

RULES:
- Do not speculate beyond the data. If the data is insufficient, say so.
- DO NOT provide medical diagnoses or prescribe medication. Recommend consulting a doctor for anything persistent or severe.
- Symptom ratings use a 0-4 scale where 0 is none and 4 is severe.";

/// Instruction block prefixed to every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    /// Warm wellness companion.
    #[default]
    Casual,
    /// Structured, data-only summaries.
    Clinical,
}

impl Persona {
    pub fn instructions(self) -> &'static str {
        match self {
            Persona::Casual => CASUAL_INSTRUCTIONS,
            Persona::Clinical => CLINICAL_INSTRUCTIONS,
        }
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" | "friendly" => Ok(Persona::Casual),
            "clinical" | "strict" => Ok(Persona::Clinical),
            other => Err(format!("unknown persona: {other}")),
        }
    }
}

/// Maps a language code to the name the model is told to reply in.
pub fn language_name(code: &str) -> &'static str {
    match code.trim().to_ascii_lowercase().as_str() {
        "hi" => "Hindi",
        "gu" => "Gujarati",
        _ => "English",
    }
}

/// Ephemeral, client-reported state sent alongside a chat message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    pub phase: Option<String>,
    pub mood: Option<String>,
    pub wellness_score: Option<String>,
    pub symptoms: Option<String>,
    pub last_period: Option<String>,
    pub next_period: Option<String>,
    pub language: Option<String>,
}

impl ClientContext {
    /// Reads whatever the client sent; unknown shapes are ignored, not rejected.
    pub fn from_value(value: &Value) -> Self {
        Self {
            phase: lookup(value, &["phase"]),
            mood: lookup(value, &["mood"]),
            wellness_score: lookup(value, &["wellnessScore", "wellness_score"]),
            symptoms: lookup(value, &["symptoms"]),
            last_period: lookup(value, &["lastPeriod", "last_period"]),
            next_period: lookup(value, &["nextPeriod", "next_period"]),
            language: lookup(value, &["language", "lang"]),
        }
    }

    pub fn language_name(&self) -> &'static str {
        language_name(self.language.as_deref().unwrap_or("en"))
    }
}

fn lookup(value: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| value.get(*n)).and_then(text_of)
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().filter_map(text_of).collect::<Vec<_>>().join(", "),
        Value::Null | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number(value: Option<f64>) -> String {
    match value {
        None => "n/a".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.1}"),
    }
}

/// One line per stored day: date, sleep, stress, mood, nonzero symptoms.
pub fn history_line(record: &HealthRecord) -> String {
    let symptoms: Vec<String> = record
        .symptoms()
        .iter()
        .filter_map(|(name, rating)| rating.filter(|r| *r > 0).map(|r| format!("{name} {r}")))
        .collect();
    let symptoms = if symptoms.is_empty() {
        "no major symptoms".to_string()
    } else {
        format!("symptoms: {}", symptoms.join(", "))
    };

    format!(
        "- {}: sleep {} min, stress level {}, mood {}, {}",
        record.date,
        number(record.deep_sleep_minutes),
        number(record.stress_score),
        sentiment::label(record.sentiment_score),
        symptoms
    )
}

/// Renders the full prompt sent to the language model.
pub fn build_prompt(
    persona: Persona,
    context: &ClientContext,
    history: &[HealthRecord],
    message: &str,
) -> String {
    let or = |v: &Option<String>, fallback: &'static str| {
        v.clone().unwrap_or_else(|| fallback.to_string())
    };

    let mut prompt = String::new();
    prompt.push_str(persona.instructions());
    prompt.push_str("\n\nUSER CONTEXT:\n");
    let _ = writeln!(prompt, "- Current Phase: {}", or(&context.phase, "Unknown"));
    let _ = writeln!(prompt, "- Mood: {}", or(&context.mood, "Not reported"));
    let _ = writeln!(prompt, "- Wellness Score: {}", or(&context.wellness_score, "N/A"));
    let _ = writeln!(prompt, "- Recent Symptoms: {}", or(&context.symptoms, "None reported"));
    let _ = writeln!(prompt, "- Last Period: {}", or(&context.last_period, "Unknown"));
    let _ = writeln!(prompt, "- Predicted Next Period: {}", or(&context.next_period, "Unknown"));

    let _ = writeln!(prompt, "\nRECENT HEALTH HISTORY (last {HISTORY_DAYS} days):");
    if history.is_empty() {
        prompt.push_str("- No records logged in this period.\n");
    }
    for record in history {
        prompt.push_str(&history_line(record));
        prompt.push('\n');
    }

    let language = context.language_name();
    let _ = writeln!(prompt, "\nIMPORTANT: You must reply in {language} language.");
    let _ = write!(prompt, "\nUSER QUESTION: \"{}\"", message.trim());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use uuid::Uuid;

    fn record(day: u32) -> HealthRecord {
        HealthRecord::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2024, 3, day).unwrap())
    }

    #[test]
    fn language_codes_resolve_with_english_default() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("hi"), "Hindi");
        assert_eq!(language_name("GU"), "Gujarati");
        assert_eq!(language_name("xx"), "English");
        assert_eq!(language_name(""), "English");
    }

    #[test]
    fn hindi_request_names_hindi_regardless_of_message() {
        let ctx = ClientContext::from_value(&json!({"language": "hi"}));
        let prompt = build_prompt(Persona::Casual, &ctx, &[], "Please answer in English!");
        assert!(prompt.contains("You must reply in Hindi language."));
    }

    #[test]
    fn history_lines_list_nonzero_symptoms() {
        let mut r = record(1);
        r.deep_sleep_minutes = Some(62.0);
        r.stress_score = Some(40.5);
        r.sentiment_score = Some(0.6);
        r.cramps = Some(2);
        r.fatigue = Some(0);
        r.bloating = Some(1);
        assert_eq!(
            history_line(&r),
            "- 2024-03-01: sleep 62 min, stress level 40.5, mood positive, symptoms: cramps 2, bloating 1"
        );
    }

    #[test]
    fn history_line_marks_symptom_free_days() {
        let r = record(2);
        assert_eq!(
            history_line(&r),
            "- 2024-03-02: sleep n/a min, stress level n/a, mood not logged, no major symptoms"
        );
    }

    #[test]
    fn context_tolerates_loose_shapes() {
        let ctx = ClientContext::from_value(&json!({
            "phase": "Luteal",
            "wellnessScore": 72,
            "symptoms": ["cramps", "fatigue"],
            "mood": {"nested": true},
        }));
        assert_eq!(ctx.phase.as_deref(), Some("Luteal"));
        assert_eq!(ctx.wellness_score.as_deref(), Some("72"));
        assert_eq!(ctx.symptoms.as_deref(), Some("cramps, fatigue"));
        assert_eq!(ctx.mood, None);
        assert_eq!(ClientContext::from_value(&json!("garbage")), ClientContext::default());
    }

    #[test]
    fn prompt_orders_sections() {
        let ctx = ClientContext::from_value(&json!({"phase": "Follicular"}));
        let history = [record(1), record(2)];
        let prompt = build_prompt(Persona::Clinical, &ctx, &history, "  why am I tired? ");
        let instructions = prompt.find("clinical summary mode").unwrap();
        let context = prompt.find("- Current Phase: Follicular").unwrap();
        let history = prompt.find("- 2024-03-01").unwrap();
        let question = prompt.find("USER QUESTION: \"why am I tired?\"").unwrap();
        assert!(instructions < context && context < history && history < question);
        assert!(prompt.contains("You must reply in English language."));
    }

    #[test]
    fn empty_history_is_explicit() {
        let prompt = build_prompt(Persona::Casual, &ClientContext::default(), &[], "hi");
        assert!(prompt.contains("No records logged in this period."));
    }

    #[test]
    fn persona_parses() {
        assert_eq!("Clinical".parse::<Persona>().unwrap(), Persona::Clinical);
        assert_eq!("casual".parse::<Persona>().unwrap(), Persona::Casual);
        assert!("pirate".parse::<Persona>().is_err());
    }
}
