//! Lexicon-based polarity scoring for daily notes.
//!
//! Scores are the mean polarity of the opinion words found in the text, with
//! intensifiers ("very tired") scaling the next word and negators ("not
//! great") flipping and damping it. Result is always within [-1.0, 1.0].

use thiserror::Error;

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("bad", -0.7),
    ("better", 0.5),
    ("calm", 0.3),
    ("cheerful", 0.8),
    ("content", 0.3),
    ("cramping", -0.4),
    ("depressed", -0.7),
    ("drained", -0.5),
    ("energetic", 0.6),
    ("energized", 0.6),
    ("exhausted", -0.6),
    ("fantastic", 0.4),
    ("fine", 0.4),
    ("fresh", 0.3),
    ("frustrated", -0.6),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("horrible", -1.0),
    ("irritable", -0.5),
    ("lonely", -0.5),
    ("love", 0.5),
    ("miserable", -1.0),
    ("nice", 0.6),
    ("okay", 0.5),
    ("pain", -0.5),
    ("painful", -0.7),
    ("peaceful", 0.5),
    ("positive", 0.2),
    ("productive", 0.5),
    ("relaxed", 0.4),
    ("rested", 0.4),
    ("sad", -0.5),
    ("sick", -0.7),
    ("sore", -0.4),
    ("stressed", -0.5),
    ("terrible", -1.0),
    ("tired", -0.4),
    ("upset", -0.5),
    ("wonderful", 1.0),
    ("worried", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.4),
    ("very", 1.3),
    ("slightly", 0.6),
    ("somewhat", 0.7),
    ("bit", 0.7),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "hardly", "isn't", "wasn't", "don't", "didn't", "can't", "couldn't",
];

/// How far a negator reaches forward, in tokens.
const NEGATION_SCOPE: usize = 3;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("polarity is not a finite number")]
    NonFinite,
}

/// Scores `text`, returning an error only when the arithmetic degenerates.
pub fn try_polarity(text: &str) -> Result<f64, SentimentError> {
    let mut total = 0.0;
    let mut scored = 0usize;
    let mut intensity = 1.0;
    let mut negation_left = 0usize;

    for token in tokenize(text) {
        if NEGATORS.contains(&token.as_str()) {
            negation_left = NEGATION_SCOPE;
            continue;
        }
        if let Some((_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == token) {
            intensity *= factor;
            continue;
        }
        if let Some((_, polarity)) = LEXICON.iter().find(|(w, _)| *w == token) {
            let mut value = polarity * intensity;
            if negation_left > 0 {
                value *= -0.5;
                negation_left = 0;
            }
            total += value.clamp(-1.0, 1.0);
            scored += 1;
            intensity = 1.0;
            continue;
        }
        negation_left = negation_left.saturating_sub(1);
        intensity = 1.0;
    }

    if scored == 0 {
        return Ok(0.0);
    }
    let score = total / scored as f64;
    if !score.is_finite() {
        return Err(SentimentError::NonFinite);
    }
    Ok(score.clamp(-1.0, 1.0))
}

/// Polarity of a note; falls back to neutral when scoring fails.
pub fn polarity(text: &str) -> f64 {
    match try_polarity(text) {
        Ok(score) => score,
        Err(e) => {
            tracing::warn!(error = %e, "sentiment analysis failed, using neutral score");
            0.0
        }
    }
}

/// Coarse label used when rendering history for the assistant.
pub fn label(score: Option<f64>) -> &'static str {
    match score {
        None => "not logged",
        Some(s) if s > 0.1 => "positive",
        Some(s) if s < -0.1 => "negative",
        Some(_) => "neutral",
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}
