//! Comment sentiment scoring.
//!
//! A small rule-based analyzer turns free text into a polarity in
//! [-1.0, 1.0]; the scorer maps that polarity onto a vote weight in
//! [0.5, 1.0]. Scoring never fails: analyzer errors fall back to the
//! neutral weight and are logged.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

pub const NEUTRAL_WEIGHT: f64 = 0.75;
pub const NEUTRAL_POLARITY: f64 = 0.0;
pub const MIN_WEIGHT: f64 = 0.5;
pub const MAX_WEIGHT: f64 = 1.0;

/// Tokens before a lexicon word in which a negation flips it.
const NEGATION_WINDOW: usize = 3;
const NEGATION_FACTOR: f64 = -0.5;
const EXCLAMATION_BOOST: f64 = 1.1;
const MAX_EXCLAMATIONS: i32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum SentimentError {
    #[error("comment contains control character {0:?}")]
    MalformedInput(char),
    #[error("analysis produced a non-finite polarity")]
    NonFinite,
}

/// How a [`Sentiment`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentSource {
    /// Empty or whitespace-only comment.
    Neutral,
    Analyzed,
    /// The analyzer failed; neutral values were substituted.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub weight: f64,
    pub polarity: f64,
    pub source: SentimentSource,
}

impl Sentiment {
    fn neutral(source: SentimentSource) -> Self {
        Sentiment {
            weight: NEUTRAL_WEIGHT,
            polarity: NEUTRAL_POLARITY,
            source,
        }
    }
}

/// Maps a polarity onto the weight range, unrounded.
pub fn weight_for(polarity: f64) -> f64 {
    (NEUTRAL_WEIGHT + 0.25 * polarity).clamp(MIN_WEIGHT, MAX_WEIGHT)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Word lists driving the analyzer.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        let words = [
            // positive
            ("excellent", 1.0),
            ("best", 1.0),
            ("perfect", 1.0),
            ("wonderful", 1.0),
            ("awesome", 1.0),
            ("impressive", 1.0),
            ("brilliant", 0.9),
            ("great", 0.8),
            ("happy", 0.8),
            ("proud", 0.8),
            ("good", 0.7),
            ("fair", 0.7),
            ("bright", 0.7),
            ("honest", 0.6),
            ("nice", 0.6),
            ("amazing", 0.6),
            ("effective", 0.6),
            ("love", 0.5),
            ("better", 0.5),
            ("inspiring", 0.5),
            ("promising", 0.5),
            ("visionary", 0.5),
            ("trustworthy", 0.5),
            ("sincere", 0.5),
            ("safe", 0.5),
            ("strong", 0.43),
            ("fantastic", 0.4),
            ("capable", 0.4),
            ("competent", 0.4),
            ("clean", 0.37),
            ("bold", 0.33),
            ("fresh", 0.3),
            ("progressive", 0.3),
            ("positive", 0.23),
            ("stable", 0.2),
            ("new", 0.14),
            // negative
            ("terrible", -1.0),
            ("worst", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("pathetic", -1.0),
            ("boring", -1.0),
            ("hate", -0.8),
            ("stupid", -0.8),
            ("arrogant", -0.8),
            ("bad", -0.7),
            ("dishonest", -0.6),
            ("disappointing", -0.6),
            ("dangerous", -0.6),
            ("greedy", -0.6),
            ("corrupt", -0.5),
            ("useless", -0.5),
            ("sad", -0.5),
            ("wrong", -0.5),
            ("failed", -0.5),
            ("incompetent", -0.5),
            ("unfair", -0.5),
            ("fake", -0.5),
            ("worse", -0.4),
            ("poor", -0.4),
            ("divisive", -0.4),
            ("broken", -0.4),
            ("weak", -0.375),
            ("negative", -0.3),
            ("lazy", -0.25),
        ]
        .into_iter()
        .collect();

        let intensifiers = [
            ("extremely", 1.5),
            ("incredibly", 1.5),
            ("absolutely", 1.4),
            ("very", 1.3),
            ("highly", 1.3),
            ("really", 1.2),
            ("truly", 1.2),
            ("so", 1.2),
            ("quite", 1.1),
            ("somewhat", 0.7),
            ("slightly", 0.5),
        ]
        .into_iter()
        .collect();

        let negations = [
            "not", "no", "never", "neither", "nor", "none", "nothing", "without", "hardly",
            "barely", "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't",
            "won't", "can't", "cannot", "shouldn't", "wouldn't", "couldn't",
        ]
        .into_iter()
        .collect();

        Lexicon {
            words,
            intensifiers,
            negations,
        }
    }

    /// Polarity of `text` in [-1.0, 1.0]. Text without any known word
    /// scores 0.0.
    pub fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        if let Some(c) = text.chars().find(|c| c.is_control() && !c.is_whitespace()) {
            return Err(SentimentError::MalformedInput(c));
        }

        let tokens = tokenize(text);
        let mut scores = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(token.as_str()) else {
                continue;
            };
            let mut score = base;

            // Intensifiers stack when they directly precede the word.
            let mut j = i;
            while j > 0 {
                match self.intensifiers.get(tokens[j - 1].as_str()) {
                    Some(factor) => {
                        score *= factor;
                        j -= 1;
                    }
                    None => break,
                }
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|t| self.negations.contains(t.as_str())) {
                score *= NEGATION_FACTOR;
            }
            scores.push(score);
        }

        if scores.is_empty() {
            return Ok(0.0);
        }
        let mut mean = scores.iter().sum::<f64>() / scores.len() as f64;

        let marks = text.trim_end().chars().rev().take_while(|c| *c == '!').count() as i32;
        mean *= EXCLAMATION_BOOST.powi(marks.min(MAX_EXCLAMATIONS));

        if !mean.is_finite() {
            return Err(SentimentError::NonFinite);
        }
        Ok(mean.clamp(-1.0, 1.0))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Turns comments into vote weights.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    lexicon: Lexicon,
}

impl SentimentScorer {
    pub fn score(&self, comment: &str) -> Sentiment {
        if comment.trim().is_empty() {
            return Sentiment::neutral(SentimentSource::Neutral);
        }
        match self.lexicon.polarity(comment) {
            Ok(raw) => {
                let polarity = round2(raw);
                let weight = round2(weight_for(raw));
                debug!("comment scored: polarity={:.2} weight={:.2}", polarity, weight);
                Sentiment {
                    weight,
                    polarity,
                    source: SentimentSource::Analyzed,
                }
            }
            Err(err) => {
                warn!("sentiment analysis failed, using neutral weight: {}", err);
                Sentiment::neutral(SentimentSource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_comments_are_neutral() {
        let scorer = SentimentScorer::default();
        for comment in ["", "   ", "\n\t"] {
            let s = scorer.score(comment);
            assert_eq!((s.weight, s.polarity), (0.75, 0.0));
            assert_eq!(s.source, SentimentSource::Neutral);
        }
    }

    #[test]
    fn positive_comment_raises_weight() {
        let s = SentimentScorer::default().score("Great vision for the state!");
        assert_eq!(s.source, SentimentSource::Analyzed);
        assert!(s.polarity > 0.0);
        assert!(s.weight > 0.75);
    }

    #[test]
    fn negative_comment_lowers_weight() {
        let s = SentimentScorer::default().score("Corrupt and useless leadership.");
        assert!(s.polarity < 0.0);
        assert!(s.weight < 0.75);
    }

    #[test]
    fn negation_flips_polarity() {
        let lexicon = Lexicon::new();
        assert!(lexicon.polarity("This is good").unwrap() > 0.0);
        assert!(lexicon.polarity("This is not good").unwrap() < 0.0);
        assert!(lexicon.polarity("They don't seem very honest").unwrap() < 0.0);
    }

    #[test]
    fn intensifiers_stack() {
        let lexicon = Lexicon::new();
        let plain = lexicon.polarity("good").unwrap();
        let very = lexicon.polarity("very good").unwrap();
        let really_very = lexicon.polarity("really very good").unwrap();
        assert!(very > plain);
        assert!(really_very > very);
    }

    #[test]
    fn unknown_words_score_zero() {
        let s = SentimentScorer::default().score("Voting from Chennai today.");
        assert_eq!(s.source, SentimentSource::Analyzed);
        assert_eq!((s.weight, s.polarity), (0.75, 0.0));
    }

    #[test]
    fn control_characters_fall_back_to_neutral() {
        let s = SentimentScorer::default().score("good\u{0007}");
        assert_eq!(s.source, SentimentSource::Fallback);
        assert_eq!((s.weight, s.polarity), (0.75, 0.0));
    }

    #[test]
    fn scores_stay_in_bounds() {
        let scorer = SentimentScorer::default();
        let comments = [
            "absolutely incredibly extremely excellent perfect best!!!!!",
            "extremely terrible horrible worst pathetic!!!",
            "not bad, not terrible, somewhat good",
            "good bad good bad",
            "Stable leadership and good governance.",
        ];
        for comment in comments {
            let s = scorer.score(comment);
            assert!((0.5..=1.0).contains(&s.weight), "{} -> {:?}", comment, s);
            assert!((-1.0..=1.0).contains(&s.polarity), "{} -> {:?}", comment, s);
        }
    }

    #[test]
    fn weight_follows_polarity() {
        assert_eq!(weight_for(-1.0), 0.5);
        assert_eq!(weight_for(0.0), 0.75);
        assert_eq!(weight_for(1.0), 1.0);
        assert_eq!(weight_for(2.0), 1.0);
        let s = SentimentScorer::default().score("good");
        assert_eq!(s.polarity, 0.7);
        assert_eq!(s.weight, round2(0.75 + 0.25 * 0.7));
    }

    #[test]
    fn weight_is_derived_from_unrounded_polarity() {
        let s = SentimentScorer::default().score("weak");
        assert_eq!(s.polarity, -0.38);
        assert_eq!(s.weight, round2(weight_for(-0.375)));
    }

    #[test]
    fn bounds_hold_across_lexicon_combinations() {
        let scorer = SentimentScorer::default();
        let lexicon = Lexicon::new();
        let mut prefixes: Vec<String> = vec![String::new()];
        for intensifier in lexicon.intensifiers.keys() {
            prefixes.push(format!("{} ", intensifier));
            prefixes.push(format!("{} {} ", intensifier, intensifier));
        }
        for negation in &lexicon.negations {
            prefixes.push(format!("{} ", negation));
            for intensifier in lexicon.intensifiers.keys() {
                prefixes.push(format!("{} {} ", negation, intensifier));
            }
        }
        let suffixes = ["", ".", "!", "!!!", "!!!!!!!!!!"];

        for word in lexicon.words.keys() {
            for prefix in &prefixes {
                for suffix in suffixes {
                    let comment = format!("{}{}{}", prefix, word, suffix);
                    let s = scorer.score(&comment);
                    assert!((0.5..=1.0).contains(&s.weight), "{} -> {:?}", comment, s);
                    assert!((-1.0..=1.0).contains(&s.polarity), "{} -> {:?}", comment, s);
                }
            }
        }
    }

    #[test]
    fn values_are_rounded_to_two_places() {
        let s = SentimentScorer::default().score("strong and bold");
        assert_eq!(s.polarity, round2(s.polarity));
        assert_eq!(s.weight, round2(s.weight));
    }
}
