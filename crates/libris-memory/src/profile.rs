//! Pattern-based extraction of user profile facts
//!
//! The extractor applies an ordered set of rules per category to each raw
//! user message: the first matching rule per category wins. Extraction
//! never errors, unmatched text simply records nothing. The patterns
//! recognize the Spanish forms of the source corpus alongside English
//! trigger words where the two coexist naturally.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum stored length for a stated-problem capture, in characters.
const MAX_PROBLEM_CHARS: usize = 200;

/// The profile fact categories, in context rendering order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKey {
    Name,
    Age,
    StatedProblem,
    GenrePreference,
}

impl ProfileKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKey::Name => "name",
            ProfileKey::Age => "age",
            ProfileKey::StatedProblem => "stated_problem",
            ProfileKey::GenrePreference => "genre_preference",
        }
    }
}

impl std::fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common pronouns that must never be captured as a name.
const NAME_DENYLIST: &[&str] = &[
    "yo", "me", "te", "el", "lo", "la", "le", "nos", "les", "tu", "su",
];

/// Trigger words that signal a genre preference statement.
const PREFERENCE_TRIGGERS: &[&str] = &["me gusta", "prefiero", "me interesa", "me encanta"];

/// Genre keywords checked after a preference trigger fires.
const GENRE_KEYWORDS: &[&str] = &[
    "ficcion",
    "ciencia",
    "historia",
    "programacion",
    "novelas",
    "poesia",
    "filosofia",
];

/// Ordered-rule extractor for profile facts.
pub struct ProfileExtractor {
    name_patterns: Vec<Regex>,
    age_patterns: Vec<Regex>,
    problem_trigger: Regex,
}

impl ProfileExtractor {
    pub fn new() -> Self {
        let name_patterns = [
            r"(?i)(?:me llamo|mi nombre es|soy|me llaman)\s+([A-Za-zÁÉÍÓÚÑáéíóúñ]+)",
            r"(?i)nombre\s+([A-Za-zÁÉÍÓÚÑáéíóúñ]+)",
            r"(?i)yo\s+([A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)\s+(?:y|tengo|trabajo)",
        ];
        let age_patterns = [
            r"(?i)(?:tengo|edad de)\s+(\d{1,3})\s+(?:años|anos|years)",
            r"(?i)(?:años|age)\s*(?:de|:)\s*(\d{1,3})",
        ];

        Self {
            name_patterns: name_patterns
                .into_iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            age_patterns: age_patterns
                .into_iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            problem_trigger: Regex::new(
                r"(?i)(?:mi problema|problema es|tengo un problema|una dificultad)",
            )
            .expect("problem trigger pattern is valid"),
        }
    }

    /// Extract every recognized fact from one raw user message.
    ///
    /// Within each category the first matching rule wins; categories are
    /// independent so one message can yield several facts.
    pub fn extract(&self, message: &str) -> Vec<(ProfileKey, String)> {
        let mut facts = Vec::new();

        if let Some(name) = self.extract_name(message) {
            facts.push((ProfileKey::Name, name));
        }
        if let Some(age) = self.extract_age(message) {
            facts.push((ProfileKey::Age, age));
        }
        if self.problem_trigger.is_match(message) {
            let problem: String = message.chars().take(MAX_PROBLEM_CHARS).collect();
            facts.push((ProfileKey::StatedProblem, problem));
        }
        if let Some(genre) = Self::extract_genre(message) {
            facts.push((ProfileKey::GenrePreference, genre));
        }

        facts
    }

    fn extract_name(&self, message: &str) -> Option<String> {
        for pattern in &self.name_patterns {
            if let Some(captures) = pattern.captures(message) {
                let candidate = captures.get(1)?.as_str();
                if NAME_DENYLIST.contains(&candidate.to_lowercase().as_str()) {
                    continue;
                }
                return Some(candidate.to_string());
            }
        }
        None
    }

    fn extract_age(&self, message: &str) -> Option<String> {
        self.age_patterns
            .iter()
            .find_map(|pattern| pattern.captures(message))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_genre(message: &str) -> Option<String> {
        let lowered = message.to_lowercase();
        if !PREFERENCE_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            return None;
        }
        GENRE_KEYWORDS
            .iter()
            .find(|genre| lowered.contains(*genre))
            .map(|genre| genre.to_string())
    }
}

impl Default for ProfileExtractor {
    fn default() -> Self {
        Self::new()
    }
}
