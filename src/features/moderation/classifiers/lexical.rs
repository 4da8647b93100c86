//! Keyword matcher that backs every other classification path.
//!
//! Pure and allocation-light: no I/O, never fails. Input is normalized to
//! defeat simple obfuscation (leetspeak, punctuation padding, stretched
//! letters, spaced-out letters) and then matched against weighted word sets.

use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;

use crate::features::moderation::models::{Category, Severity};

/// Word sets with their fixed weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WordSet {
    Profanity,
    Harassment,
    Adult,
    Violence,
    HateSpeech,
}

impl WordSet {
    fn weight(&self) -> f64 {
        match self {
            WordSet::Profanity => 0.3,
            WordSet::Harassment => 0.5,
            WordSet::Adult => 0.6,
            WordSet::Violence => 0.8,
            WordSet::HateSpeech => 1.0,
        }
    }

    fn category(&self) -> Category {
        match self {
            WordSet::Profanity | WordSet::Harassment => Category::Harassment,
            WordSet::Adult => Category::Sexual,
            WordSet::Violence => Category::Violence,
            WordSet::HateSpeech => Category::HateSpeech,
        }
    }
}

type WordList = &'static [(WordSet, &'static [&'static str])];

const BASE_WORDS: WordList = &[
    (
        WordSet::Profanity,
        &[
            "damn", "crap", "shit", "fuck", "fucking", "bitch", "bastard", "asshole", "dick",
            "piss", "wtf", "stfu", "bullshit",
        ],
    ),
    (
        WordSet::Harassment,
        &[
            "idiot", "stupid", "loser", "moron", "dumb", "pathetic", "worthless", "ugly",
            "shut up", "nobody likes you", "you are trash",
        ],
    ),
    (
        WordSet::Adult,
        &["porn", "nude", "nudes", "naked", "sex", "horny", "onlyfans", "send nudes"],
    ),
    (
        WordSet::Violence,
        &[
            "kill", "murder", "stab", "bomb", "attack", "behead", "kill yourself",
            "i will hurt you", "beat you up", "i will shoot",
        ],
    ),
    (
        WordSet::HateSpeech,
        &[
            "subhuman", "vermin", "inferior race", "ethnic cleansing", "heil hitler",
            "white power", "go back to your country",
        ],
    ),
];

const ES_WORDS: WordList = &[
    (WordSet::Profanity, &["mierda", "joder", "cabron", "puta"]),
    (
        WordSet::Harassment,
        &["idiota", "estupido", "imbecil", "pendejo", "perdedor"],
    ),
    (WordSet::Violence, &["matar", "te voy a matar"]),
    (WordSet::HateSpeech, &["raza inferior"]),
];

const PT_WORDS: WordList = &[
    (WordSet::Profanity, &["merda", "porra", "caralho"]),
    (WordSet::Harassment, &["idiota", "burro", "otario", "imbecil"]),
    (WordSet::Violence, &["matar", "vou te matar"]),
    (WordSet::HateSpeech, &["raca inferior"]),
];

const ID_WORDS: WordList = &[
    (WordSet::Profanity, &["anjing", "bangsat", "tai", "kampret"]),
    (WordSet::Harassment, &["bodoh", "goblok", "tolol", "jelek"]),
    (WordSet::Adult, &["bokep", "bugil"]),
    (WordSet::Violence, &["bunuh", "kubunuh"]),
];

/// Normalized word list: single tokens plus whitespace-free phrases
#[derive(Debug, Default)]
struct Lexicon {
    words: HashMap<String, WordSet>,
    phrases: Vec<(String, WordSet)>,
}

impl Lexicon {
    fn extend(&mut self, list: WordList) {
        for (set, entries) in list {
            for entry in entries.iter() {
                let normalized = normalize(entry);
                match normalized.tokens.as_slice() {
                    [] => {}
                    [single] => {
                        self.words.insert(single.clone(), *set);
                    }
                    _ => self.phrases.push((normalized.compact(), *set)),
                }
            }
        }
    }

    fn with(lists: &[WordList]) -> Self {
        let mut lexicon = Lexicon::default();
        for list in lists {
            lexicon.extend(list);
        }
        lexicon
    }
}

lazy_static! {
    static ref BASE_LEXICON: Lexicon = Lexicon::with(&[BASE_WORDS]);
    static ref LOCALE_LEXICONS: HashMap<&'static str, Lexicon> = HashMap::from([
        ("es", Lexicon::with(&[BASE_WORDS, ES_WORDS])),
        ("pt", Lexicon::with(&[BASE_WORDS, PT_WORDS])),
        ("id", Lexicon::with(&[BASE_WORDS, ID_WORDS])),
    ]);
}

fn lexicon_for(locale: &str) -> &'static Lexicon {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    LOCALE_LEXICONS
        .get(language.as_str())
        .unwrap_or(&*BASE_LEXICON)
}

/// Normalized form of a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub tokens: Vec<String>,
}

impl NormalizedText {
    /// Tokens concatenated without whitespace, used for phrase matching
    pub fn compact(&self) -> String {
        self.tokens.concat()
    }
}

fn substitute_leet(c: char) -> char {
    match c {
        '0' => 'o',
        '1' => 'i',
        '3' => 'e',
        '4' => 'a',
        '5' => 's',
        '7' => 't',
        '@' => 'a',
        '$' => 's',
        other => other,
    }
}

fn collapse_repeats(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut last = None;
    for c in token.chars() {
        if last != Some(c) {
            out.push(c);
        }
        last = Some(c);
    }
    out
}

/// Lowercase, undo leetspeak, strip punctuation, join spaced-out letters and
/// collapse repeated characters.
pub fn normalize(text: &str) -> NormalizedText {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(substitute_leet)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut tokens: Vec<String> = Vec::new();
    let mut letter_run = String::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() == 1 {
            letter_run.push_str(token);
            continue;
        }
        if !letter_run.is_empty() {
            tokens.push(std::mem::take(&mut letter_run));
        }
        tokens.push(token.to_string());
    }
    if !letter_run.is_empty() {
        tokens.push(letter_run);
    }

    NormalizedText {
        tokens: tokens.iter().map(|t| collapse_repeats(t)).collect(),
    }
}

/// Outcome of a lexical pass
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalVerdict {
    pub is_safe: bool,
    pub categories: BTreeSet<Category>,
    pub confidence: f64,
    pub severity: Severity,
    /// 0..=100, higher is safer
    pub safety_score: f64,
    pub total_score: f64,
    pub match_count: usize,
}

/// Classify `text` with the base lexicon plus the supplement for `locale`
pub fn classify(text: &str, locale: &str) -> LexicalVerdict {
    let lexicon = lexicon_for(locale);
    let normalized = normalize(text);

    let mut hits: Vec<WordSet> = normalized
        .tokens
        .iter()
        .filter_map(|token| lexicon.words.get(token).copied())
        .collect();

    let compact = normalized.compact();
    for (phrase, set) in &lexicon.phrases {
        for _ in compact.matches(phrase.as_str()) {
            hits.push(*set);
        }
    }

    let total_score: f64 = hits.iter().map(|set| set.weight()).sum();
    let max_weight = hits.iter().map(|set| set.weight()).fold(0.0, f64::max);
    let safety_score = (100.0 - total_score * 25.0).clamp(0.0, 100.0);
    let is_safe = safety_score >= 85.0 && max_weight < 0.7;

    let mut categories: BTreeSet<Category> = hits.iter().map(|set| set.category()).collect();
    if categories.is_empty() {
        categories.insert(Category::Safe);
    }

    let severity = if hits.is_empty() {
        Severity::None
    } else {
        let by_score = match safety_score {
            s if s >= 85.0 => Severity::Low,
            s if s >= 60.0 => Severity::Medium,
            s if s >= 30.0 => Severity::High,
            _ => Severity::Critical,
        };
        if max_weight >= 0.9 {
            by_score.max(Severity::High)
        } else {
            by_score
        }
    };

    let confidence = if hits.is_empty() {
        0.6
    } else {
        (0.5 + 0.1 * hits.len() as f64).min(0.9)
    };

    LexicalVerdict {
        is_safe,
        categories,
        confidence,
        severity,
        safety_score,
        total_score,
        match_count: hits.len(),
    }
}
