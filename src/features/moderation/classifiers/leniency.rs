//! Roasting-aware scoring of audio/video transcripts.
//!
//! Consensual teasing reads as abuse to a keyword matcher. This engine
//! tells the two apart using the declared context and the participants the
//! content targets, and produces a contextual score in `[0, 1]`.

use std::collections::BTreeSet;

use lazy_static::lazy_static;

use super::lexical::normalize;
use crate::features::moderation::models::{RoastingContext, RoastingIntensity};

const BASE_CONTEXTUAL_SCORE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Mild,
    Moderate,
    Severe,
    Marker,
}

impl Tier {
    fn penalty(&self) -> f64 {
        match self {
            Tier::Severe => 0.4,
            Tier::Moderate => 0.2,
            Tier::Mild => 0.1,
            Tier::Marker => 0.1,
        }
    }

    fn intensity(&self) -> Option<RoastingIntensity> {
        match self {
            Tier::Mild => Some(RoastingIntensity::Mild),
            Tier::Moderate => Some(RoastingIntensity::Moderate),
            Tier::Severe => Some(RoastingIntensity::Severe),
            Tier::Marker => None,
        }
    }
}

const MILD_TERMS: &[&str] = &[
    "silly", "goofy", "weird", "lame", "nerd", "dork", "awkward", "basic", "cringe",
];

const MODERATE_TERMS: &[&str] = &[
    "idiot", "stupid", "loser", "ugly", "dumb", "trash", "pathetic", "moron", "clueless",
];

const SEVERE_TERMS: &[&str] = &[
    "worthless", "disgusting", "subhuman", "kill yourself", "nobody loves you", "i hate you",
    "go die",
];

const ROASTING_MARKERS: &[&str] = &[
    "dance like", "you look like", "built like", "sounds like", "no offense", "clown",
    "your mom", "roast", "bro really",
];

/// A term normalized the same way transcripts are
struct Term {
    compact: String,
    is_phrase: bool,
    tier: Tier,
}

lazy_static! {
    static ref TERMS: Vec<Term> = [
        (Tier::Mild, MILD_TERMS),
        (Tier::Moderate, MODERATE_TERMS),
        (Tier::Severe, SEVERE_TERMS),
        (Tier::Marker, ROASTING_MARKERS),
    ]
    .iter()
    .flat_map(|(tier, terms)| {
        terms.iter().map(move |term| {
            let normalized = normalize(term);
            Term {
                is_phrase: normalized.tokens.len() > 1,
                compact: normalized.compact(),
                tier: *tier,
            }
        })
    })
    .collect();
}

/// Output of the leniency pass
#[derive(Debug, Clone, PartialEq)]
pub struct LeniencyAssessment {
    pub roasting: RoastingContext,
    pub contextual_score: f64,
    pub severe_hit: bool,
}

fn matched_tiers(transcript: &str) -> Vec<Tier> {
    let normalized = normalize(transcript);
    let compact = normalized.compact();

    TERMS
        .iter()
        .filter(|term| {
            if term.is_phrase {
                compact.contains(term.compact.as_str())
            } else {
                normalized.tokens.iter().any(|t| *t == term.compact)
            }
        })
        .map(|term| term.tier)
        .collect()
}

/// Assess a transcript.
///
/// `is_mutual` is taken as given; reciprocity is established by the caller.
pub fn assess(
    transcript: &str,
    declared_roasting: bool,
    is_mutual: bool,
    targeted_users: &BTreeSet<String>,
) -> LeniencyAssessment {
    let tiers = matched_tiers(transcript);

    let marker_hit = tiers.contains(&Tier::Marker);
    let is_roasting = declared_roasting || (marker_hit && !targeted_users.is_empty());

    let highest = tiers.iter().filter_map(|t| t.intensity()).max();
    let intensity = match (highest, is_roasting) {
        (Some(level), _) => Some(level),
        (None, true) => Some(RoastingIntensity::Mild),
        (None, false) => None,
    };

    let mut score = BASE_CONTEXTUAL_SCORE;
    for tier in &tiers {
        let excused = match tier {
            Tier::Severe => false,
            Tier::Moderate => is_roasting && intensity != Some(RoastingIntensity::Severe),
            Tier::Mild => is_roasting,
            Tier::Marker => {
                if is_roasting {
                    continue;
                }
                false
            }
        };
        score -= if excused {
            tier.penalty() / 2.0
        } else {
            tier.penalty()
        };
    }

    LeniencyAssessment {
        roasting: RoastingContext {
            is_roasting,
            is_mutual: is_roasting && is_mutual,
            intensity,
            targeted_users: targeted_users.clone(),
        },
        contextual_score: score.clamp(0.0, 1.0),
        severe_hit: tiers.contains(&Tier::Severe),
    }
}
