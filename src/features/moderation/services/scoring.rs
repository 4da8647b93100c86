//! Score aggregation and the decision table.
//!
//! All of this is synchronous arithmetic; classifier calls happen before.

use crate::features::moderation::models::{Decision, RoastingContext, RoastingIntensity, Severity};

/// Score given to a modality the classifier judged unsafe
const UNSAFE_MODALITY_SCORE: f64 = 0.3;

const APPROVE_ABOVE: f64 = 0.8;
const REJECT_BELOW: f64 = 0.3;
const REVIEW_BAND: (f64, f64) = (0.3, 0.7);
/// Visual verdicts below this confidence go to a human
pub const MIN_VISUAL_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualSignal {
    pub is_safe: bool,
    pub confidence: f64,
    /// Nudity, graphic violence or other sensitive material was flagged
    pub sensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSignal {
    pub is_safe: bool,
    pub contextual_score: f64,
}

/// Per-modality signals for one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreInputs {
    pub visual: Option<VisualSignal>,
    pub audio: Option<AudioSignal>,
    pub roasting: Option<RoastingContext>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub overall_score: f64,
    pub requires_human_review: bool,
}

/// Apply the roasting adjustment to an audio score
pub fn roasting_adjusted(audio_score: f64, roasting: Option<&RoastingContext>) -> f64 {
    let Some(roasting) = roasting.filter(|r| r.is_roasting) else {
        return audio_score;
    };

    let adjusted = if roasting.is_mutual {
        audio_score * 1.2
    } else {
        match roasting.intensity {
            Some(RoastingIntensity::Severe) => audio_score * 0.7,
            Some(RoastingIntensity::Moderate) => audio_score * 0.9,
            _ => audio_score,
        }
    };
    adjusted.min(1.0)
}

/// Combine visual and audio into one score and the review flag
pub fn aggregate(inputs: &ScoreInputs) -> Aggregate {
    let visual_score = inputs.visual.map(|v| {
        if v.is_safe {
            v.confidence
        } else {
            UNSAFE_MODALITY_SCORE
        }
    });
    let audio_score = inputs.audio.map(|a| {
        let raw = if a.is_safe {
            a.contextual_score
        } else {
            UNSAFE_MODALITY_SCORE
        };
        roasting_adjusted(raw, inputs.roasting.as_ref())
    });

    let overall_score = if inputs.severity == Severity::Critical {
        0.0
    } else {
        match (visual_score, audio_score) {
            (Some(v), Some(a)) => 0.5 * v + 0.5 * a,
            (Some(v), None) => v,
            (None, Some(a)) => a,
            (None, None) => 0.0,
        }
    };

    // An all-unsafe item scores exactly the rejection threshold; never let
    // that fall through to approval
    let unsafe_modality = inputs.visual.is_some_and(|v| !v.is_safe)
        || inputs.audio.is_some_and(|a| !a.is_safe);
    let unreciprocated_moderate = inputs
        .roasting
        .as_ref()
        .is_some_and(|r| r.is_unreciprocated_moderate());
    let low_visual_confidence = inputs
        .visual
        .is_some_and(|v| v.confidence < MIN_VISUAL_CONFIDENCE);
    let sensitive = inputs.visual.is_some_and(|v| v.sensitive);

    Aggregate {
        overall_score,
        requires_human_review: in_review_band(overall_score)
            || unsafe_modality
            || unreciprocated_moderate
            || low_visual_confidence
            || sensitive,
    }
}

fn in_review_band(score: f64) -> bool {
    score > REVIEW_BAND.0 && score < REVIEW_BAND.1
}

/// Score for a single classified modality (text, or a still image).
///
/// A confident unsafe verdict scores near zero; an unsure one lands in the
/// review band.
pub fn single_modality_score(is_safe: bool, confidence: f64, severity: Severity) -> f64 {
    if severity == Severity::Critical {
        return 0.0;
    }
    if is_safe {
        confidence
    } else {
        (1.0 - confidence) * 0.6
    }
}

/// Aggregate for content with one modality. `flagged` carries classifier
/// review requests and sensitive-content flags.
pub fn aggregate_single(is_safe: bool, confidence: f64, severity: Severity, flagged: bool) -> Aggregate {
    let overall_score = single_modality_score(is_safe, confidence, severity);
    Aggregate {
        overall_score,
        requires_human_review: in_review_band(overall_score) || !is_safe || flagged,
    }
}

/// The decision table
pub fn decide(overall_score: f64, requires_human_review: bool) -> Decision {
    if overall_score > APPROVE_ABOVE {
        Decision::Approved
    } else if overall_score < REJECT_BELOW {
        Decision::Rejected
    } else if requires_human_review {
        Decision::PendingReview
    } else {
        Decision::Approved
    }
}
