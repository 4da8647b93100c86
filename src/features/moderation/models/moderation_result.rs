use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

use super::content_item::ContentType;

/// Ordered harm level
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Type,
    ToSchema,
)]
#[sqlx(type_name = "severity_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "safe" => Ok(Severity::None),
            "low" | "minor" => Ok(Severity::Low),
            "medium" | "moderate" => Ok(Severity::Medium),
            "high" | "severe" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// Policy violation tag, or one of the benign context tags
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Safe,
    Harassment,
    HateSpeech,
    SelfHarm,
    Sexual,
    Violence,
    Gambling,
    UnauthorizedPromotion,
    Spam,
    Misinformation,
    Sarcasm,
    Roasting,
}

impl Category {
    /// Sarcasm and roasting describe tone, not a violation
    pub fn is_context_tag(&self) -> bool {
        matches!(self, Category::Safe | Category::Sarcasm | Category::Roasting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Safe => "safe",
            Category::Harassment => "harassment",
            Category::HateSpeech => "hate_speech",
            Category::SelfHarm => "self_harm",
            Category::Sexual => "sexual",
            Category::Violence => "violence",
            Category::Gambling => "gambling",
            Category::UnauthorizedPromotion => "unauthorized_promotion",
            Category::Spam => "spam",
            Category::Misinformation => "misinformation",
            Category::Sarcasm => "sarcasm",
            Category::Roasting => "roasting",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the canonical names plus the labels classifiers tend to invent
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let category = match normalized.as_str() {
            "safe" | "none" | "clean" => Category::Safe,
            "harassment" | "bullying" | "profanity" | "insult" | "toxicity" => {
                Category::Harassment
            }
            "hate_speech" | "hate" | "hateful" => Category::HateSpeech,
            "self_harm" | "selfharm" | "suicide" => Category::SelfHarm,
            "sexual" | "adult" | "nsfw" | "nudity" | "explicit" => Category::Sexual,
            "violence" | "violent" | "gore" | "threat" => Category::Violence,
            "gambling" | "betting" => Category::Gambling,
            "unauthorized_promotion" | "promotion" | "advertising" | "self_promotion" => {
                Category::UnauthorizedPromotion
            }
            "spam" => Category::Spam,
            "misinformation" | "disinformation" => Category::Misinformation,
            "sarcasm" | "sarcastic" => Category::Sarcasm,
            "roasting" | "roast" => Category::Roasting,
            other => return Err(format!("Unknown category: {}", other)),
        };
        Ok(category)
    }
}

/// Terminal label attached to a result. Only a human review moves an item
/// out of `PendingReview`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "moderation_decision", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    PendingReview,
    Rejected,
    AgeRestricted,
}

impl Decision {
    /// Whether the content may be shown (possibly behind an age gate)
    pub fn is_visible(&self) -> bool {
        matches!(self, Decision::Approved | Decision::AgeRestricted)
    }

    /// Author-facing message for this outcome
    pub fn feedback_message(&self) -> &'static str {
        match self {
            Decision::Approved => "Your post is live.",
            Decision::PendingReview => "Your post is being reviewed by our team.",
            Decision::Rejected => {
                "Your post was removed because it goes against our community guidelines."
            }
            Decision::AgeRestricted => "Your post is live but only visible to adult viewers.",
        }
    }
}

/// Canonical verdict for one submission of a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub id: Uuid,
    pub content_id: String,
    pub user_id: String,
    pub content_type: ContentType,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub is_approved: bool,
    pub severity: Severity,
    pub categories: BTreeSet<Category>,
    pub confidence: f64,
    pub overall_score: f64,
    pub context_aware: bool,
    pub classifier_id: String,
    pub notes: Option<String>,
    pub feedback_message: Option<String>,
    pub appealable: bool,
    pub content_fingerprint: String,
}

/// Everything needed to record a result; derived fields are computed on conversion
#[derive(Debug, Clone)]
pub struct CreateModerationResult {
    pub content_id: String,
    pub user_id: String,
    pub content_type: ContentType,
    pub decision: Decision,
    pub severity: Severity,
    pub categories: BTreeSet<Category>,
    pub confidence: f64,
    pub overall_score: f64,
    pub context_aware: bool,
    pub classifier_id: String,
    pub notes: Option<String>,
    pub feedback_message: Option<String>,
    pub content_fingerprint: String,
}

impl From<CreateModerationResult> for ModerationResult {
    fn from(new: CreateModerationResult) -> Self {
        let mut categories = new.categories;
        if categories.is_empty() {
            categories.insert(Category::Safe);
        } else if categories.len() > 1 {
            categories.remove(&Category::Safe);
        }

        let feedback_message = new
            .feedback_message
            .or_else(|| Some(new.decision.feedback_message().to_string()));

        Self {
            id: Uuid::now_v7(),
            content_id: new.content_id,
            user_id: new.user_id,
            content_type: new.content_type,
            timestamp: Utc::now(),
            is_approved: new.decision.is_visible(),
            decision: new.decision,
            appealable: new.severity != Severity::Critical,
            severity: new.severity,
            categories,
            confidence: new.confidence.clamp(0.0, 1.0),
            overall_score: new.overall_score.clamp(0.0, 1.0),
            context_aware: new.context_aware,
            classifier_id: new.classifier_id,
            notes: new.notes,
            feedback_message,
            content_fingerprint: new.content_fingerprint,
        }
    }
}

impl ModerationResult {
    /// Whether any category is a real violation rather than a tone tag
    pub fn is_flagged(&self) -> bool {
        !self.is_approved || self.categories.iter().any(|c| !c.is_context_tag())
    }

    /// Violation categories only
    pub fn violation_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories
            .iter()
            .copied()
            .filter(|c| !c.is_context_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_result(severity: Severity, decision: Decision) -> CreateModerationResult {
        CreateModerationResult {
            content_id: "post-9".to_string(),
            user_id: "author-9".to_string(),
            content_type: ContentType::Text,
            decision,
            severity,
            categories: BTreeSet::new(),
            confidence: 0.9,
            overall_score: 0.9,
            context_aware: false,
            classifier_id: "test".to_string(),
            notes: None,
            feedback_message: None,
            content_fingerprint: "abc".to_string(),
        }
    }

    #[test]
    fn test_severity_is_totally_ordered() {
        assert!(Severity::None < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_appealable_iff_not_critical() {
        let severities = [
            Severity::None,
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ];
        for severity in severities {
            let result: ModerationResult = new_result(severity, Decision::Rejected).into();
            assert_eq!(result.appealable, severity != Severity::Critical);
        }
    }

    #[test]
    fn test_approval_follows_decision() {
        let approved: ModerationResult = new_result(Severity::None, Decision::Approved).into();
        let restricted: ModerationResult =
            new_result(Severity::Low, Decision::AgeRestricted).into();
        let pending: ModerationResult =
            new_result(Severity::Medium, Decision::PendingReview).into();

        assert!(approved.is_approved);
        assert!(restricted.is_approved);
        assert!(!pending.is_approved);
        assert_eq!(
            pending.feedback_message.as_deref(),
            Some("Your post is being reviewed by our team.")
        );
    }

    #[test]
    fn test_empty_categories_become_safe() {
        let result: ModerationResult = new_result(Severity::None, Decision::Approved).into();
        assert_eq!(result.categories, BTreeSet::from([Category::Safe]));
        assert!(!result.is_flagged());
    }

    #[test]
    fn test_safe_dropped_next_to_violation() {
        let mut new = new_result(Severity::High, Decision::Rejected);
        new.categories = BTreeSet::from([Category::Safe, Category::Violence]);
        let result: ModerationResult = new.into();

        assert_eq!(result.categories, BTreeSet::from([Category::Violence]));
        assert!(result.is_flagged());
    }

    #[test]
    fn test_category_parses_aliases() {
        assert_eq!("hate".parse::<Category>(), Ok(Category::HateSpeech));
        assert_eq!("Self-Harm".parse::<Category>(), Ok(Category::SelfHarm));
        assert_eq!("nsfw".parse::<Category>(), Ok(Category::Sexual));
        assert_eq!("profanity".parse::<Category>(), Ok(Category::Harassment));
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::UnauthorizedPromotion).unwrap();
        assert_eq!(json, "\"unauthorized_promotion\"");
        assert_eq!(Category::HateSpeech.as_str(), "hate_speech");
    }
}
