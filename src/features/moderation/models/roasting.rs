use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Highest word tier matched in a transcript
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RoastingIntensity {
    Mild,
    Moderate,
    Severe,
}

impl std::str::FromStr for RoastingIntensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mild" | "low" => Ok(RoastingIntensity::Mild),
            "moderate" | "medium" => Ok(RoastingIntensity::Moderate),
            "severe" | "high" => Ok(RoastingIntensity::Severe),
            other => Err(format!("Unknown roasting intensity: {}", other)),
        }
    }
}

/// Roasting signals for audio/video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastingContext {
    pub is_roasting: bool,
    pub is_mutual: bool,
    pub intensity: Option<RoastingIntensity>,
    pub targeted_users: BTreeSet<String>,
}

impl RoastingContext {
    /// Roasting where the targets have not roasted back at moderate strength
    pub fn is_unreciprocated_moderate(&self) -> bool {
        self.is_roasting && !self.is_mutual && self.intensity == Some(RoastingIntensity::Moderate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_ordering() {
        assert!(RoastingIntensity::Mild < RoastingIntensity::Moderate);
        assert!(RoastingIntensity::Moderate < RoastingIntensity::Severe);
        assert_eq!("Medium".parse(), Ok(RoastingIntensity::Moderate));
    }

    #[test]
    fn test_unreciprocated_moderate() {
        let mut ctx = RoastingContext {
            is_roasting: true,
            is_mutual: false,
            intensity: Some(RoastingIntensity::Moderate),
            targeted_users: BTreeSet::from(["friend".to_string()]),
        };
        assert!(ctx.is_unreciprocated_moderate());

        ctx.is_mutual = true;
        assert!(!ctx.is_unreciprocated_moderate());
    }
}
