// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Moderator role - works the human review queue
pub const ROLE_MODERATOR: &str = "moderator";

/// Admin role - everything a moderator can do
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// CLASSIFIER IDENTIFIERS
// =============================================================================

/// Verdict produced by the external classifier capability
pub const CLASSIFIER_EXTERNAL: &str = "external-classifier";

/// Verdict produced by the lexical fallback matcher
pub const CLASSIFIER_LEXICAL: &str = "lexical-fallback";

/// Verdict produced by the fail-closed policy without any classification
pub const CLASSIFIER_FAIL_CLOSED: &str = "fail-closed-policy";

/// Verdict produced by a human moderator resolving a queue item
pub const CLASSIFIER_HUMAN: &str = "human-review";

/// Number of safety scores kept in a user's trend ring buffer
pub const SAFETY_TREND_CAPACITY: usize = 30;
