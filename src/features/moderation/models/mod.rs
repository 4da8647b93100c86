mod content_item;
mod moderation_result;
mod roasting;

pub use content_item::{ContentItem, ContentPayload, ContentType, DeclaredContext};
pub use moderation_result::{Category, CreateModerationResult, Decision, ModerationResult, Severity};
pub use roasting::{RoastingContext, RoastingIntensity};
