mod appeal;

pub use appeal::{Appeal, AppealStatus, CreateAppeal};
