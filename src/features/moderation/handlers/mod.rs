pub mod moderation_handler;

pub use moderation_handler::{
    __path_get_content_history, __path_get_content_outcome, __path_get_result,
    __path_submit_content, get_content_history, get_content_outcome, get_result, submit_content,
};
