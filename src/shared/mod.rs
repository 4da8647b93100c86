pub mod constants;
pub mod keyed_locks;
pub mod llm;
pub mod prompts;
pub mod test_helpers;
pub mod types;
