pub mod event_handler;

pub use event_handler::{__path_stream_events, stream_events};
