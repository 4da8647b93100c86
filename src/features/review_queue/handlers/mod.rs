pub mod queue_handler;

pub use queue_handler::{
    __path_list_queue, __path_queue_stats, __path_resolve_item, list_queue, queue_stats,
    resolve_item,
};
