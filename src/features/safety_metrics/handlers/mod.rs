pub mod safety_metrics_handler;

pub use safety_metrics_handler::{
    __path_get_my_metrics, __path_get_user_metrics, get_my_metrics, get_user_metrics,
};
