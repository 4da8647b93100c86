pub mod appeal_handler;

pub use appeal_handler::{__path_file_appeal, __path_list_my_appeals, file_appeal, list_my_appeals};
