//! Appeals against moderation results.
//!
//! Authors may appeal any result that is not critical severity. Appeals are
//! recorded as pending; deciding them is out of scope here.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/appeals` | File an appeal |
//! | GET | `/api/appeals` | List the caller's appeals |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AppealService;
