pub mod auth;
pub mod backend;
pub mod cli;
pub mod clock;
pub mod config;
pub mod history;
pub mod logging;
pub mod models;
pub mod tracker;
pub mod tui;
pub mod utils;

pub use backend::{Backend, BackendError, SqliteBackend};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use models::{Category, Task};
pub use utils::Profile;
