//! HTTP request handlers for the workshop app.

pub mod auth;
pub mod faults;
pub mod fun;
pub mod health;
pub mod logs;
pub mod metrics;
pub mod status;

pub use auth::login;
pub use faults::{may_fail, slow, sometimes_broken};
pub use fun::{dance_move, env, fortune, greet, random_joke, user_stats};
pub use health::{health_check, home};
pub use logs::generate_logs;
pub use metrics::metrics_handler;
pub use status::status;
