pub mod apk;
pub mod auth;
pub mod rate_limit;
pub mod stats;
pub mod team;
pub mod user;

pub use apk::ApkService;
pub use auth::AuthService;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use stats::StatsService;
pub use team::TeamService;
pub use user::UserService;
