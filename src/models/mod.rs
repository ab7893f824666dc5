pub mod admin_user;
pub mod apk;
pub mod stats;
pub mod user;

pub use admin_user::*;
pub use apk::*;
pub use stats::*;
pub use user::*;
