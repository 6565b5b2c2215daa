pub mod attendance;
pub mod face;
pub mod notification;
pub mod role;
pub mod stats;
pub mod user;
