pub mod attendance;
pub mod camera;
pub mod dashboard;
pub mod enrollment;
pub mod health;
pub mod notifications;
pub mod scan;
pub mod students;
