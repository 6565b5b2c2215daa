pub mod enrollment;
pub mod guard;
pub mod presenter;
pub mod service;
