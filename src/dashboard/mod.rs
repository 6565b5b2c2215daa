pub mod layout;
pub mod service;

pub use layout::QuickAction;
pub use service::{Dashboard, DashboardService};
