//! API handlers for the NexBank backend

pub mod applications;
pub mod health;
pub mod uploads;

pub use applications::submit_application;
pub use health::health_check;
pub use uploads::upload_file;
