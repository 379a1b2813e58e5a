//! NexBank Loan Intake Library
//!
//! Loan payment calculator, the application wizard state machine, and the
//! HTTP backend that validates and stores loan applications and identity
//! document uploads.

pub mod app_state;
pub mod applications;
pub mod calculator;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod uploads;
pub mod validation;
pub mod wizard;
