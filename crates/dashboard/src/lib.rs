//! Terminal dashboard for the customer bulk-load backend.

pub mod app;
pub mod client;
pub mod config;
pub mod controllers;
pub mod error;
pub mod routes;
pub mod ui;
