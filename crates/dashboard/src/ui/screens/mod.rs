pub mod clients;
pub mod dashboard;
pub mod errors;
pub mod health;
