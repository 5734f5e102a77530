pub mod api;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod report;
pub mod runner;
pub mod ui;
pub mod utils;

// Re-export common items
pub use error::ConsoleError;
pub use runner::run_scenarios;
