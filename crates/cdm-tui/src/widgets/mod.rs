//! Ratatui widgets for the cdm TUI.

pub mod category_bar;
pub mod command_bar;
pub mod detail;
pub mod help;
pub mod query_bar;
pub mod results;
