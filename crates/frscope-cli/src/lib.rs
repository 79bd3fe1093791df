//! Command-line host for the frscope pipeline.
//!
//! Provides the concrete collaborators the core library leaves abstract:
//! a SQLite [`store::SqliteStore`], a [`sink::DirectorySink`] for exports,
//! and a [`presenter::TerminalPresenter`] that renders views in-process.

pub mod cli;
pub mod config;
pub mod presenter;
pub mod sink;
pub mod store;
