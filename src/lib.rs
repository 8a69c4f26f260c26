//! Organ Factcheck - organ health knowledge base with an AI fact-checking CLI.

pub mod ai;
pub mod config;
pub mod display;
pub mod knowledge;
pub mod runner;
pub mod session;
