//! CLI infrastructure for running and inspecting tabular agents
//!
//! This module provides the command-line interface for running agents in
//! the built-in environments and inspecting stored policies.

pub mod commands;
pub mod config;
pub mod output;
