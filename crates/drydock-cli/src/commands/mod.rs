//! CLI commands

pub mod down;
