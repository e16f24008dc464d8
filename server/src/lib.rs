//! SRCBot Server
//!
//! Squadron channel lifecycle and access control for Discord communities:
//! overflow categories, alphabetical ordering, random sampling, archiving
//! and the chat commands that drive them.

pub mod api;
pub mod commands;
pub mod config;
pub mod db;
pub mod directory;
pub mod discord;
pub mod permissions;
pub mod squadron;
