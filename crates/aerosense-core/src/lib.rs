//! Core AeroSense assistant library (chat streaming, transcript, config).

pub mod chat;
pub mod config;
