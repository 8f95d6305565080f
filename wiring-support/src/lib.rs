//! # Wiring Support
//!
//! Shared text helpers for the Wiring IoC crates.
//!
//! This crate provides:
//! - Short, human-readable type names (also used as default registration keys)
//! - Rendering of resolution paths and "did you mean?" suggestions for errors

pub mod naming;
pub mod rendering;
