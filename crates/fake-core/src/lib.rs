//! Core types, hashing, and configuration for fake.
//!
//! This crate provides the foundational pieces used across all fake crates:
//! - [`syntax`] — Go syntax model (closed `TypeExpr` union, interfaces, signatures)
//! - [`hash`] — Deterministic content hashing (base62 of xxhash64)
//! - [`config`] — Configuration loading from `.fake.json`
//! - [`paths`] — Output naming conventions for generated files

pub mod config;
pub mod hash;
pub mod paths;
pub mod syntax;
