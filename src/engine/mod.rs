//! # Engine Module
//!
//! Storage and query engine.
//!
//! This module contains the core building blocks:
//! - Identifiers and value bundles
//! - The component registry
//! - Column storage and archetypes
//! - The record index and the world
//! - Filters, queries and ordered queries
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod component;
pub mod storage;
pub mod layout;
pub mod entity;
pub mod archetype;
pub mod world;
pub mod entry;
pub mod commands;
pub mod filter;
pub mod query;
pub mod ordered;
