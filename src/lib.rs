//! # bey_meta
//!
//! Meta analysis for a Beyblade tournament league: reconstructs builds from
//! recorded combo strings, ranks parts and builds by Wilson score, and
//! summarises player results.
//!
//! - **models**: part catalog, match records, finish types
//! - **analysis**: build parser, part/build aggregation, sorting, player stats
//! - **source**: loading the part, match and registration tables, tournament scoping
//! - **cache**: snapshots of remote tables
//! - **export**: flat JSON/CSV records
//! - **display**: terminal tables

pub mod analysis;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod source;

pub use error::AppError;
pub use models::{MatchRecord, PartCatalog, PartType};
