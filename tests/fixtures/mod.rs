//! Test fixtures for evac-router.
//!
//! Provides:
//! - A small grid "city" near Quezon City with tunable risk levels
//! - Evacuation sites implementing `EvacuationSite`
//! - Brute-force simple-path enumeration for optimality checks

#![allow(dead_code)]

pub mod grid_city;

pub use grid_city::*;
