//! Pure layout logic for the habitat builder.
//!
//! This crate holds everything about a habitat layout that is independent
//! of rendering, input handling, or storage. Functions take plain data and
//! return results, so the same rules run in a browser front end, the
//! headless harness, or tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Main-module and sub-module types, ports, port compatibility |
//! | [`config`] | Validation thresholds with JSON overrides |
//! | [`constants`] | Catalog ids, grid pitch, habitability constants |
//! | [`editor`] | Placement, moves, rotation, deletion, docking, selection |
//! | [`geometry`] | Rotated footprints, overlap tests, port positions, grid snap |
//! | [`graph`] | Undirected connection graph and reachability |
//! | [`layout`] | Layout state: placed modules, connections, selection |
//! | [`validation`] | Layout diagnostics and the 3D-view gate |

pub mod catalog;
pub mod config;
pub mod constants;
pub mod editor;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod validation;

pub use layout::LayoutState;
pub use validation::{can_switch_to_3d, validate_layout, Diagnostic, Severity};
