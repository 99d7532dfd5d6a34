//! Styled QR code generation, batch export, and scanning.
//!
//! The pipeline is content -> payload ([`content`]), payload -> styled
//! raster ([`render`] with [`style`]), optional center-image compositing
//! ([`overlay`]), and encoding to the output format ([`export`]). [`batch`]
//! drives the pipeline from CSV/JSON manifests, [`scan`] runs it in
//! reverse, and [`config`] persists the settings vocabulary shared by
//! config files, manifests, and CLI flags.

pub mod batch;
pub mod cli;
pub mod color;
pub mod config;
pub mod content;
pub mod export;
pub mod overlay;
pub mod render;
pub mod samples;
pub mod scan;
pub mod style;

pub use cli::{run, Cli, Commands};
