//! gn2gyp core library.
//!
//! This library translates the target graph that `gn desc` reports for one
//! or more build directories into GYP target files. GYP knows only the
//! `host` and `target` toolsets, so every GN toolchain is mapped onto one
//! of them and the per-toolchain variants of a target are merged into a
//! single GYP target.
//!
//! The pipeline runs leaves first:
//!
//! - [`snapshot`] queries raw targets concurrently and builds a
//!   [`model::Project`], which can also be loaded from a JSON snapshot;
//! - [`closure`] finds every target reachable from the configured root;
//! - [`translate`] turns each reachable target into a per-toolset fragment;
//! - [`merge`] folds fragments into GYP targets, adding proxies where GYP
//!   cannot place a product itself;
//! - [`assemble`] drives the above and groups targets into output files.

pub mod assemble;
pub mod closure;
pub mod config;
pub mod gyp;
pub mod label;
pub mod merge;
pub mod model;
pub mod snapshot;
pub mod translate;

pub use assemble::{AssembleError, GraphAssembler, TargetFiles};
pub use config::{Config, Settings};
pub use label::Label;
pub use model::Project;
