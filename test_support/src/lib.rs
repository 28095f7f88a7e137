//! Test utilities for building GN target graphs.
//!
//! This crate provides builders for raw targets, ready-made projects and
//! configurations, and an in-memory [`TargetQuery`] implementation that
//! records how it was called.
//!
//! [`TargetQuery`]: gn2gyp::snapshot::TargetQuery

pub mod query;
pub mod targets;

pub use query::RecordingQuery;
pub use targets::{
    BUILD, HOST_TOOLCHAIN, TARGET_TOOLCHAIN, TargetBuilder, config, project, root, settings,
};
