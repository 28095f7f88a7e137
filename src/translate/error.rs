//! Error types for target translation.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

use crate::config::GroupError;
use crate::model::ModelError;

/// Errors raised while translating a GN target into a fragment.
#[derive(Debug, Error, Diagnostic)]
pub enum TranslateError {
    /// A toolchain has no entry in the toolchain table.
    #[error("toolchain `{toolchain}` used by `{label}` maps to no GYP toolset")]
    #[diagnostic(
        code(gn2gyp::translate::unrecognized_toolchain),
        help("add the toolchain to the `toolchains` table")
    )]
    UnrecognizedToolchain {
        /// Unmapped toolchain label.
        toolchain: String,
        /// Target being translated.
        label: String,
    },
    /// A path lies neither under the build directory nor the source root.
    #[error("unexpected path `{path}` in `{label}`")]
    #[diagnostic(code(gn2gyp::translate::unexpected_path))]
    UnexpectedPath {
        /// Path that could not be rewritten.
        path: String,
        /// Target being translated.
        label: String,
    },
    /// An action declares no script.
    #[error("action `{label}` has no script")]
    #[diagnostic(code(gn2gyp::translate::missing_script))]
    MissingScript {
        /// Target being translated.
        label: String,
    },
    /// An include flag ends the flag list.
    #[error("flag `{flag}` of `{label}` expects a directory but ends the flag list")]
    #[diagnostic(code(gn2gyp::translate::malformed_flags))]
    MalformedFlags {
        /// Dangling flag.
        flag: String,
        /// Target being translated.
        label: String,
    },
    /// The target uses a construct with no GYP translation.
    #[error("`{label}`: {what} is not supported")]
    #[diagnostic(code(gn2gyp::translate::not_implemented))]
    NotImplemented {
        /// Target being translated.
        label: String,
        /// Unsupported construct.
        what: String,
    },
    /// Output group assignment failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Group(#[from] GroupError),
    /// Model lookup failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
}
