//! GN label parsing and formatting.
//!
//! A label names a target as `//<path>:<name>` with an optional toolchain
//! suffix, `//<path>:<name>(<toolchain>)`. The toolchain is itself a label
//! string and is stored verbatim. [`Label`] parses and prints this grammar
//! exactly, so formatting a parsed label reproduces the input.
//!
//! ```
//! use gn2gyp::label::Label;
//!
//! let label: Label = "//base:base(//build/toolchain:host)".parse()?;
//! assert_eq!(label.path(), "base");
//! assert_eq!(label.name(), "base");
//! assert_eq!(label.toolchain(), Some("//build/toolchain:host"));
//! assert_eq!(label.to_string(), "//base:base(//build/toolchain:host)");
//! # Ok::<(), gn2gyp::label::LabelError>(())
//! ```

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised while parsing a label.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum LabelError {
    /// The string does not follow `//<path>:<name>(<toolchain>)?`.
    #[error("malformed label `{label}`: {reason}")]
    #[diagnostic(
        code(gn2gyp::label::malformed),
        help("labels look like `//path/to/dir:name` or `//dir:name(//toolchain:label)`")
    )]
    Malformed {
        /// The offending input.
        label: String,
        /// Which part of the grammar was violated.
        reason: &'static str,
    },
}

/// A fully qualified GN target label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    path: String,
    name: String,
    toolchain: Option<String>,
}

impl Label {
    /// Build a label from its parts.
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>, toolchain: Option<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            toolchain,
        }
    }

    /// Parse `//<path>:<name>(<toolchain>)?`.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Malformed`] when the leading `//`, the `:`
    /// separator or a non-empty name is missing, or when the toolchain
    /// parentheses are unbalanced.
    pub fn parse(input: &str) -> Result<Self, LabelError> {
        let malformed = |reason| LabelError::Malformed {
            label: input.to_owned(),
            reason,
        };
        let body = input
            .strip_prefix("//")
            .ok_or_else(|| malformed("missing leading `//`"))?;
        let (target, toolchain) = split_toolchain(body).map_err(malformed)?;
        let (path, name) = target
            .split_once(':')
            .ok_or_else(|| malformed("missing `:` separator"))?;
        if name.is_empty() {
            return Err(malformed("empty target name"));
        }
        if name.contains([':', '(', ')']) || path.contains(['(', ')']) {
            return Err(malformed("unexpected delimiter in path or name"));
        }
        Ok(Self::new(path, name, toolchain.map(str::to_owned)))
    }

    /// Directory part, without the leading `//`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Short target name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit toolchain qualifier, if any.
    #[must_use]
    pub fn toolchain(&self) -> Option<&str> {
        self.toolchain.as_deref()
    }

    /// The same label without a toolchain qualifier.
    #[must_use]
    pub fn without_toolchain(&self) -> Self {
        Self::new(self.path.clone(), self.name.clone(), None)
    }

    /// The same label qualified with `toolchain`.
    #[must_use]
    pub fn with_toolchain(&self, toolchain: impl Into<String>) -> Self {
        Self::new(self.path.clone(), self.name.clone(), Some(toolchain.into()))
    }

    /// Whether the unqualified form starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.without_toolchain().to_string().starts_with(prefix)
    }
}

/// Split a trailing `(<toolchain>)` group off `body`.
///
/// The toolchain is a label of its own and never contains parentheses, so
/// the group starts at the first `(`.
fn split_toolchain(body: &str) -> Result<(&str, Option<&str>), &'static str> {
    match body.split_once('(') {
        None if body.contains(')') => Err("unbalanced toolchain parentheses"),
        None => Ok((body, None)),
        Some((target, rest)) => {
            let toolchain = rest
                .strip_suffix(')')
                .ok_or("unbalanced toolchain parentheses")?;
            if toolchain.is_empty() || toolchain.contains(['(', ')']) {
                return Err("invalid toolchain qualifier");
            }
            Ok((target, Some(toolchain)))
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.path, self.name)?;
        if let Some(toolchain) = &self.toolchain {
            write!(f, "({toolchain})")?;
        }
        Ok(())
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
