//! Path rewriting from GN source-absolute paths to GYP variables.

/// GYP variable naming the source root.
pub const DEPTH: &str = "<(DEPTH)";
/// GYP variable naming the shared generated-output directory.
pub const SHARED_INTERMEDIATE_DIR: &str = "<(SHARED_INTERMEDIATE_DIR)";

/// Rewrites GN paths for one output group.
///
/// Returning `None` marks the path as unexpected, which aborts translation.
pub trait PathRewriter: Send + Sync {
    /// Rewrite `path` as seen from build directory `build`.
    fn rewrite(&self, build: &str, path: &str) -> Option<String>;
}

impl<F> PathRewriter for F
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync,
{
    fn rewrite(&self, build: &str, path: &str) -> Option<String> {
        self(build, path)
    }
}

/// Maps `//<out_root>/<build>/…` to [`SHARED_INTERMEDIATE_DIR`] and every
/// other source-absolute path to [`DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutRootRewriter {
    out_root: String,
}

impl OutRootRewriter {
    /// Rewriter for build directories under `out_root`.
    #[must_use]
    pub fn new(out_root: &str) -> Self {
        Self {
            out_root: out_root.trim_matches('/').to_owned(),
        }
    }
}

impl PathRewriter for OutRootRewriter {
    fn rewrite(&self, build: &str, path: &str) -> Option<String> {
        let relative = path.strip_prefix("//")?;
        let generated = relative
            .strip_prefix(self.out_root.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.strip_prefix(build))
            .and_then(|rest| rest.strip_prefix('/'));
        Some(match generated {
            Some(rest) => join(SHARED_INTERMEDIATE_DIR, rest),
            None => join(DEPTH, relative),
        })
    }
}

fn join(variable: &str, rest: &str) -> String {
    if rest.is_empty() {
        variable.to_owned()
    } else {
        format!("{variable}/{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("//out/Release/gen/x.h", Some("<(SHARED_INTERMEDIATE_DIR)/gen/x.h"))]
    #[case("//foo/bar.cc", Some("<(DEPTH)/foo/bar.cc"))]
    #[case("//out/Debug/gen/x.h", Some("<(DEPTH)/out/Debug/gen/x.h"))]
    #[case("//out/Release", Some("<(DEPTH)/out/Release"))]
    #[case("//out/Release/", Some("<(SHARED_INTERMEDIATE_DIR)"))]
    #[case("//", Some("<(DEPTH)"))]
    #[case("/usr/include", None)]
    #[case("foo/bar.cc", None)]
    fn rewrites_by_root(#[case] path: &str, #[case] expected: Option<&str>) {
        let rewriter = OutRootRewriter::new("out");
        assert_eq!(rewriter.rewrite("Release", path).as_deref(), expected);
    }

    #[rstest]
    fn closures_are_rewriters() {
        let rewriter = |_: &str, path: &str| Some(path.to_uppercase());
        assert_eq!(rewriter.rewrite("Release", "a").as_deref(), Some("A"));
    }
}
