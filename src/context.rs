//! Source coordinates threaded through parsing and every diagnostic.

use std::sync::Arc;

/// Identity of one spec source, chained to the location that included it.
///
/// The chain is carried by value (behind an [`Arc`]) rather than through any
/// global stack, so concurrent runners never contaminate each other's
/// diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    /// Name as input by the user (what shows up in `<name:line:col>` spans).
    pub name: String,
    /// Canonicalized path, when the source is an actual file.
    pub path: Option<std::path::PathBuf>,
    /// Location of the `include:` site that sourced this file, if any.
    pub included_from: Option<Location>,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            path: None,
            included_from: None,
        })
    }

    pub fn file(
        name: impl Into<String>,
        path: impl Into<std::path::PathBuf>,
        included_from: Option<Location>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            path: Some(path.into()),
            included_from,
        })
    }

    /// Walk the include chain from this source up to the root spec file.
    pub fn includers(&self) -> impl Iterator<Item = &Location> {
        let mut next = self.included_from.as_ref();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.source.included_from.as_ref();
            Some(current)
        })
    }
}

/// One position within a source: 1-based line and column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub source: Arc<Source>,
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(source: Arc<Source>, line: usize, col: usize) -> Self {
        Self { source, line, col }
    }

    /// Detached location for engine embedders without a spec file.
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            source: Source::new(name),
            line: 1,
            col: 1,
        }
    }

    /// `file:line:col`, the form embedded in diagnostic messages.
    pub fn position(&self) -> String {
        format!("{}:{}:{}", self.source.name, self.line, self.col)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source.name, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_format() {
        let loc = Location::new(Source::new("spec.clib"), 23, 13);
        assert_eq!(loc.position(), "spec.clib:23:13");
    }

    #[test]
    fn include_chain_walk() {
        let root = Source::file("root.clib", "/abs/root.clib", None);
        let mid_site = Location::new(root, 4, 1);
        let mid = Source::file("mid.clib", "/abs/mid.clib", Some(mid_site));
        let leaf_site = Location::new(mid, 9, 1);
        let leaf = Source::file("leaf.clib", "/abs/leaf.clib", Some(leaf_site));

        let chain: Vec<_> = leaf.includers().map(|l| l.position()).collect();
        assert_eq!(chain, vec!["mid.clib:9:1", "root.clib:4:1"]);
    }
}
