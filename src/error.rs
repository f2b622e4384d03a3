//! Error values surfaced to embedders: class, message, primary span and
//! include chain, rendered in the bit-stable format the framework's own
//! tests rely on.

use crate::context::Location;

/// Error raised while parsing a spec file or an edit section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub location: Location,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        render(f, "Clibate parsing error", &self.message, &self.location)
    }
}

impl std::error::Error for ParseError {}

/// Error raised while executing instructions against a sandbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunError {
    pub message: String,
    pub location: Location,
}

impl RunError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        render(
            f,
            "Error during clibate tests run",
            &self.message,
            &self.location,
        )
    }
}

impl std::error::Error for RunError {}

/// Either error class, for call sites crossing the parse/run boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Parse(ParseError),
    Run(RunError),
}

impl From<ParseError> for Error {
    fn from(other: ParseError) -> Self {
        Self::Parse(other)
    }
}

impl From<RunError> for Error {
    fn from(other: RunError) -> Self {
        Self::Run(other)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Run(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// ```text
/// <error-class>:
/// <message> <file:line:col>
/// <absolute source path>
/// included from <parent path>:<line>:<col>
/// ```
fn render(
    f: &mut std::fmt::Formatter<'_>,
    class: &str,
    message: &str,
    location: &Location,
) -> std::fmt::Result {
    write!(f, "{}:\n{} <{}>", class, message, location.position())?;
    if let Some(path) = &location.source.path {
        write!(f, "\n{}", path.display())?;
    }
    for includer in location.source.includers() {
        let path = match &includer.source.path {
            Some(path) => path.display().to_string(),
            None => includer.source.name.clone(),
        };
        write!(f, "\nincluded from {}:{}:{}", path, includer.line, includer.col)?;
    }
    Ok(())
}

/// Python-flavored quoting used inside diagnostic messages, so that spec
/// fragments display unambiguously (`repr`-style).
pub(crate) fn quoted(s: &str) -> String {
    let (quote, escape_quote) = if s.contains('\'') && !s.contains('"') {
        ('"', '"')
    } else {
        ('\'', '\'')
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == escape_quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Source;

    #[test]
    fn parse_error_shape() {
        let source = Source::file("edit_REPLACE", "/abs/edit_REPLACE", None);
        let err = ParseError::new(
            "Ambiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. \
             Consider quoting match and/or replace pattern(s).",
            Location::new(source, 23, 13),
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("Clibate parsing error:\n"));
        assert!(rendered.contains("<edit_REPLACE:23:13>"));
        assert!(rendered.contains("/abs/edit_REPLACE"));
    }

    #[test]
    fn run_error_include_chain() {
        let root = Source::file("root.clib", "/abs/root.clib", None);
        let site = Location::new(root, 7, 3);
        let leaf = Source::file("leaf.clib", "/abs/leaf.clib", Some(site));
        let err = RunError::new("Could not match line 'a = b'.", Location::new(leaf, 2, 1));
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Error during clibate tests run:\n\
             Could not match line 'a = b'. <leaf.clib:2:1>\n\
             /abs/leaf.clib\n\
             included from /abs/root.clib:7:3"
        );
    }

    #[test]
    fn quoting_picks_python_repr_quotes() {
        assert_eq!(quoted("plain"), "'plain'");
        assert_eq!(quoted("don't"), "\"don't\"");
        assert_eq!(quoted("a\tb"), "'a\\tb'");
    }
}
