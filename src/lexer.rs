//! Lexer primitives shared by every section reader.
//!
//! The lexer is a cheap, cloneable cursor over the spec source. Speculative
//! parsing forks a clone, works on it, then commits with a plain assignment,
//! so backtracking never mutates the caller's view. Every consumption keeps
//! line/column bookkeeping so any point can be reported as a [`Location`].

use std::sync::Arc;

use crate::context::{Location, Source};
use crate::error::{quoted, ParseError};

#[derive(Clone, Debug)]
pub struct Lexer<'s> {
    rest: &'s str,
    source: Arc<Source>,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str, source: Arc<Source>) -> Self {
        Self {
            rest: input,
            source,
            line: 1,
            col: 1,
        }
    }

    /// Start lexing at an arbitrary point of a larger source.
    pub fn at(input: &'s str, location: Location) -> Self {
        Self {
            rest: input,
            source: location.source,
            line: location.line,
            col: location.col,
        }
    }

    pub fn context(&self) -> Location {
        Location::new(self.source.clone(), self.line, self.col)
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    pub fn rest(&self) -> &'s str {
        self.rest
    }

    pub fn is_consumed(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.context())
    }

    /// Split off the next `n` bytes, updating line/column bookkeeping.
    pub(crate) fn consume_bytes(&mut self, n: usize) -> &'s str {
        let (consumed, rest) = self.rest.split_at(n);
        self.rest = rest;
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        consumed
    }

    pub(crate) fn strip_ws(&mut self) -> &mut Self {
        let n = self.rest.len() - self.rest.trim_start().len();
        self.consume_bytes(n);
        self
    }

    /// Strip whitespace without crossing the end of the current line.
    pub(crate) fn strip_inline_ws(&mut self) -> &mut Self {
        let n = self
            .rest
            .find(|c: char| !c.is_whitespace() || c == '\n' || c == '\r')
            .unwrap_or(self.rest.len());
        self.consume_bytes(n);
        self
    }

    /// Consume `token` if the input starts with it.
    pub(crate) fn match_token(&mut self, token: &str) -> bool {
        if self.rest.starts_with(token) {
            self.consume_bytes(token.len());
            true
        } else {
            false
        }
    }

    /// Consume whitespace then `token`; consume nothing on failure.
    pub fn find(&mut self, token: &str) -> bool {
        let mut probe = self.clone();
        probe.strip_ws();
        if probe.match_token(token) {
            *self = probe;
            true
        } else {
            false
        }
    }

    /// Whether only whitespace remains.
    pub fn find_end(&mut self) -> bool {
        let mut probe = self.clone();
        probe.strip_ws();
        if probe.is_consumed() {
            *self = probe;
            true
        } else {
            false
        }
    }

    /// Whitespace-skipping peek: does `token` come next?
    pub fn peek(&self, token: &str) -> bool {
        self.rest.trim_start().starts_with(token)
    }

    /// Next whitespace-delimited word, or `""` when the input is blank.
    pub fn read_split(&mut self) -> &'s str {
        self.strip_ws();
        let n = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        self.consume_bytes(n)
    }

    /// Raw read until `stop`, or `None` (consuming nothing) if absent.
    pub(crate) fn read_until(&mut self, stop: &str, consume_stop: bool) -> Option<&'s str> {
        let at = self.rest.find(stop)?;
        let read = self.consume_bytes(at);
        if consume_stop {
            self.consume_bytes(stop.len());
        }
        Some(read)
    }

    pub(crate) fn read_to_end(&mut self) -> &'s str {
        self.consume_bytes(self.rest.len())
    }

    /// Raw read until the earliest of `stops` (ties resolved to the longest
    /// stop). Returns the winning stop's index and the text before it.
    pub(crate) fn read_until_any(
        &mut self,
        stops: &[&str],
        consume_stop: bool,
    ) -> Option<(usize, &'s str)> {
        let mut best: Option<(usize, usize)> = None; // (byte offset, stop index)
        for (i, stop) in stops.iter().enumerate() {
            if let Some(at) = self.rest.find(stop) {
                let better = match best {
                    None => true,
                    Some((b_at, b_i)) => at < b_at || (at == b_at && stops[b_i].len() < stop.len()),
                };
                if better {
                    best = Some((at, i));
                }
            }
        }
        let (at, i) = best?;
        let read = self.consume_bytes(at);
        if consume_stop {
            self.consume_bytes(stops[i].len());
        }
        Some((i, read))
    }

    /// Extract a sub-lexer over the current line; the receiver moves past the
    /// terminating newline. Automatons are fed one of these per line.
    pub(crate) fn split_line(&mut self) -> Lexer<'s> {
        let mut line = self.clone();
        match self.read_until("\n", true) {
            Some(read) => line.rest = read,
            None => {
                self.read_to_end();
            }
        }
        line
    }

    // ---------------------------------------------------------------- quoting

    /// Parse a quoted string next on the input: `'…'`, `"…"`, triple-quoted
    /// variants, all with an optional leading `r` marking a raw (no-escape)
    /// string. Consumes nothing unless a complete string parses.
    pub fn read_quoted(&mut self) -> Option<String> {
        let mut probe = self.clone();
        probe.strip_ws();
        let (cooked, len) = parse_quoted(probe.rest)?;
        probe.consume_bytes(len);
        *self = probe;
        Some(cooked)
    }

    // ------------------------------------------------------------------ lines

    /// Raw read until a comment sign, end of line or end of input; the
    /// newline is consumed, the read is trimmed.
    pub fn read_line(&mut self) -> &'s str {
        let read = match self.read_until_any(&["#", "\n"], true) {
            Some((0, read)) => {
                // Discard the rest of the commented line.
                if self.read_until("\n", true).is_none() {
                    self.read_to_end();
                }
                read
            }
            Some((_, read)) => read,
            None => self.read_to_end(),
        };
        read.trim()
    }

    /// Like [`read_line`](Self::read_line), erroring when the line carries
    /// no data.
    pub fn read_line_expecting(&mut self, expected: &str) -> Result<&'s str, ParseError> {
        let context = self.clone();
        let read = self.read_line();
        if read.is_empty() {
            *self = context;
            return Err(self.error(format!("Missing expected data: {}.", quoted(expected))));
        }
        Ok(read)
    }

    /// A whole line that is either one quoted string or a raw read.
    /// Returns the text and whether the read was raw.
    pub fn read_string_or_raw_line(&mut self) -> Result<(String, bool), ParseError> {
        match self.read_item_until_any(&["#", "\n"], &[])? {
            Some((stop, read, raw)) => {
                if stop == Some(0) {
                    // Consume and ignore anything after the comment sign.
                    if self.read_until("\n", true).is_none() {
                        self.read_to_end();
                    }
                }
                Ok((read, raw))
            }
            None => unreachable!("end of input always stops a line read"),
        }
    }

    pub fn read_string_or_raw_line_expecting(
        &mut self,
        expected: &str,
    ) -> Result<String, ParseError> {
        let context = self.clone();
        let (read, raw) = self.read_string_or_raw_line()?;
        if raw && read.is_empty() {
            *self = context;
            return Err(self.error(format!("Missing expected data: {}.", quoted(expected))));
        }
        Ok(read)
    }

    /// Quoted-or-raw read until one of `stops` (or end of input, reported as
    /// a `None` stop index). Raw reads abort on any of `guards` and are
    /// trimmed; quoted reads must be followed by nothing but whitespace
    /// before the stop. `Ok(None)` means "no stop ahead: consumed nothing".
    pub(crate) fn read_item_until_any(
        &mut self,
        stops: &[&str],
        guards: &[&str],
    ) -> Result<Option<(Option<usize>, String, bool)>, ParseError> {
        let mut probe = self.clone();
        if let Some(string) = probe.read_quoted() {
            let junk_loc = probe.clone();
            let (stop, between) = match probe.read_until_any(stops, true) {
                Some((i, read)) => (Some(i), read),
                None => (None, probe.read_to_end()),
            };
            if !between.trim().is_empty() {
                let mut at = junk_loc;
                at.consume_bytes(between.len() - between.trim_start().len());
                let stop_name = match stop {
                    Some(i) => quoted(stops[i]),
                    None => "end of input".to_owned(),
                };
                return Err(at.error(format!(
                    "Unexpected data found between string and {}: {}.",
                    stop_name,
                    quoted(between.trim()),
                )));
            }
            *self = probe;
            return Ok(Some((stop, string, false)));
        }

        let mut all_stops: Vec<&str> = stops.to_vec();
        all_stops.extend_from_slice(guards);
        let (stop, read) = match probe.read_until_any(&all_stops, true) {
            Some((i, _)) if i >= stops.len() => return Ok(None), // hit a guard
            Some((i, read)) => (Some(i), read),
            None => (None, probe.read_to_end()),
        };
        // The raw segment could hide junk followed by a quoted string.
        if let Some(junk) = data_before_string(read) {
            let mut at = self.clone();
            at.strip_ws();
            return Err(at.error(format!(
                "Unexpected data found before string: {}.",
                quoted(junk),
            )));
        }
        *self = probe;
        Ok(Some((stop, read.trim().to_owned(), true)))
    }

    /// Consume a blank line (whitespace and/or comment); false if the line
    /// carries data, in which case nothing is consumed.
    pub fn find_empty_line(&mut self) -> bool {
        let mut probe = self.clone();
        if probe.read_line().is_empty() {
            *self = probe;
            true
        } else {
            false
        }
    }

    /// Require the rest of the line to be blank.
    pub fn check_empty_line(&mut self) -> Result<(), ParseError> {
        let mut probe = self.clone();
        probe.strip_inline_ws();
        let at = probe.clone();
        let read = probe.read_line();
        if !read.is_empty() {
            return Err(at.error(format!(
                "Unexpected data after end of line: {}.",
                quoted(read),
            )));
        }
        *self = probe;
        Ok(())
    }

    // ----------------------------------------------------------------- tuples

    /// Comma-separated raw or quoted values within parentheses.
    /// `arity` lists the accepted value counts (empty = any).
    pub fn read_tuple(&mut self, arity: &[usize]) -> Result<Vec<String>, ParseError> {
        match self.read_tuple_inner(arity, false)? {
            Some(values) => Ok(values),
            None => unreachable!("non-optional tuple read either parses or errors"),
        }
    }

    /// Like [`read_tuple`], returning `None` when no opening parenthesis
    /// comes next.
    pub fn read_tuple_opt(
        &mut self,
        arity: &[usize],
    ) -> Result<Option<Vec<String>>, ParseError> {
        self.read_tuple_inner(arity, true)
    }

    fn read_tuple_inner(
        &mut self,
        arity: &[usize],
        optional: bool,
    ) -> Result<Option<Vec<String>>, ParseError> {
        let mut probe = self.clone();
        probe.strip_ws();
        let opening = probe.context();
        if !probe.match_token("(") {
            if optional {
                return Ok(None);
            }
            return Err(ParseError::new("Missing opening parenthesis.", opening));
        }
        let mut values = Vec::new();
        let mut last_raw_empty = false;
        loop {
            let item = probe.read_item_until_any(&[",", ")"], &["\n"])?;
            let (stop, read, raw) = match item {
                Some((Some(stop), read, raw)) => (stop, read, raw),
                _ => {
                    return Err(ParseError::new(
                        "Missing comma in tuple or unmatched parenthesis.",
                        opening,
                    ))
                }
            };
            last_raw_empty = raw && read.is_empty();
            values.push(read);
            if stop == 1 {
                break;
            }
        }
        if last_raw_empty {
            // Trailing comma or empty tuple: the last read was no value.
            values.pop();
        }
        if !arity.is_empty() && !arity.contains(&values.len()) {
            let expected = match arity {
                [single] => single.to_string(),
                [head @ .., last] => format!(
                    "either {} or {}",
                    head.iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    last
                ),
                [] => unreachable!(),
            };
            let plural = if arity[arity.len() - 1] > 1 { "s" } else { "" };
            let shown = match values.as_slice() {
                [single] => format!("({},)", quoted(single)),
                values => format!(
                    "({})",
                    values
                        .iter()
                        .map(|v| quoted(v))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };
            return Err(ParseError::new(
                format!(
                    "Expected {} value{} in tuple, found {} instead: {}.",
                    expected,
                    plural,
                    values.len(),
                    shown
                ),
                opening,
            ));
        }
        *self = probe;
        Ok(Some(values))
    }

    // --------------------------------------------------------------- heredocs

    /// Multiline verbatim read delimited by a marker word. The marker is read
    /// from the input unless already `known`; the content is dedented unless
    /// the marker is `<angle-braced>`.
    pub fn read_heredoc(
        &mut self,
        name: &str,
        known: Option<&str>,
    ) -> Result<String, ParseError> {
        let mut probe = self.clone();
        let marker: String = match known {
            Some(marker) => marker.to_owned(),
            None => {
                probe.strip_ws();
                let marker = probe.read_split();
                if marker.is_empty() {
                    return Err(probe.error(format!(
                        "Unexpected end of file when reading end-of-{} marker.",
                        name
                    )));
                }
                let marker = marker.to_owned();
                probe.check_empty_line()?;
                marker
            }
        };
        let mark_loc = probe.context();
        let read = match probe.read_until(&marker, true) {
            Some(read) => read,
            None => {
                return Err(ParseError::new(
                    format!("Missing closing {} marker: {}.", name, quoted(&marker)),
                    mark_loc,
                ))
            }
        };
        let read = if marker.starts_with('<') && marker.ends_with('>') {
            read.to_owned()
        } else {
            dedent(read)
        };
        *self = probe;
        Ok(read)
    }
}

/// Longest whitespace prefix shared by all non-blank lines, stripped.
fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let common = current
                    .char_indices()
                    .zip(indent.chars())
                    .take_while(|((_, a), b)| a == b)
                    .count();
                &current[..common]
            }
        });
    }
    let margin = margin.unwrap_or("");
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            out.push_str(line.trim_start_matches(|c| c != '\n'));
        } else {
            out.push_str(line.strip_prefix(margin).unwrap_or(line));
        }
    }
    out
}

/// Attempt to parse a quoted string at the very start of `input` (no leading
/// whitespace). Returns the cooked value and the byte length consumed.
fn parse_quoted(input: &str) -> Option<(String, usize)> {
    let (raw, body) = match input.strip_prefix('r') {
        Some(stripped) if stripped.starts_with('\'') || stripped.starts_with('"') => {
            (true, stripped)
        }
        _ => (false, input),
    };
    let quote = body.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let triple = body.len() >= 3 && body[..3].chars().all(|c| c == quote);
    let delim_len = if triple { 3 } else { 1 };
    let delim = &body[..delim_len];
    let content = &body[delim_len..];

    let mut cooked = String::new();
    let mut chars = content.char_indices();
    loop {
        let (at, c) = chars.next()?;
        if c == '\\' {
            let (_, escaped) = chars.next()?;
            if raw {
                cooked.push('\\');
                cooked.push(escaped);
            } else {
                match escaped {
                    'n' => cooked.push('\n'),
                    't' => cooked.push('\t'),
                    'r' => cooked.push('\r'),
                    '0' => cooked.push('\0'),
                    '\\' => cooked.push('\\'),
                    '\'' => cooked.push('\''),
                    '"' => cooked.push('"'),
                    '\n' => {} // line continuation
                    c => {
                        // Unknown escapes keep their backslash, so regex
                        // fragments survive quoting unscathed.
                        cooked.push('\\');
                        cooked.push(c);
                    }
                }
            }
            continue;
        }
        if content[at..].starts_with(delim) {
            // Skip past the rest of the closing delimiter.
            for _ in 1..delim_len {
                chars.next();
            }
            let end = at + delim_len;
            let prefix_len = if raw { 1 } else { 0 };
            return Some((cooked, prefix_len + delim_len + end));
        }
        if !triple && c == '\n' {
            return None; // single-quoted strings do not span lines
        }
        cooked.push(c);
    }
}

/// When a raw read actually hides `junk 'then a string'`, report the junk.
fn data_before_string(read: &str) -> Option<&str> {
    for (at, c) in read.char_indices() {
        if c != '\'' && c != '"' {
            continue;
        }
        // An `r` glued in front of the quote is part of the string syntax,
        // provided it stands alone in front of it.
        let start = match read[..at].strip_suffix('r') {
            Some(before) if before.is_empty() || before.ends_with(char::is_whitespace) => at - 1,
            _ => at,
        };
        if parse_quoted(&read[start..]).is_some() {
            let junk = read[..start].trim();
            if !junk.is_empty() {
                return Some(junk);
            }
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer(input: &str) -> Lexer<'_> {
        Lexer::new(input, Source::new("<test>"))
    }

    #[test]
    fn find_skips_whitespace_only() {
        let mut l = lexer("  a b");
        assert!(!l.match_token("a"));
        assert!(l.find("a"));
        assert!(l.find("b"));
        assert!(l.find_end());
    }

    #[test]
    fn read_split_words() {
        let mut l = lexer(" a  b ce ");
        assert_eq!(l.read_split(), "a");
        assert_eq!(l.read_split(), "b");
        assert_eq!(l.read_split(), "ce");
        assert_eq!(l.read_split(), "");
    }

    #[test]
    fn line_and_column_tracking() {
        let mut l = lexer("ab\ncd");
        l.consume_bytes(4);
        let loc = l.context();
        assert_eq!((loc.line, loc.col), (2, 2));
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(lexer(" 'test' rest").read_quoted().as_deref(), Some("test"));
        assert_eq!(
            lexer(r#" "esc\t" "#).read_quoted().as_deref(),
            Some("esc\t")
        );
        assert_eq!(
            lexer(r#" r"raw\t" "#).read_quoted().as_deref(),
            Some("raw\\t")
        );
        assert_eq!(
            lexer(" '''triple ' quoted''' x").read_quoted().as_deref(),
            Some("triple ' quoted")
        );
        assert_eq!(
            lexer(r" 'kept\d' ").read_quoted().as_deref(),
            Some("kept\\d")
        );
        assert_eq!(lexer(" 'unfinished \"strings").read_quoted(), None);
        assert_eq!(lexer(" not 'a'").read_quoted(), None);
        assert_eq!(lexer(" 'no\nnewline'").read_quoted(), None);
    }

    #[test]
    fn quoted_string_consumption() {
        let mut l = lexer(" 'b' r'''multi\n''' raw");
        assert_eq!(l.read_quoted().as_deref(), Some("b"));
        assert_eq!(l.read_quoted().as_deref(), Some("multi\n"));
        assert_eq!(l.read_quoted(), None);
        assert_eq!(l.read_split(), "raw");
    }

    #[test]
    fn read_line_strips_comments() {
        let mut l = lexer("  raw-read this line # not this comment \nnext");
        assert_eq!(l.read_line(), "raw-read this line");
        assert_eq!(l.read_line(), "next");
        assert_eq!(l.read_line(), "");
    }

    #[test]
    fn string_or_raw_line() {
        let (read, raw) = lexer("  'quote-read #this one' # comment ")
            .read_string_or_raw_line()
            .unwrap();
        assert_eq!((read.as_str(), raw), ("quote-read #this one", false));

        let (read, raw) = lexer(" raw read ").read_string_or_raw_line().unwrap();
        assert_eq!((read.as_str(), raw), ("raw read", true));

        let err = lexer(" 'string' unwanted # c")
            .read_string_or_raw_line()
            .unwrap_err();
        assert_eq!(
            err.message,
            "Unexpected data found between string and '#': 'unwanted'."
        );

        let err = lexer(" unwanted 'string'")
            .read_string_or_raw_line()
            .unwrap_err();
        assert_eq!(err.message, "Unexpected data found before string: 'unwanted'.");
    }

    #[test]
    fn empty_lines() {
        assert!(lexer(" # finished line \nnext").find_empty_line());
        assert!(lexer("  ").find_empty_line());
        assert!(!lexer(" rest # unfinished").find_empty_line());

        let err = lexer(" rest # unfinished").check_empty_line().unwrap_err();
        assert_eq!(err.message, "Unexpected data after end of line: 'rest'.");
    }

    #[test]
    fn tuples_nominal() {
        assert_eq!(lexer(" (raw read) ").read_tuple(&[]).unwrap(), vec!["raw read"]);
        assert_eq!(
            lexer(" (read, three, 'nice, (nice) values') ")
                .read_tuple(&[])
                .unwrap(),
            vec!["read", "three", "nice, (nice) values"]
        );
        assert_eq!(
            lexer(" (two with, closing comma, ) ").read_tuple(&[]).unwrap(),
            vec!["two with", "closing comma"]
        );
        assert_eq!(lexer(" () ").read_tuple(&[0]).unwrap(), Vec::<String>::new());
        assert_eq!(lexer(" ('') ").read_tuple(&[]).unwrap(), vec![""]);
        assert_eq!(lexer(" (, '') ").read_tuple(&[]).unwrap(), vec!["", ""]);
        assert_eq!(lexer(" (a,,) ").read_tuple(&[]).unwrap(), vec!["a", ""]);
    }

    #[test]
    fn tuples_optional_and_errors() {
        assert_eq!(lexer(" no opening) ").read_tuple_opt(&[]).unwrap(), None);
        assert_eq!(
            lexer(" no opening) ").read_tuple(&[]).unwrap_err().message,
            "Missing opening parenthesis."
        );
        assert_eq!(
            lexer(" (no closing ").read_tuple(&[]).unwrap_err().message,
            "Missing comma in tuple or unmatched parenthesis."
        );
        assert_eq!(
            lexer(" (no, closing \n too late) ")
                .read_tuple(&[])
                .unwrap_err()
                .message,
            "Missing comma in tuple or unmatched parenthesis."
        );
        assert_eq!(
            lexer(" (wrong, number) ").read_tuple(&[3]).unwrap_err().message,
            "Expected 3 values in tuple, found 2 instead: ('wrong', 'number')."
        );
        assert_eq!(
            lexer(" (wrong, number) ")
                .read_tuple(&[3, 4, 5])
                .unwrap_err()
                .message,
            "Expected either 3, 4 or 5 values in tuple, found 2 instead: ('wrong', 'number')."
        );
        assert_eq!(
            lexer(" (lone) ").read_tuple(&[3, 1]).unwrap_err().message,
            "Expected either 3 or 1 value in tuple, found 1 instead: ('lone',)."
        );
    }

    #[test]
    fn heredoc_reads() {
        let mut l = lexer(" EOR # opening marker\n raw\n read\nEOR # closing");
        assert_eq!(l.read_heredoc("file", None).unwrap(), "raw\nread\n");

        let mut l = lexer(" <EOR> # no dedent\n raw\n read\n<EOR>");
        assert_eq!(l.read_heredoc("file", None).unwrap(), " raw\n read\n");

        let err = lexer(" EOR\n raw\n # no closing")
            .read_heredoc("file", None)
            .unwrap_err();
        assert_eq!(err.message, "Missing closing file marker: 'EOR'.");

        let err = lexer(" EOR extra data\n x\nEOR")
            .read_heredoc("file", None)
            .unwrap_err();
        assert_eq!(err.message, "Unexpected data after end of line: 'extra data'.");

        let err = lexer(" ").read_heredoc("file", None).unwrap_err();
        assert_eq!(
            err.message,
            "Unexpected end of file when reading end-of-file marker."
        );

        let mut l = lexer(" marker\n already\n given EOR ");
        assert_eq!(
            l.read_heredoc("file", Some("EOR")).unwrap(),
            "marker\nalready\ngiven "
        );
    }

    #[test]
    fn split_line_isolates_one_line() {
        let mut l = lexer("first line\nsecond");
        let mut line = l.split_line();
        assert_eq!(line.read_line(), "first line");
        assert!(line.is_consumed());
        assert_eq!(l.read_line(), "second");
    }
}
