//! The condensed mini-language used inside parenthesized prefix patterns,
//! and the `\N` substitution templates of regex-mode instructions.

use regex::Regex;

/// Expand a raw (unquoted) prefix notation into the literal prefix it
/// denotes.
///
/// Condensed interpretation triggers when the notation carries a digit, or
/// consists only of the `t`/`s` shortcut letters. Within it, an integer `N`
/// repeats the next character (`t` is a tab, `s` a space, a trailing integer
/// means spaces), bare `t`/`s` stand for one tab/space, and a non-whitespace
/// ending receives one implicit trailing space. Other notations are literal,
/// except for the bare comment sign `#` which keeps its natural separating
/// space; quoted notations bypass this function entirely.
pub(crate) fn decode_prefix(notation: &str) -> String {
    let condensed = notation.chars().any(|c| c.is_ascii_digit())
        || (!notation.is_empty() && notation.chars().all(|c| c == 't' || c == 's'));
    let mut decoded = String::with_capacity(notation.len());
    if condensed {
        let mut chars = notation.chars().peekable();
        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                let mut n = c.to_digit(10).unwrap() as usize;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    n = n * 10 + d as usize;
                    chars.next();
                }
                let unit = match chars.next() {
                    Some('t') => '\t',
                    Some('s') | None => ' ',
                    Some(c) => c,
                };
                decoded.extend(std::iter::repeat(unit).take(n));
            } else {
                decoded.push(match c {
                    't' => '\t',
                    's' => ' ',
                    c => c,
                });
            }
        }
        if !decoded.is_empty() && !decoded.ends_with(char::is_whitespace) {
            decoded.push(' ');
        }
    } else if notation == "#" {
        decoded.push_str("# ");
    } else {
        decoded.push_str(notation);
    }
    decoded
}

/// A replace-side substitution template: literal text interspersed with
/// `\N` group references. Unknown escapes keep their backslash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Template {
    chunks: Vec<Chunk>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Chunk {
    Literal(String),
    Group(usize),
}

impl Template {
    pub(crate) fn parse(text: &str) -> Self {
        let mut chunks = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                literal.push(c);
                continue;
            }
            match chars.peek() {
                Some(&'\\') => {
                    literal.push('\\');
                    chars.next();
                }
                Some(d) if d.is_ascii_digit() => {
                    let mut n = 0usize;
                    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                        n = n * 10 + d as usize;
                        chars.next();
                    }
                    if !literal.is_empty() {
                        chunks.push(Chunk::Literal(std::mem::take(&mut literal)));
                    }
                    chunks.push(Chunk::Group(n));
                }
                _ => literal.push('\\'),
            }
        }
        if !literal.is_empty() {
            chunks.push(Chunk::Literal(literal));
        }
        Self { chunks }
    }

    /// Highest group referenced, for validation against a compiled pattern.
    pub(crate) fn max_group(&self) -> usize {
        self.chunks
            .iter()
            .map(|c| match c {
                Chunk::Group(n) => *n,
                Chunk::Literal(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }

    /// Check all group references against `pattern`'s capture count.
    /// The error value is the offending group number.
    pub(crate) fn check_against(&self, pattern: &Regex) -> Result<(), usize> {
        let available = pattern.captures_len(); // includes group 0
        match self.chunks.iter().find_map(|c| match c {
            Chunk::Group(n) if *n >= available => Some(*n),
            _ => None,
        }) {
            Some(n) => Err(n),
            None => Ok(()),
        }
    }

    pub(crate) fn expand(&self, caps: &regex::Captures<'_>) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Literal(text) => out.push_str(text),
                Chunk::Group(n) => {
                    if let Some(group) = caps.get(*n) {
                        out.push_str(group.as_str());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condensed_round_trips() {
        assert_eq!(decode_prefix("4s#1"), "    # ");
        assert_eq!(decode_prefix("2t#t"), "\t\t#\t");
        assert_eq!(decode_prefix("#1"), "# ");
    }

    #[test]
    fn digit_repeats_next_character() {
        assert_eq!(decode_prefix("4"), "    ");
        assert_eq!(decode_prefix("1t2s"), "\t  ");
        assert_eq!(decode_prefix("#2m14s"), "#mm              ");
        assert_eq!(decode_prefix("4#"), "#### ");
    }

    #[test]
    fn shortcut_only_notations() {
        assert_eq!(decode_prefix("s"), " ");
        assert_eq!(decode_prefix("t"), "\t");
        assert_eq!(decode_prefix("ts"), "\t ");
    }

    #[test]
    fn literal_notations_stay_verbatim() {
        assert_eq!(decode_prefix("//"), "//");
        assert_eq!(decode_prefix("##!"), "##!");
        assert_eq!(decode_prefix("-"), "-");
        assert_eq!(decode_prefix("nodigits"), "nodigits");
        assert_eq!(decode_prefix(""), "");
    }

    #[test]
    fn bare_comment_sign_keeps_its_separating_space() {
        assert_eq!(decode_prefix("#"), "# ");
    }

    #[test]
    fn template_expansion() {
        let re = Regex::new(r"(\w+)-(\w+)").unwrap();
        let caps = re.captures("left-right").unwrap();
        let t = Template::parse(r"\2 then \1 (\0)");
        assert_eq!(t.expand(&caps), "right then left (left-right)");
    }

    #[test]
    fn template_escapes() {
        let re = Regex::new(r"(a)").unwrap();
        let caps = re.captures("a").unwrap();
        assert_eq!(Template::parse(r"\\1").expand(&caps), r"\1");
        assert_eq!(Template::parse(r"\d").expand(&caps), r"\d");
    }

    #[test]
    fn template_group_validation() {
        let re = Regex::new(r"(a)(b)").unwrap();
        assert_eq!(Template::parse(r"\1\2").check_against(&re), Ok(()));
        assert_eq!(Template::parse(r"\3").check_against(&re), Err(3));
    }
}
