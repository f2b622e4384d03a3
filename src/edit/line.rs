//! The line model shared by all line-structured edit instructions.
//!
//! A matched or produced file line is five concatenated regions: indent `I`,
//! prefix `P`, inserted extra `X`, body (`A` matched, `B` produced), and
//! trailing whitespace `T`. Matching decides which regions participate from
//! the star marks; building decides which matched regions are kept.

use crate::context::Location;
use crate::edit::notation::Template;
use crate::error::quoted;

/// Match-side prefix: decoded literal text, or a compiled regex when the
/// instruction carries the `/` mark.
#[derive(Clone, Debug)]
pub(crate) enum PrefixPattern {
    Literal(String),
    Regex { regex: regex::Regex, notation: String },
}

impl PrefixPattern {
    /// How the prefix shows up in "could not match" reports.
    pub(crate) fn display(&self) -> String {
        match self {
            Self::Literal(text) => quoted(text),
            Self::Regex { notation, .. } => format!("/{}/", notation),
        }
    }
}

/// Match side of one instruction line.
#[derive(Clone, Debug)]
pub(crate) struct LineMatcher {
    /// `None` when the instruction gave no parenthesized prefix.
    pub(crate) prefix: Option<PrefixPattern>,
    /// Whether a free indent run may precede the prefix/body (literal mode;
    /// regex prefixes consume their own leading whitespace).
    pub(crate) loose_indent: bool,
    /// Body `A`, compared trimmed unless `exact_tail`.
    pub(crate) body: String,
    /// Quoted bodies with explicit tails (or a post-body `*`) match `T`
    /// literally.
    pub(crate) exact_tail: bool,
    pub(crate) location: Location,
}

/// The regions captured from a successfully matched file line.
pub(crate) struct LineMatch<'l> {
    pub(crate) indent: &'l str,
    pub(crate) prefix: &'l str,
    /// Body including its trailing whitespace, for body-reusing rebuilds.
    pub(crate) body: &'l str,
    /// Regex-mode capture groups over the matched header.
    pub(crate) caps: Option<regex::Captures<'l>>,
}

impl LineMatcher {
    pub(crate) fn match_line<'l>(&self, line: &'l str) -> Option<LineMatch<'l>> {
        if let Some(PrefixPattern::Regex { regex, .. }) = &self.prefix {
            let caps = regex.captures(line)?;
            let header = caps.get(0).expect("group 0 always participates");
            if header.start() != 0 {
                return None;
            }
            let body = &line[header.end()..];
            let compared = if self.exact_tail { body } else { body.trim_end() };
            if compared != self.body {
                return None;
            }
            let prefix = &line[..header.end()];
            return Some(LineMatch {
                indent: "",
                prefix,
                body,
                caps: Some(caps),
            });
        }

        let (indent, after_indent) = if self.loose_indent {
            line.split_at(line.len() - line.trim_start().len())
        } else {
            ("", line)
        };
        let prefix = match &self.prefix {
            Some(PrefixPattern::Literal(p)) => p.as_str(),
            _ => "",
        };
        let body = after_indent.strip_prefix(prefix)?;
        let compared = if self.exact_tail { body } else { body.trim_end() };
        if compared != self.body {
            return None;
        }
        Some(LineMatch {
            indent,
            prefix: &after_indent[..prefix.len()],
            body,
            caps: None,
        })
    }

    /// The runtime report for an instruction whose match set came up empty.
    pub(crate) fn no_match_message(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!(
                "Could not match line {} with prefix {}.",
                quoted(&self.body),
                prefix.display()
            ),
            None => format!("Could not match line {}.", quoted(&self.body)),
        }
    }
}

/// Replace-side `X` region.
#[derive(Clone, Debug)]
pub(crate) enum Extra {
    /// Decoded literal (empty when no tuple was given).
    Literal(String),
    /// Regex-mode substitution template, expanded over the matched header.
    Template(Template),
    /// UNPREF/ keeps the header's first capture group only.
    KeptGroup,
}

/// One produced line: which matched regions to keep, what to insert, and
/// the body to emit (`None` reuses the matched body, tail included).
#[derive(Clone, Debug)]
pub(crate) struct NewLine {
    pub(crate) keep_indent: bool,
    pub(crate) keep_prefix: bool,
    pub(crate) extra: Extra,
    pub(crate) body: Option<String>,
}

impl NewLine {
    pub(crate) fn build(&self, matched: &LineMatch<'_>) -> String {
        let mut line = String::new();
        match &self.extra {
            Extra::Literal(extra) => {
                if self.keep_indent {
                    line.push_str(matched.indent);
                }
                if self.keep_prefix {
                    line.push_str(matched.prefix);
                }
                line.push_str(extra);
            }
            Extra::Template(template) => {
                let caps = matched.caps.as_ref().expect("regex match carries captures");
                line.push_str(&template.expand(caps));
            }
            Extra::KeptGroup => {
                let caps = matched.caps.as_ref().expect("regex match carries captures");
                if let Some(group) = caps.get(1) {
                    line.push_str(group.as_str());
                }
            }
        }
        match &self.body {
            Some(body) => line.push_str(body),
            None => line.push_str(matched.body),
        }
        line
    }
}

/// Replace-side star marks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ReplaceStar {
    None,
    Star,
    DoubleStar,
}

/// Match-side star rule: which instruction lines get a free indent.
///
/// By default a bare body floats over any indent while a specified prefix
/// anchors at column 0 (its notation covers the indent); the star flips
/// both. UNPREF differs: its mandatory prefix floats by default and the
/// star anchors it.
pub(crate) fn match_indent(has_prefix: bool, star: bool) -> bool {
    has_prefix == star
}

/// The replace-side region table, keyed by (has-prefix, match-star,
/// has-extra, replace-star). Illegal cells are parse errors, reported with
/// the message the caller attaches to the star's location.
pub(crate) fn replace_regions(
    has_prefix: bool,
    match_star: bool,
    has_extra: bool,
    star: ReplaceStar,
) -> Result<(bool, bool), &'static str> {
    if star == ReplaceStar::DoubleStar && !(has_prefix && match_star) {
        return Err(
            "Double replace star mark '**' is meaningless without matching both \
             variable indent (I) and a fixed prefix (P).",
        );
    }
    if !has_prefix && match_star && star != ReplaceStar::None {
        return Err(
            "Replace star mark '*' is redundant when matching with no indent (I) \
             and no prefix (P).",
        );
    }
    let starred = star != ReplaceStar::None;
    Ok(match (has_prefix, match_star) {
        // Free indent, no prefix: the star drops the indent.
        (false, false) => (!starred, false),
        // Anchored bare body: nothing to keep.
        (false, true) => (false, false),
        // Anchored prefix: keep it unless the extra substitutes for it.
        (true, false) => (false, has_extra == starred),
        // Free indent and prefix.
        (true, true) => match star {
            ReplaceStar::DoubleStar => (false, false),
            _ => (true, has_extra == starred),
        },
    })
}
