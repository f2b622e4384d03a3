//! Instruction parsers: one line-fed automaton covering the six edit
//! families, so that sections can hand lines over one at a time and give
//! unrecognized ones back to the surrounding spec parser.

use std::sync::OnceLock;

use crate::context::Location;
use crate::edit::line::{
    match_indent, replace_regions, Extra, LineMatcher, NewLine, PrefixPattern, ReplaceStar,
};
use crate::edit::notation::{decode_prefix, Template};
use crate::edit::{EditOp, LineInstruction, ReplaceInstruction};
use crate::error::ParseError;
use crate::lexer::Lexer;

/// Parse a standalone edit script into executable operations.
///
/// This is the narrow entry point for embedders driving the engine without
/// the surrounding section machinery: every line must belong to an edit
/// instruction.
pub fn parse_edits(source: &str, location: Location) -> Result<Vec<EditOp>, ParseError> {
    let mut lexer = Lexer::at(source, location);
    let mut automaton = EditAutomaton::new();
    while !lexer.is_consumed() {
        let mut line = lexer.split_line();
        match automaton.feed(&mut line)? {
            Feed::Consumed => {}
            Feed::NotMine => {
                line.strip_ws();
                return Err(line.error("No edit instruction matching input."));
            }
        }
    }
    automaton.finish()
}

/// Outcome of feeding one line to the automaton.
pub(crate) enum Feed {
    Consumed,
    /// The line does not belong to the edit section; it was left untouched
    /// for the caller to hand back to the surrounding parser.
    NotMine,
}

const KEYWORDS: [&str; 6] = ["DIFF", "INSERT", "REMOVE", "PREFIX", "UNPREF", "REPLACE"];

/// The paired-line scratch space shared by DIFF and INSERT.
struct PendingPair {
    regex_mode: bool,
    slash_location: Option<Location>,
    all: bool,
    match_star: bool,
    has_prefix: bool,
    matcher: Option<LineMatcher>,
    news: Vec<PendingNew>,
}

impl PendingPair {
    fn new(regex_mode: bool, slash_location: Option<Location>) -> Self {
        Self {
            regex_mode,
            slash_location,
            all: false,
            match_star: false,
            has_prefix: false,
            matcher: None,
            news: Vec::new(),
        }
    }
}

/// One collected replace line, interpreted only once its instruction is
/// complete (INSERT ABOVE reads its match line last).
struct PendingNew {
    star: ReplaceStar,
    star_location: Location,
    extra: Option<String>,
    body: String,
    location: Location,
}

/// The multi-line REPLACE scratch space.
struct PendingReplace {
    all: bool,
    pattern_location: Location,
    pattern_chunks: Vec<String>,
    template_location: Option<Location>,
    template_chunks: Option<Vec<String>>,
}

enum State {
    Idle,
    Diff(PendingPair),
    Insert { pair: PendingPair, below: bool },
    Replace(PendingReplace),
}

pub(crate) struct EditAutomaton {
    ops: Vec<EditOp>,
    state: State,
    /// Start of the line currently (or last) fed, for end-of-section errors.
    line_context: Option<Location>,
}

impl EditAutomaton {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: State::Idle,
            line_context: None,
        }
    }

    /// Feed one line of the section. `NotMine` restores the line.
    pub(crate) fn feed(&mut self, line: &mut Lexer<'_>) -> Result<Feed, ParseError> {
        self.line_context = Some(line.context());
        if line.find_empty_line() {
            return Ok(Feed::Consumed);
        }
        self.step(line)
    }

    fn step(&mut self, line: &mut Lexer<'_>) -> Result<Feed, ParseError> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => self.start_instruction(line),
            State::Diff(mut pair) => {
                if !line.find("~") {
                    return Err(line.error("Missing introducing tilde '~' on second diff line."));
                }
                self.read_paired_replace_line(line, &mut pair)?;
                let op = finish_pair(pair, EditOp::Diff)?;
                self.ops.push(op);
                Ok(Feed::Consumed)
            }
            State::Insert { mut pair, below } => {
                if line.find("+") {
                    self.read_paired_replace_line(line, &mut pair)?;
                    self.state = State::Insert { pair, below };
                    return Ok(Feed::Consumed);
                }
                if below {
                    if pair.news.is_empty() {
                        return Err(line.error(
                            "Found no lines to INSERT BELOW (marked with a '+' symbol).",
                        ));
                    }
                    let op = finish_pair(pair, EditOp::InsertBelow)?;
                    self.ops.push(op);
                    // The line may start the next instruction.
                    self.step(line)
                } else {
                    self.read_paired_match_line(line, &mut pair)?;
                    let op = finish_pair(pair, EditOp::InsertAbove)?;
                    self.ops.push(op);
                    Ok(Feed::Consumed)
                }
            }
            State::Replace(mut pending) => {
                if line.find("/") {
                    let (text, _) = line.read_string_or_raw_line()?;
                    match &mut pending.template_chunks {
                        Some(chunks) => chunks.push(text),
                        None => pending.pattern_chunks.push(text),
                    }
                    self.state = State::Replace(pending);
                    return Ok(Feed::Consumed);
                }
                if line.find("BY") {
                    if let (Some(location), Some(_)) =
                        (&pending.template_location, &pending.template_chunks)
                    {
                        return Err(line.error(format!(
                            "Cannot specify more than one BY line. First BY line already \
                             found at {}. To continuate BY lines, prefix them with a '/' \
                             mark instead.",
                            location.position()
                        )));
                    }
                    let mut probe = line.clone();
                    probe.strip_ws();
                    pending.template_location = Some(probe.context());
                    let (text, _) = line.read_string_or_raw_line()?;
                    pending.template_chunks = Some(vec![text]);
                    self.state = State::Replace(pending);
                    return Ok(Feed::Consumed);
                }
                // Not a REPLACE line anymore: wrap up, then give the line a
                // chance to start the next instruction.
                let op = self.finish_replace(pending)?;
                self.ops.push(op);
                self.step(line)
            }
        }
    }

    /// All lines have been fed; produce the collected operations.
    pub(crate) fn finish(mut self) -> Result<Vec<EditOp>, ParseError> {
        let at = self
            .line_context
            .clone()
            .unwrap_or_else(|| Location::anonymous("<edit section>"));
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => Ok(self.ops),
            State::Diff(_) => Err(ParseError::new("Missing second DIFF line.", at)),
            State::Insert { pair, below: true } => {
                if pair.news.is_empty() {
                    return Err(ParseError::new(
                        "Found no lines to INSERT BELOW (marked with a '+' symbol).",
                        at,
                    ));
                }
                let op = finish_pair(pair, EditOp::InsertBelow)?;
                self.ops.push(op);
                Ok(self.ops)
            }
            State::Insert { below: false, .. } => Err(ParseError::new(
                "Missing match line (without '+' symbol) after inserted lines.",
                at,
            )),
            State::Replace(pending) => {
                let op = self.finish_replace(pending)?;
                self.ops.push(op);
                Ok(self.ops)
            }
        }
    }

    // ------------------------------------------------------- new instruction

    fn start_instruction(&mut self, line: &mut Lexer<'_>) -> Result<Feed, ParseError> {
        let saved = line.clone();
        let keyword = match KEYWORDS.iter().find(|kw| line.find(kw)) {
            Some(kw) => *kw,
            None => {
                *line = saved;
                return Ok(Feed::NotMine);
            }
        };
        match keyword {
            "PREFIX" | "UNPREF" | "REMOVE" => self.single_line_instruction(line, keyword),
            "DIFF" => {
                let (regex_mode, slash_location) = read_slash(line);
                let mut pair = PendingPair::new(regex_mode, slash_location);
                self.read_paired_match_line(line, &mut pair)?;
                self.state = State::Diff(pair);
                Ok(Feed::Consumed)
            }
            "INSERT" => self.start_insert(line),
            "REPLACE" => self.start_replace(line),
            _ => unreachable!(),
        }
    }

    fn start_insert(&mut self, line: &mut Lexer<'_>) -> Result<Feed, ParseError> {
        let below_keyword = if line.find("BELOW") {
            Some(true)
        } else if line.find("ABOVE") {
            Some(false)
        } else {
            None
        };
        let (regex_mode, slash_location) = read_slash(line);
        let mut pair = PendingPair::new(regex_mode, slash_location);
        if line.find("+") {
            if below_keyword == Some(true) {
                return Err(line.error(
                    "Unexpected '+' symbol: should appear before the lines to insert, \
                     so not the top line in case of INSERT BELOW.",
                ));
            }
            self.read_paired_replace_line(line, &mut pair)?;
            self.state = State::Insert { pair, below: false };
            return Ok(Feed::Consumed);
        }
        if below_keyword == Some(false) {
            return Err(
                line.error("Missing '+' symbol to introduce lines to INSERT ABOVE the match line.")
            );
        }
        if line.find("ALL") {
            pair.all = true;
        }
        self.read_paired_match_line(line, &mut pair)?;
        self.state = State::Insert { pair, below: true };
        Ok(Feed::Consumed)
    }

    // --------------------------------------------- PREFIX / UNPREF / REMOVE

    fn single_line_instruction(
        &mut self,
        line: &mut Lexer<'_>,
        keyword: &str,
    ) -> Result<Feed, ParseError> {
        let (regex_mode, slash_location) = read_slash(line);
        let match_star = if regex_mode { false } else { line.find("*") };
        let all = line.find("ALL");
        line.strip_ws();
        let match_context = line.context();

        let arity: &[usize] = if keyword == "PREFIX" { &[0, 1, 2] } else { &[0, 1] };
        let tuple = if line.peek("(") {
            let values = line.read_tuple(arity)?;
            if regex_mode && values.is_empty() {
                return Err(missing_regex_tuple(
                    &match_context,
                    slash_location.as_ref(),
                    "(pattern)",
                ));
            }
            Some(values)
        } else {
            if regex_mode {
                return Err(missing_regex_tuple(
                    &match_context,
                    slash_location.as_ref(),
                    "(pattern)",
                ));
            }
            None
        };
        // An empty literal tuple `()` denotes one empty prefix: anchored
        // matching with no indent and no prefix.
        let values = tuple.map(|values| {
            if regex_mode {
                values
            } else if values.is_empty() {
                vec![String::new()]
            } else {
                values.iter().map(|v| decode_prefix(v)).collect()
            }
        });
        let (body, exact_tail, _) = read_line_body(line)?;

        let op = match keyword {
            "PREFIX" => {
                let values = values.ok_or_else(|| {
                    ParseError::new(
                        "Missing parenthesized prefix pattern(s) for PREFIX instruction.",
                        match_context.clone(),
                    )
                })?;
                if regex_mode {
                    let (pattern, template_text) = match values.as_slice() {
                        [pattern, template] => (pattern.clone(), template.clone()),
                        _ => {
                            return Err(missing_regex_tuple(
                                &match_context,
                                slash_location.as_ref(),
                                "(pattern)",
                            ))
                        }
                    };
                    let regex = compile_regex(&pattern, &match_context)?;
                    let template =
                        checked_template(&template_text, &regex, &match_context)?;
                    let matcher = LineMatcher {
                        prefix: Some(PrefixPattern::Regex { regex, notation: pattern }),
                        loose_indent: false,
                        body,
                        exact_tail,
                        location: match_context.clone(),
                    };
                    let new = NewLine {
                        keep_indent: false,
                        keep_prefix: false,
                        extra: Extra::Template(template),
                        body: None,
                    };
                    EditOp::Prefix(LineInstruction { matcher, news: vec![new], all })
                } else {
                    let (prefix, extra) = match values.as_slice() {
                        [extra] => (None, extra.clone()),
                        [prefix, extra] => (Some(prefix.clone()), extra.clone()),
                        _ => unreachable!("tuple arity checked above"),
                    };
                    let loose = match_indent(prefix.is_some(), match_star);
                    let matcher = LineMatcher {
                        prefix: prefix.map(PrefixPattern::Literal),
                        loose_indent: loose,
                        body,
                        exact_tail,
                        location: match_context.clone(),
                    };
                    let new = NewLine {
                        keep_indent: loose,
                        keep_prefix: true,
                        extra: Extra::Literal(extra),
                        body: None,
                    };
                    EditOp::Prefix(LineInstruction { matcher, news: vec![new], all })
                }
            }
            "UNPREF" => {
                let values = values.ok_or_else(|| {
                    ParseError::new(
                        "Missing parenthesized prefix pattern to remove for UNPREF instruction.",
                        match_context.clone(),
                    )
                })?;
                let pattern = values[0].clone();
                if regex_mode {
                    let regex = compile_regex(&pattern, &match_context)?;
                    let matcher = LineMatcher {
                        prefix: Some(PrefixPattern::Regex { regex, notation: pattern }),
                        loose_indent: false,
                        body,
                        exact_tail,
                        location: match_context.clone(),
                    };
                    let new = NewLine {
                        keep_indent: false,
                        keep_prefix: false,
                        extra: Extra::KeptGroup,
                        body: None,
                    };
                    EditOp::Unpref(LineInstruction { matcher, news: vec![new], all })
                } else {
                    let loose = !match_star;
                    let matcher = LineMatcher {
                        prefix: Some(PrefixPattern::Literal(pattern)),
                        loose_indent: loose,
                        body,
                        exact_tail,
                        location: match_context,
                    };
                    let new = NewLine {
                        keep_indent: loose,
                        keep_prefix: false,
                        extra: Extra::Literal(String::new()),
                        body: None,
                    };
                    EditOp::Unpref(LineInstruction { matcher, news: vec![new], all })
                }
            }
            "REMOVE" => {
                let prefix = match (regex_mode, values) {
                    (true, Some(values)) => {
                        let regex = compile_regex(&values[0], &match_context)?;
                        Some(PrefixPattern::Regex { regex, notation: values[0].clone() })
                    }
                    (false, Some(values)) => Some(PrefixPattern::Literal(values[0].clone())),
                    (_, None) => None,
                };
                let loose = !regex_mode && match_indent(prefix.is_some(), match_star);
                let matcher = LineMatcher {
                    prefix,
                    loose_indent: loose,
                    body,
                    exact_tail,
                    location: match_context,
                };
                EditOp::Remove(LineInstruction { matcher, news: Vec::new(), all })
            }
            _ => unreachable!(),
        };
        self.ops.push(op);
        Ok(Feed::Consumed)
    }

    // ------------------------------------------------------- paired reading

    fn read_paired_match_line(
        &mut self,
        line: &mut Lexer<'_>,
        pair: &mut PendingPair,
    ) -> Result<(), ParseError> {
        if line.find("ALL") {
            pair.all = true;
        }
        pair.match_star = line.find("*");
        line.strip_ws();
        let match_context = line.context();
        let prefix = if line.peek("(") {
            let mut values = line.read_tuple(&[1])?;
            Some(values.remove(0))
        } else {
            if pair.regex_mode {
                return Err(missing_regex_tuple(
                    &match_context,
                    pair.slash_location.as_ref(),
                    "(pattern)",
                ));
            }
            None
        };
        pair.has_prefix = prefix.is_some();
        let prefix = match prefix {
            Some(notation) if pair.regex_mode => {
                let regex = compile_regex(&notation, &match_context)?;
                Some(PrefixPattern::Regex { regex, notation })
            }
            Some(notation) => Some(PrefixPattern::Literal(decode_prefix(&notation))),
            None => None,
        };
        let (body, exact_tail, _) = read_line_body(line)?;
        pair.matcher = Some(LineMatcher {
            prefix,
            loose_indent: !pair.regex_mode && match_indent(pair.has_prefix, pair.match_star),
            body,
            exact_tail,
            location: match_context,
        });
        Ok(())
    }

    fn read_paired_replace_line(
        &mut self,
        line: &mut Lexer<'_>,
        pair: &mut PendingPair,
    ) -> Result<(), ParseError> {
        let mut probe = line.clone();
        probe.strip_ws();
        let star_location = probe.context();
        let star = if line.find("**") {
            ReplaceStar::DoubleStar
        } else if line.find("*") {
            ReplaceStar::Star
        } else {
            ReplaceStar::None
        };
        line.strip_ws();
        let location = line.context();
        let extra = if line.peek("(") {
            let values = line.read_tuple(&[0, 1])?;
            Some(values.into_iter().next().unwrap_or_default())
        } else {
            if pair.regex_mode {
                return Err(missing_regex_tuple(
                    &location,
                    pair.slash_location.as_ref(),
                    "(replacement)",
                ));
            }
            None
        };
        let (body, _, starred) = read_line_body(line)?;
        if starred {
            return Err(line.error("Unexpected star mark '*' found after replace line body."));
        }
        pair.news.push(PendingNew {
            star,
            star_location,
            extra,
            body,
            location,
        });
        Ok(())
    }

    // ------------------------------------------------------------- REPLACE

    fn start_replace(&mut self, line: &mut Lexer<'_>) -> Result<Feed, ParseError> {
        let all = line.find("ALL");
        line.strip_ws();
        let pattern_location = line.context();

        if let Some(pattern) = line.read_quoted() {
            if line.find("BY") {
                line.strip_ws();
                let template_location = line.context();
                let template = line.read_string_or_raw_line_expecting("replace pattern")?;
                let op =
                    build_replace(&pattern, &template, all, pattern_location, template_location)?;
                self.ops.push(op);
                return Ok(Feed::Consumed);
            }
            line.check_empty_line()?;
            self.state = State::Replace(PendingReplace {
                all,
                pattern_location,
                pattern_chunks: vec![pattern],
                template_location: None,
                template_chunks: None,
            });
            return Ok(Feed::Consumed);
        }

        if let Some(before) = read_until_by(line) {
            let pattern = before.trim().to_owned();
            if pattern.is_empty() {
                return Err(ParseError::new(
                    "Missing match pattern before 'BY' keyword.",
                    pattern_location,
                ));
            }
            line.strip_ws();
            let template_location = line.context();
            let template = match line.read_quoted() {
                Some(template) => {
                    line.check_empty_line()?;
                    template
                }
                None => {
                    if read_until_by(line).is_some() {
                        return Err(ParseError::new(
                            "Ambiguous raw REPLACE line with more than 1 occurrence of \
                             the 'BY' keyword. Consider quoting match and/or replace \
                             pattern(s).",
                            pattern_location,
                        ));
                    }
                    line.read_line_expecting("replace pattern")?.to_owned()
                }
            };
            let op = build_replace(&pattern, &template, all, pattern_location, template_location)?;
            self.ops.push(op);
            return Ok(Feed::Consumed);
        }

        let pattern = line.read_line_expecting("match pattern")?.to_owned();
        self.state = State::Replace(PendingReplace {
            all,
            pattern_location,
            pattern_chunks: vec![pattern],
            template_location: None,
            template_chunks: None,
        });
        Ok(Feed::Consumed)
    }

    fn finish_replace(&self, pending: PendingReplace) -> Result<EditOp, ParseError> {
        let template_chunks = match pending.template_chunks {
            Some(chunks) => chunks,
            None => {
                let at = self
                    .line_context
                    .clone()
                    .unwrap_or(pending.pattern_location);
                return Err(ParseError::new(
                    "Missing 'BY' keyword or '/' line continuation symbol for REPLACE \
                     instruction.",
                    at,
                ));
            }
        };
        build_replace(
            &pending.pattern_chunks.concat(),
            &template_chunks.concat(),
            pending.all,
            pending.pattern_location,
            pending
                .template_location
                .expect("template location recorded along its first chunk"),
        )
    }
}

/// Optional `/` mark right after the instruction keyword.
fn read_slash(line: &mut Lexer<'_>) -> (bool, Option<Location>) {
    let mut probe = line.clone();
    probe.strip_ws();
    let location = probe.context();
    if line.find("/") {
        (true, Some(location))
    } else {
        (false, None)
    }
}

/// Line body: raw read until comment/end, or one quoted string which may
/// carry a post-body `*` demanding an exactly empty tail.
fn read_line_body(line: &mut Lexer<'_>) -> Result<(String, bool, bool), ParseError> {
    if let Some(body) = line.read_quoted() {
        let starred = line.find("*");
        let explicit_tail = body != body.trim_end();
        line.check_empty_line()?;
        return Ok((body, explicit_tail || starred, starred));
    }
    let (body, _) = line.read_string_or_raw_line()?;
    Ok((body, false, false))
}

/// Raw read until a standalone `BY` word (robust to e.g. `BYE`).
fn read_until_by<'s>(line: &mut Lexer<'s>) -> Option<&'s str> {
    static BY: OnceLock<regex::Regex> = OnceLock::new();
    let by = BY.get_or_init(|| regex::Regex::new(r"\bBY\b").expect("static pattern compiles"));
    let found = by.find(line.rest())?;
    let before = line.consume_bytes(found.start());
    line.consume_bytes(found.end() - found.start());
    Some(before)
}

fn missing_regex_tuple(
    at: &Location,
    slash_location: Option<&Location>,
    expected: &str,
) -> ParseError {
    let slash = slash_location
        .map(|l| l.position())
        .unwrap_or_else(|| "<unknown>".to_owned());
    let side = if expected == "(pattern)" { "" } else { " pattern" };
    ParseError::new(
        format!(
            "Requested regex prefix with '/' mark ({}) but no parenthesized '{}'{} was provided.",
            slash, expected, side
        ),
        at.clone(),
    )
}

fn compile_regex(pattern: &str, at: &Location) -> Result<regex::Regex, ParseError> {
    regex::Regex::new(pattern).map_err(|e| {
        ParseError::new(
            format!("Could not compile regex pattern /{}/: {}", pattern, e),
            at.clone(),
        )
    })
}

fn checked_template(
    text: &str,
    pattern: &regex::Regex,
    at: &Location,
) -> Result<Template, ParseError> {
    let template = Template::parse(text);
    template.check_against(pattern).map_err(|group| {
        ParseError::new(
            format!(
                "Could not use replace pattern /{}/: invalid group reference {}",
                text, group
            ),
            at.clone(),
        )
    })?;
    Ok(template)
}

fn build_replace(
    pattern_text: &str,
    template_text: &str,
    all: bool,
    pattern_location: Location,
    template_location: Location,
) -> Result<EditOp, ParseError> {
    let pattern = compile_regex(pattern_text, &pattern_location)?;
    let template = checked_template(template_text, &pattern, &template_location)?;
    Ok(EditOp::Replace(ReplaceInstruction {
        pattern,
        pattern_text: pattern_text.to_owned(),
        template,
        all,
        pattern_location,
    }))
}

/// Interpret the collected replace lines of a DIFF/INSERT now that the
/// match side is fully known.
fn finish_pair(
    mut pair: PendingPair,
    family: fn(LineInstruction) -> EditOp,
) -> Result<EditOp, ParseError> {
    let matcher = pair
        .matcher
        .take()
        .expect("paired instructions read their match line before finishing");
    let mut news = Vec::with_capacity(pair.news.len());
    for pending in pair.news {
        if pair.regex_mode {
            let notation = pending
                .extra
                .expect("regex-mode replace lines always carry a template");
            let regex = match &matcher.prefix {
                Some(PrefixPattern::Regex { regex, .. }) => regex,
                _ => unreachable!("regex-mode matchers carry a regex prefix"),
            };
            let template = checked_template(&notation, regex, &pending.location)?;
            news.push(NewLine {
                keep_indent: false,
                keep_prefix: false,
                extra: Extra::Template(template),
                body: Some(pending.body),
            });
        } else {
            let extra = decode_prefix(pending.extra.as_deref().unwrap_or(""));
            let (keep_indent, keep_prefix) = replace_regions(
                pair.has_prefix,
                pair.match_star,
                !extra.is_empty(),
                pending.star,
            )
            .map_err(|message| ParseError::new(message, pending.star_location.clone()))?;
            news.push(NewLine {
                keep_indent,
                keep_prefix,
                extra: Extra::Literal(extra),
                body: Some(pending.body),
            });
        }
    }
    Ok(family(LineInstruction {
        matcher,
        news,
        all: pair.all,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Location;

    fn parse(source: &str) -> Result<Vec<EditOp>, ParseError> {
        parse_edits(source, Location::anonymous("<test>"))
    }

    fn parse_err(source: &str) -> String {
        parse(source).unwrap_err().message
    }

    #[test]
    fn diff_requires_tilde() {
        assert_eq!(
            parse_err("DIFF a = b\nx = y"),
            "Missing introducing tilde '~' on second diff line."
        );
        assert_eq!(parse_err("DIFF a = b"), "Missing second DIFF line.");
        assert!(parse("DIFF a = b\n~ a = c").is_ok());
    }

    #[test]
    fn insert_shapes() {
        assert!(parse("INSERT match\n+ one\n+ two").is_ok());
        assert!(parse("INSERT ABOVE + one\n+ two\nmatch").is_ok());
        assert_eq!(
            parse_err("INSERT BELOW + x"),
            "Unexpected '+' symbol: should appear before the lines to insert, \
             so not the top line in case of INSERT BELOW."
        );
        assert_eq!(
            parse_err("INSERT ABOVE match"),
            "Missing '+' symbol to introduce lines to INSERT ABOVE the match line."
        );
        assert_eq!(
            parse_err("INSERT match"),
            "Found no lines to INSERT BELOW (marked with a '+' symbol)."
        );
        assert_eq!(
            parse_err("INSERT ABOVE + one"),
            "Missing match line (without '+' symbol) after inserted lines."
        );
    }

    #[test]
    fn star_coherence_is_checked_at_parse_time() {
        assert!(parse_err("DIFF a\n~ ** b").starts_with("Double replace star mark '**'"));
        assert!(parse_err("DIFF * a\n~ * b").starts_with("Replace star mark '*' is redundant"));
        assert!(parse("DIFF * (p) a\n~ ** b").is_ok());
    }

    #[test]
    fn prefix_requires_parenthesized_patterns() {
        assert_eq!(
            parse_err("PREFIX body"),
            "Missing parenthesized prefix pattern(s) for PREFIX instruction."
        );
        assert_eq!(
            parse_err("UNPREF body"),
            "Missing parenthesized prefix pattern to remove for UNPREF instruction."
        );
        assert!(parse("PREFIX (#) body").is_ok());
        assert!(parse("PREFIX (8, #) END {").is_ok());
        assert!(parse("UNPREF* (#1) a = b + c").is_ok());
        assert!(parse("REMOVE () a").is_ok());
    }

    #[test]
    fn regex_mode_requires_tuples() {
        let message = parse_err("DIFF/ a\n~ (x) b");
        assert!(
            message.contains("but no parenthesized '(pattern)' was provided."),
            "{message}"
        );
        let message = parse_err("DIFF/ (p) a\n~ b");
        assert!(
            message.contains("but no parenthesized '(replacement)' pattern was provided."),
            "{message}"
        );
    }

    #[test]
    fn bad_patterns_are_compile_errors() {
        assert!(parse_err("DIFF/ ((oops) a\n~ (x) b")
            .starts_with("Could not compile regex pattern /(oops/:"));
        assert!(parse_err(r"REPLACE a BY \3")
            .starts_with(r"Could not use replace pattern /\3/: invalid group reference 3"));
    }

    #[test]
    fn replace_single_line_forms() {
        assert!(parse("REPLACE thing BY song").is_ok());
        assert!(parse("REPLACE ALL 'a b' BY 'c d'").is_ok());
        assert_eq!(
            parse_err("REPLACE thing BY song BY more"),
            "Ambiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. \
             Consider quoting match and/or replace pattern(s)."
        );
        assert_eq!(
            parse_err("REPLACE BY song"),
            "Missing match pattern before 'BY' keyword."
        );
        assert_eq!(
            parse_err("REPLACE thing BY  # no replacement"),
            "Missing expected data: 'replace pattern'."
        );
    }

    #[test]
    fn replace_multi_line_forms() {
        assert!(parse("REPLACE \\bth[a-z]+\n/ ' ([a-z]+)'\nBY DA \\1\\1").is_ok());
        assert!(parse("REPLACE pat\nBY rep\n/ more").is_ok());
        assert_eq!(
            parse_err("REPLACE pat\n/ tern"),
            "Missing 'BY' keyword or '/' line continuation symbol for REPLACE instruction."
        );
        let message = parse_err("REPLACE pat\nBY one\nBY two");
        assert!(message.starts_with("Cannot specify more than one BY line."), "{message}");
    }

    #[test]
    fn replace_star_after_body_is_rejected() {
        assert_eq!(
            parse_err("DIFF a\n~ 'b' *"),
            "Unexpected star mark '*' found after replace line body."
        );
        assert!(parse("DIFF 'a' *\n~ 'b'").is_ok());
    }

    #[test]
    fn instruction_locations_are_tracked() {
        let err = parse("DIFF a = b\n~ ** c").unwrap_err();
        assert_eq!((err.location.line, err.location.col), (2, 3));
    }
}
