//! Parser-level behavior: dispatch, ambiguity, and the reader registry.

use clibate::{
    Instruction, Lexer, LinesAutomaton, Parser, Reader, SectionMatch, Source,
};

fn parse(input: &str) -> Result<Vec<Instruction>, clibate::ParseError> {
    Parser::new().parse_str(input, Source::new("<spec>"))
}

#[test]
fn sections_parse_in_declaration_order() {
    let instructions = parse(
        "\
test: A name.
command: run something
file (data.txt):: EOF
    content
EOF
edit (data.txt):
DIFF content
   ~ other
",
    )
    .unwrap();
    assert_eq!(instructions.len(), 4);
    let lines: Vec<_> = instructions.iter().map(|i| i.location().line).collect();
    assert_eq!(lines, vec![1, 2, 3, 6]);
}

#[test]
fn unknown_sections_are_rejected() {
    let err = parse("no such section\n").unwrap_err();
    assert_eq!(err.message, "No readers matching input.");
}

#[test]
fn blank_lines_and_comments_are_ignored() {
    let instructions = parse("\n# just a comment\n\ntest: Named.\n").unwrap();
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].location().line, 4);
}

#[test]
fn missing_colons_are_hard_errors() {
    let err = parse("test without a colon\n").unwrap_err();
    assert_eq!(err.message, "Missing colon ':' to introduce Test section.");

    let err = parse("command without one\n").unwrap_err();
    assert_eq!(
        err.message,
        "Missing colon ':' (soft-matching) or double colon '::' (hard-matching) \
         to introduce Command section."
    );
}

#[test]
fn blank_expected_output_is_rejected() {
    let err = parse("stdout:\n\n\ntest: Next.\n").unwrap_err();
    assert_eq!(err.message, "Blank expected stdout in last section.");
}

#[test]
fn indented_keywords_stay_inside_their_section() {
    // An automaton owns indented lines, even keyword-looking ones.
    let instructions = parse("stdout:\n    command: not a section\n").unwrap();
    assert_eq!(instructions.len(), 1);
}

struct TocReader(&'static str);

impl Reader for TocReader {
    fn name(&self) -> &'static str {
        self.0
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, clibate::ParseError> {
        if !lexer.rest().starts_with("toc:") {
            return Ok(SectionMatch::NoMatch);
        }
        Ok(SectionMatch::Soft(Box::new(Swallow)))
    }
}

struct Swallow;

impl LinesAutomaton for Swallow {
    fn feed(&mut self, _: &mut Lexer<'_>) -> Result<(), clibate::ParseError> {
        Ok(())
    }

    fn terminate(self: Box<Self>) -> Result<Instruction, clibate::ParseError> {
        Err(clibate::ParseError::new(
            "swallowed sections never finish",
            clibate::Location::anonymous("<toc>"),
        ))
    }
}

#[test]
fn competing_readers_are_an_ambiguity_error() {
    let mut parser = Parser::new();
    parser.add_reader(Box::new(TocReader("TocReader")));
    parser.add_reader(Box::new(TocReader("TocBisReader")));
    let err = parser
        .parse_str("toc: entry\n", Source::new("<spec>"))
        .unwrap_err();
    assert_eq!(
        err.message,
        "Ambiguity: both readers TocReader and TocBisReader match."
    );
}

#[test]
fn readers_can_be_removed_from_the_registry() {
    let mut parser = Parser::new();
    parser.remove_readers("TestReader");
    let err = parser
        .parse_str("test: Gone.\n", Source::new("<spec>"))
        .unwrap_err();
    assert_eq!(err.message, "No readers matching input.");
}
