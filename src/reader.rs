//! The section-reader extension point.
//!
//! Readers are responsible for matching one particular kind of section,
//! given a lexer handed to them by the main [`Parser`](crate::Parser). A
//! reader must not consume more than it needs: its view of the lexer only
//! becomes the parser's if it matches.
//!
//! "Hard" matches know their own extent and return a finished
//! [`Instruction`]. "Soft" matches only recognize that their section
//! started; they return a [`LinesAutomaton`] which the parser feeds line by
//! line until another reader matches and takes over. A reader may behave
//! either way depending on the input (`command:` vs `command::`).

use crate::checker::Checker;
use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::runner::TestRunner;

/// One parsed section, ready for the runner.
pub enum Instruction {
    /// Modifies the test environment (create a file, run the command, …).
    Act(Box<dyn Action>),
    /// Sets an expectation about the command's output.
    Check(Box<dyn Checker>),
}

impl Instruction {
    pub fn location(&self) -> &Location {
        match self {
            Self::Act(action) => action.location(),
            Self::Check(checker) => checker.location(),
        }
    }
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Act(_) => f.debug_tuple("Act").field(&self.location()).finish(),
            Self::Check(_) => f.debug_tuple("Check").field(&self.location()).finish(),
        }
    }
}

/// Actions apply modifications to the runner state or the test folder.
///
/// Execution consumes the action: each instruction runs exactly once, in
/// the order the spec declares. `include:` sections parse at execution
/// time, so the error type covers both classes.
pub trait Action: Send + Sync {
    fn location(&self) -> &Location;
    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error>;
}

/// Outcome of offering a section start to one reader.
pub enum SectionMatch {
    /// Not this reader's section; the parser will try the others.
    NoMatch,
    Hard(Instruction),
    Soft(Box<dyn LinesAutomaton>),
}

pub trait Reader: Send + Sync {
    /// Type-like name shown in ambiguity reports (e.g. `CommandReader`).
    fn name(&self) -> &'static str;
    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError>;
}

/// Construction state of a soft-matched section, fed one line at a time.
pub trait LinesAutomaton: Send {
    fn feed(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError>;
    /// All lines have been fed; finish constructing the instruction.
    fn terminate(self: Box<Self>) -> Result<Instruction, ParseError>;
}

/// Match the section keyword, anchored at the current position: indented
/// keywords belong to the enclosing section's content, not to a new
/// section. Returns the keyword's location.
pub(crate) fn check_keyword(lexer: &mut Lexer<'_>, keyword: &str) -> Option<Location> {
    let context = lexer.context();
    if lexer.match_token(keyword) {
        Some(context)
    } else {
        None
    }
}

/// The single/double colon introducing a section, deciding soft vs hard
/// parsing for sections supporting both.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Colon {
    Soft,
    Hard,
}

pub(crate) fn check_colon(lexer: &mut Lexer<'_>, section: &str) -> Result<(), ParseError> {
    if lexer.find(":") {
        Ok(())
    } else {
        Err(lexer.error(format!("Missing colon ':' to introduce {} section.", section)))
    }
}

pub(crate) fn check_colon_type(lexer: &mut Lexer<'_>, section: &str) -> Result<Colon, ParseError> {
    if lexer.find("::") {
        Ok(Colon::Hard)
    } else if lexer.find(":") {
        Ok(Colon::Soft)
    } else {
        Err(lexer.error(format!(
            "Missing colon ':' (soft-matching) or double colon '::' (hard-matching) \
             to introduce {} section.",
            section
        )))
    }
}
