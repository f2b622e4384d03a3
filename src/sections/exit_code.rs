//! The EXITCODE statement sets up the expected return code for the next
//! executed command(s).
//!
//! ```text
//! EXITCODE 0   # exact code
//! EXITCODE +   # any nonzero code
//! EXITCODE *   # clear any exit code expectation
//! ```

use crate::checker::{CapturedOutput, Checker, Expectations};
use crate::context::Location;
use crate::error::{quoted, Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::{Folders, TestRunner};

/// What the exit code is expected to look like.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CodeSpec {
    Exact(i32),
    /// `+`: the command must not succeed.
    NonZero,
    /// `*`: no expectation at all.
    Any,
}

impl CodeSpec {
    pub(crate) fn parse(word: &str, at: &Location) -> Result<Self, ParseError> {
        match word {
            "+" => Ok(Self::NonZero),
            "*" => Ok(Self::Any),
            _ => word.parse().map(Self::Exact).map_err(|_| {
                ParseError::new(
                    format!("Expected exit code, found {}.", quoted(word)),
                    at.clone(),
                )
            }),
        }
    }
}

pub(crate) struct ExitCode {
    pub(crate) spec: CodeSpec,
    pub(crate) location: Location,
}

impl Checker for ExitCode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn expectations(&self) -> Expectations {
        Expectations::CODE
    }

    fn check(&self, _: &Folders, output: &CapturedOutput) -> Option<String> {
        let shown = |code: Option<i32>| match code {
            Some(code) => code.to_string(),
            None => "no code (killed?)".to_owned(),
        };
        match self.spec {
            CodeSpec::Any => None,
            CodeSpec::Exact(expected) => {
                if output.code == Some(expected) {
                    None
                } else {
                    Some(format!(
                        "Expected return code {}, got {} instead.",
                        expected,
                        shown(output.code)
                    ))
                }
            }
            CodeSpec::NonZero => {
                if output.code == Some(0) {
                    Some("Expected nonzero return code, got 0 instead.".to_owned())
                } else {
                    None
                }
            }
        }
    }
}

/// `EXITCODE *` installs no checker: it erases existing ones instead.
struct ClearCode {
    location: Location,
}

impl Action for ClearCode {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.clear_checkers(Expectations::CODE);
        Ok(())
    }
}

pub struct ExitCodeReader;

impl Reader for ExitCodeReader {
    fn name(&self) -> &'static str {
        "ExitCodeReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "EXITCODE") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        let word = lexer.read_split();
        if word.is_empty() {
            return Err(lexer.error("Unexpected end of file while reading expected exit code."));
        }
        let spec = CodeSpec::parse(word, &location)?;
        Ok(match spec {
            CodeSpec::Any => {
                SectionMatch::Hard(Instruction::Act(Box::new(ClearCode { location })))
            }
            spec => SectionMatch::Hard(Instruction::Check(Box::new(ExitCode {
                spec,
                location,
            }))),
        })
    }
}
