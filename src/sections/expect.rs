//! The success/failure sections: the everyday way to declare, run and
//! check one test.
//!
//! ```text
//! success <(exitcode)>: <Oneline name for the test.>
//!     these lines must appear within stdout
//!     irrespective of whitespace
//!
//! failure (1): one-liner of *expected error output*, no name for the test
//!
//! success: <Oneline name.>
//!          *      # Ignore output, only expect success.
//!
//! failure (+): *  # Expect failure no matter the errors written.
//! ```
//!
//! Double-colon forms compare output verbatim through a heredoc, and with
//! the star expect exactly empty output:
//!
//! ```text
//! success:: <Oneline name.> EOO
//!     these lines must appear verbatim (dedented) on stdout
//! EOO
//!
//! failure:: This test expects no stderr but a nonzero exit code.
//!           *
//! ```
//!
//! Either way the section installs its checkers, runs the command, checks,
//! reports PASS/FAIL and restores all backed-up files.

use crate::checker::Checker;
use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{
    check_colon_type, check_keyword, Action, Colon, Instruction, LinesAutomaton, Reader,
    SectionMatch,
};
use crate::runner::TestRunner;
use crate::sections::exit_code::{CodeSpec, ExitCode};
use crate::sections::output::{
    Channel, EmptyOutput, ExactOutput, OutputSubstring, OutputSubstringAutomaton,
};

struct Expect {
    name: Option<String>,
    success: bool,
    location: Location,
    /// Expectation on the section's channel; `None` clears it instead.
    output_checker: Option<Box<dyn Checker>>,
    code: CodeSpec,
}

impl Expect {
    fn channel(&self) -> Channel {
        if self.success {
            Channel::Stdout
        } else {
            Channel::Stderr
        }
    }
}

impl Action for Expect {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        let mut checkers: Vec<Box<dyn Checker>> = Vec::new();
        let channel = self.channel();
        match self.output_checker {
            Some(checker) => checkers.push(checker),
            // No particular expectation: drop any pre-installed one.
            None => runner.clear_checkers(channel.expectations()),
        }
        match self.code {
            CodeSpec::Any => runner.clear_checkers(crate::checker::Expectations::CODE),
            spec => checkers.push(Box::new(ExitCode {
                spec,
                location: self.location.clone(),
            })),
        }
        if self.success {
            // A successful run is also a quiet one.
            checkers.push(Box::new(EmptyOutput {
                channel: Channel::Stderr,
                location: self.location.clone(),
            }));
        } else {
            runner.clear_checkers(Channel::Stdout.expectations());
        }
        runner.add_checkers(checkers);

        if let Some(name) = self.name {
            runner.update_test_name(name, self.location.clone());
        }
        let display = runner.current_test_name().to_owned();
        runner.announce_test(&display);
        runner.run_command(&self.location)?;
        let success = runner.run_checks(&self.location);
        runner.conclude_test(success);
        runner.restore_all_files(false, &self.location)?;
        Ok(())
    }
}

/// Parses both section types; they differ by defaults and target channel.
pub struct ExpectReader {
    success: bool,
}

impl ExpectReader {
    pub fn success() -> Self {
        Self { success: true }
    }

    pub fn failure() -> Self {
        Self { success: false }
    }

    fn keyword(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "failure"
        }
    }

    fn section(&self) -> &'static str {
        if self.success {
            "Success"
        } else {
            "Failure"
        }
    }

    /// The section name may be followed by a star; raw reads need a
    /// backtrack within the name to find it, or it may stand on the next
    /// line(s).
    fn read_name_and_star(&self, lexer: &mut Lexer<'_>) -> Result<(String, bool, bool), ParseError> {
        let (mut name, raw) = lexer.read_string_or_raw_line()?;
        if !raw {
            let star = lexer.find("*");
            return Ok((name, star, false));
        }
        let mut star = false;
        if name == "*" {
            star = true;
            name.clear();
        } else if let Some(stripped) = name.strip_suffix('*') {
            // Only a whitespace-separated trailing star counts.
            if stripped.ends_with(char::is_whitespace) {
                name = stripped.trim_end().to_owned();
                star = true;
            }
        }
        if !star {
            star = lexer.find("*");
        }
        Ok((name, star, true))
    }
}

impl Reader for ExpectReader {
    fn name(&self) -> &'static str {
        if self.success {
            "SuccessReader"
        } else {
            "FailureReader"
        }
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, self.keyword()) {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        // Both sections accept an exit code; they default differently.
        let code = match lexer.read_tuple_opt(&[1])? {
            Some(mut values) => CodeSpec::parse(&values.remove(0), &location)?,
            None if self.success => CodeSpec::Exact(0),
            None => CodeSpec::NonZero,
        };
        let colon = check_colon_type(lexer, self.section())?;
        let (name, star, raw) = self.read_name_and_star(lexer)?;
        let channel = if self.success {
            Channel::Stdout
        } else {
            Channel::Stderr
        };
        let named = if name.is_empty() { None } else { Some(name.clone()) };

        let checker: Option<Box<dyn Checker>> = match (colon, star) {
            (Colon::Hard, true) => {
                // Exactly no output is expected.
                lexer.check_empty_line()?;
                Some(Box::new(EmptyOutput {
                    channel,
                    location: location.clone(),
                }))
            }
            (Colon::Hard, false) => {
                // Exact output follows; with a raw name its last token was
                // actually the heredoc marker.
                let expected = if raw {
                    if name.is_empty() {
                        return Err(lexer.error(format!(
                            "No marker found to delimitate exact expected {}.",
                            channel.name()
                        )));
                    }
                    let (title, marker) = match name.rsplit_once(char::is_whitespace) {
                        Some((title, marker)) => (title.trim_end().to_owned(), marker.to_owned()),
                        None => (String::new(), name.clone()),
                    };
                    let expected = lexer.read_heredoc(channel.name(), Some(&marker))?;
                    return Ok(SectionMatch::Hard(Instruction::Act(Box::new(Expect {
                        name: if title.is_empty() { None } else { Some(title) },
                        success: self.success,
                        location: location.clone(),
                        output_checker: Some(Box::new(ExactOutput {
                            channel,
                            expected,
                            location,
                        })),
                        code,
                    }))));
                } else {
                    lexer.read_heredoc(channel.name(), None)?
                };
                Some(Box::new(ExactOutput {
                    channel,
                    expected,
                    location: location.clone(),
                }))
            }
            (Colon::Soft, true) => {
                // Nothing particular expected from the output.
                lexer.check_empty_line()?;
                None
            }
            (Colon::Soft, false) => {
                return Ok(SectionMatch::Soft(Box::new(ExpectAutomaton {
                    name,
                    success: self.success,
                    location: location.clone(),
                    code,
                    fed_lines: 0,
                    output: OutputSubstringAutomaton {
                        channel,
                        location,
                        lines: Vec::new(),
                    },
                })));
            }
        };

        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Expect {
            name: named,
            success: self.success,
            location,
            output_checker: checker,
            code,
        }))))
    }
}

/// Wraps the substring automaton; when no content line shows up, the
/// "name" was actually the expected output.
struct ExpectAutomaton {
    name: String,
    success: bool,
    location: Location,
    code: CodeSpec,
    fed_lines: usize,
    output: OutputSubstringAutomaton,
}

impl LinesAutomaton for ExpectAutomaton {
    fn feed(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError> {
        if line.find_empty_line() {
            return Ok(());
        }
        self.fed_lines += 1;
        self.output.push(line)
    }

    fn terminate(self: Box<Self>) -> Result<Instruction, ParseError> {
        let (name, checker) = if self.fed_lines > 0 {
            let name = if self.name.is_empty() {
                None
            } else {
                Some(self.name)
            };
            (name, self.output.into_checker()?)
        } else {
            let checker = OutputSubstring {
                channel: self.output.channel,
                needle: self.name,
                location: self.output.location,
            };
            (None, checker)
        };
        Ok(Instruction::Act(Box::new(Expect {
            name,
            success: self.success,
            location: self.location,
            output_checker: Some(Box::new(checker)),
            code: self.code,
        })))
    }
}
