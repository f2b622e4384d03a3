//! The stdout/stderr sections set up expectations on either output channel.
//!
//! ```text
//! stdout:             # (or 'stderr:')
//!     Output lines to be matched
//!     irrespective of whitespace.
//!
//! stdout:: EOO
//!     (dedented) Exact output to be matched.
//! EOO
//!
//! stdout: *           # Clear expectations regarding output.
//! stdout:: *          # Expect exactly no output.
//! ```
//!
//! Exact comparisons expand `<TEST_FOLDER>`/`<INPUT_FOLDER>` tokens in the
//! expected text and strip terminal escape codes from the observed stream.

use std::sync::OnceLock;

use crate::checker::{CapturedOutput, Checker, Expectations};
use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{
    check_colon_type, check_keyword, Action, Colon, Instruction, LinesAutomaton, Reader,
    SectionMatch,
};
use crate::runner::{Folders, TestRunner};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }

    pub(crate) fn expectations(self) -> Expectations {
        match self {
            Self::Stdout => Expectations::STDOUT,
            Self::Stderr => Expectations::STDERR,
        }
    }

    fn pick(self, output: &CapturedOutput) -> String {
        let bytes = match self {
            Self::Stdout => &output.stdout,
            Self::Stderr => &output.stderr,
        };
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Resolve `<TEST_FOLDER>`/`<INPUT_FOLDER>` tokens in expected output.
fn expand(folders: &Folders, expected: &str) -> String {
    expected
        .replace("<TEST_FOLDER>", &folders.test_folder.display().to_string())
        .replace("<INPUT_FOLDER>", &folders.input_folder.display().to_string())
}

/// Remove terminal escape codes from observed output.
fn unescape(output: &str) -> String {
    static ESCAPES: OnceLock<regex::Regex> = OnceLock::new();
    let escapes = ESCAPES.get_or_init(|| {
        regex::Regex::new(r"\x1B\[([0-9]{1,3}(;[0-9]{1,2})?)?[mGK]")
            .expect("static pattern compiles")
    });
    escapes.replace_all(output, "").into_owned()
}

/// This degenerated checker expects no output at all.
pub(crate) struct EmptyOutput {
    pub(crate) channel: Channel,
    pub(crate) location: Location,
}

impl Checker for EmptyOutput {
    fn location(&self) -> &Location {
        &self.location
    }

    fn expectations(&self) -> Expectations {
        self.channel.expectations()
    }

    fn check(&self, _: &Folders, output: &CapturedOutput) -> Option<String> {
        let observed = self.channel.pick(output);
        if observed.is_empty() {
            return None;
        }
        Some(format!(
            "Expected no output on {}, but got:\n{}",
            self.channel.name(),
            observed
        ))
    }
}

/// Expects to find exactly the given string as output.
pub(crate) struct ExactOutput {
    pub(crate) channel: Channel,
    pub(crate) expected: String,
    pub(crate) location: Location,
}

impl Checker for ExactOutput {
    fn location(&self) -> &Location {
        &self.location
    }

    fn expectations(&self) -> Expectations {
        self.channel.expectations()
    }

    fn check(&self, folders: &Folders, output: &CapturedOutput) -> Option<String> {
        let observed = self.channel.pick(output);
        let expected = expand(folders, &self.expected);
        if unescape(&observed) == expected {
            return None;
        }
        let actual = if observed.is_empty() {
            "found nothing instead.".to_owned()
        } else {
            format!("found instead:\n{}", observed)
        };
        Some(format!(
            "Expected to find on {}:\n{}\n{}",
            self.channel.name(),
            expected,
            actual
        ))
    }
}

/// Expects the message within the output, irrespective of whitespace.
pub(crate) struct OutputSubstring {
    pub(crate) channel: Channel,
    pub(crate) needle: String,
    pub(crate) location: Location,
}

impl Checker for OutputSubstring {
    fn location(&self) -> &Location {
        &self.location
    }

    fn expectations(&self) -> Expectations {
        self.channel.expectations()
    }

    fn check(&self, folders: &Folders, output: &CapturedOutput) -> Option<String> {
        let observed = self.channel.pick(output);
        let needle = expand(folders, &self.needle);
        let haystack = unescape(&observed)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let needle = needle.split_whitespace().collect::<Vec<_>>().join(" ");
        if haystack.contains(&needle) {
            return None;
        }
        let actual = if observed.is_empty() {
            "found nothing instead.".to_owned()
        } else {
            format!("found instead:\n{}", observed)
        };
        Some(format!(
            "Expected to find on {}:\n{}\n{}",
            self.channel.name(),
            needle,
            actual
        ))
    }
}

/// Remove any expectation regarding one channel.
struct OutputClearer {
    channel: Channel,
    location: Location,
}

impl Action for OutputClearer {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.clear_checkers(self.channel.expectations());
        Ok(())
    }
}

/// Parses either `stdout`/`stderr` section type.
pub struct OutputReader {
    channel: Channel,
}

impl OutputReader {
    pub fn stdout() -> Self {
        Self {
            channel: Channel::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            channel: Channel::Stderr,
        }
    }
}

impl Reader for OutputReader {
    fn name(&self) -> &'static str {
        match self.channel {
            Channel::Stdout => "StdoutReader",
            Channel::Stderr => "StderrReader",
        }
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let channel = self.channel;
        let location = match check_keyword(lexer, channel.name()) {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        match check_colon_type(lexer, channel.name())? {
            Colon::Hard => {
                if lexer.find("*") {
                    lexer.check_empty_line()?;
                    return Ok(SectionMatch::Hard(Instruction::Check(Box::new(
                        EmptyOutput { channel, location },
                    ))));
                }
                let expected = lexer.read_heredoc(channel.name(), None)?;
                Ok(SectionMatch::Hard(Instruction::Check(Box::new(
                    ExactOutput {
                        channel,
                        expected,
                        location,
                    },
                ))))
            }
            Colon::Soft => {
                if lexer.find("*") {
                    lexer.check_empty_line()?;
                    return Ok(SectionMatch::Hard(Instruction::Act(Box::new(
                        OutputClearer { channel, location },
                    ))));
                }
                Ok(SectionMatch::Soft(Box::new(OutputSubstringAutomaton {
                    channel,
                    location,
                    lines: Vec::new(),
                })))
            }
        }
    }
}

pub(crate) struct OutputSubstringAutomaton {
    pub(crate) channel: Channel,
    pub(crate) location: Location,
    pub(crate) lines: Vec<String>,
}

impl OutputSubstringAutomaton {
    pub(crate) fn push(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError> {
        let (text, _) = line.read_string_or_raw_line()?;
        self.lines.push(text);
        Ok(())
    }

    pub(crate) fn into_checker(self) -> Result<OutputSubstring, ParseError> {
        let needle = self.lines.join(" ");
        if needle.trim().is_empty() {
            return Err(ParseError::new(
                format!("Blank expected {} in last section.", self.channel.name()),
                self.location,
            ));
        }
        Ok(OutputSubstring {
            channel: self.channel,
            needle,
            location: self.location,
        })
    }
}

impl LinesAutomaton for OutputSubstringAutomaton {
    fn feed(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError> {
        self.push(line)
    }

    fn terminate(self: Box<Self>) -> Result<Instruction, ParseError> {
        Ok(Instruction::Check(Box::new(self.into_checker()?)))
    }
}
