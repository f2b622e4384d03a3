//! The Command section specifies the shell line to be run as a test.
//!
//! ```text
//! command: path/to/exec arg1 arg2 | postprocess
//! ```
//!
//! Soft-matched lines are stripped and joined with single spaces into one
//! command; lines starting with `#` are excluded, inline `#` signs are part
//! of the command. For verbatim multi-line shell scripts use the hard form
//! with a heredoc marker:
//!
//! ```text
//! command:: EOC
//!     read -r -d '' VAR <<'EOF'
//!     $(dont-execute-this)
//!     EOF
//! EOC
//! ```

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{
    check_colon_type, check_keyword, Action, Colon, Instruction, LinesAutomaton, Reader,
    SectionMatch,
};
use crate::runner::TestRunner;

struct Command {
    command: String,
    location: Location,
}

impl Action for Command {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.update_command(self.command, self.location);
        Ok(())
    }
}

pub struct CommandReader;

impl Reader for CommandReader {
    fn name(&self) -> &'static str {
        "CommandReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "command") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        match check_colon_type(lexer, "Command")? {
            Colon::Hard => {
                let command = lexer.read_heredoc("command", None)?;
                Ok(SectionMatch::Hard(Instruction::Act(Box::new(Command {
                    command,
                    location,
                }))))
            }
            Colon::Soft => Ok(SectionMatch::Soft(Box::new(CommandAutomaton {
                location,
                lines: Vec::new(),
            }))),
        }
    }
}

struct CommandAutomaton {
    location: Location,
    lines: Vec<String>,
}

impl LinesAutomaton for CommandAutomaton {
    fn feed(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError> {
        // Whole-line comments are excluded; inline comment signs are part
        // of the command.
        let raw = line.read_to_end();
        let stripped = raw.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            return Ok(());
        }
        self.lines.push(stripped.to_owned());
        Ok(())
    }

    fn terminate(self: Box<Self>) -> Result<Instruction, ParseError> {
        Ok(Instruction::Act(Box::new(Command {
            command: self.lines.join(" "),
            location: self.location,
        })))
    }
}
