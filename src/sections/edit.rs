//! The edit section introduces small changes to files in the test folder,
//! driving the [edit engine](crate::edit).
//!
//! ```text
//! edit (filename.ext):  # Example edit section.
//!
//! DIFF a = b + c
//!    ~ a = b - c
//! ```
//!
//! Edits are reverted after each test run, except when the section is
//! starred (`edit* (…)`) which makes them persistent.

use crate::context::Location;
use crate::edit::{apply_edits, EditAutomaton, EditOp, Feed};
use crate::error::{Error, ParseError, RunError};
use crate::filesystem;
use crate::lexer::Lexer;
use crate::reader::{check_colon, check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct Edit {
    filename: String,
    persistent: bool,
    ops: Vec<EditOp>,
    location: Location,
}

impl Action for Edit {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        let path = runner.check_test_file(&self.filename, &self.location)?;
        if !self.persistent {
            runner.backup_file(&self.filename, false, &self.location)?;
        }
        let content = filesystem::read_text(&path)
            .map_err(|e| RunError::new(e, self.location.clone()))?;
        let lines = content.split('\n').map(str::to_owned).collect();
        let lines = apply_edits(lines, &self.ops)?;
        filesystem::write_text(&path, &lines.join("\n"))
            .map_err(|e| RunError::new(e, self.location.clone()))?;
        Ok(())
    }
}

pub struct EditReader;

impl Reader for EditReader {
    fn name(&self) -> &'static str {
        "EditReader"
    }

    /// Although the overall result is a hard match, input is processed
    /// line by line so that the first non-instruction line is handed back
    /// to the main parser for the other readers.
    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "edit") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        let persistent = lexer.find("*");
        let mut names = lexer.read_tuple(&[1])?;
        let filename = names.remove(0);
        check_colon(lexer, "Edit")?;

        let mut automaton = EditAutomaton::new();
        while !lexer.is_consumed() {
            let saved = lexer.clone();
            let mut line = lexer.split_line();
            match automaton.feed(&mut line)? {
                Feed::Consumed => {}
                Feed::NotMine => {
                    *lexer = saved;
                    break;
                }
            }
        }
        let ops = automaton.finish()?;
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Edit {
            filename,
            persistent,
            ops,
            location,
        }))))
    }
}
