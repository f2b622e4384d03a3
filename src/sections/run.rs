//! The RUN statement launches the command, capturing all output for later
//! checking. No expectation is verified at this point.

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct Run {
    location: Location,
}

impl Action for Run {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.run_command(&self.location)?;
        Ok(())
    }
}

pub struct RunReader;

impl Reader for RunReader {
    fn name(&self) -> &'static str {
        "RunReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "RUN") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Run {
            location,
        }))))
    }
}
