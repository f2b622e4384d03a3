//! The CHECK statement runs all current checkers against the last captured
//! output and records a test report.
//!
//! ```text
//! RUN
//! CHECK: Name of the test being run.
//! ```

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{check_colon, check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct Check {
    name: String,
    location: Location,
}

impl Action for Check {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.update_test_name(self.name, self.location.clone());
        runner.run_checks(&self.location);
        Ok(())
    }
}

pub struct CheckReader;

impl Reader for CheckReader {
    fn name(&self) -> &'static str {
        "CheckReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "CHECK") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        check_colon(lexer, "Check")?;
        let name = lexer.read_line_expecting("test name")?.to_owned();
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Check {
            name,
            location,
        }))))
    }
}
