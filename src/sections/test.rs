//! The Test section just sets up the name for the next running test.
//!
//! ```text
//! test: Oneline name for the test.
//! ```

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{check_colon, check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct Test {
    name: String,
    location: Location,
}

impl Action for Test {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.update_test_name(self.name, self.location);
        Ok(())
    }
}

pub struct TestReader;

impl Reader for TestReader {
    fn name(&self) -> &'static str {
        "TestReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "test") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        check_colon(lexer, "Test")?;
        let name = lexer.read_line_expecting("test name")?.to_owned();
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Test {
            name,
            location,
        }))))
    }
}
