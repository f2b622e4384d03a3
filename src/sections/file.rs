//! The File section creates a file in the test folder with heredoc-like
//! quoting.
//!
//! ```text
//! file (filename.ext):: EOF  # <- pick any marker with no whitespace inside.
//!     All lines here are dedented
//!     then introduced verbatim into the file  # including comments
//!     section: triggers don't break the parse, it's a hard match.
//! EOF
//! ```

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct File {
    name: String,
    content: String,
    location: Location,
}

impl Action for File {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        runner.create_file(&self.name, &self.content, &self.location)?;
        Ok(())
    }
}

pub struct FileReader;

impl Reader for FileReader {
    fn name(&self) -> &'static str {
        "FileReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "file") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        let mut names = lexer.read_tuple(&[1])?;
        let name = names.remove(0);
        if !lexer.find("::") {
            return Err(lexer.error("Missing double colon '::' to introduce File section."));
        }
        let content = lexer.read_heredoc("file", None)?;
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(File {
            name,
            content,
            location,
        }))))
    }
}
