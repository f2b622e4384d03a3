//! The Copy section brings files from the input folder to the test folder.
//!
//! ```text
//! copy:
//!     # Files may be renamed, use the arrow '->' to this end.
//!     input_file -> renamed_into_test_file
//!
//!     # Without the arrow, names are kept; several per line is possible.
//!     plain_file other_file
//! ```
//!
//! Filenames are parsed verbatim; quote them with string syntax when that
//! would break parsing (`"name -> with arrow" -> target`). Directories
//! copy recursively.

use crate::context::Location;
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::reader::{
    check_colon, check_keyword, Action, Instruction, LinesAutomaton, Reader, SectionMatch,
};
use crate::runner::TestRunner;

struct Copy {
    sources: Vec<String>,
    targets: Vec<String>,
    location: Location,
}

impl Action for Copy {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        for (source, target) in self.sources.iter().zip(&self.targets) {
            runner.check_input_file(source, &self.location)?;
            runner.copy_from_input(source, target, &self.location)?;
        }
        Ok(())
    }
}

pub struct CopyReader;

impl Reader for CopyReader {
    fn name(&self) -> &'static str {
        "CopyReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "copy") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        check_colon(lexer, "Copy")?;
        Ok(SectionMatch::Soft(Box::new(CopyAutomaton {
            location,
            sources: Vec::new(),
            targets: Vec::new(),
        })))
    }
}

/// Constructs the Copy actor line by line.
struct CopyAutomaton {
    location: Location,
    sources: Vec<String>,
    targets: Vec<String>,
}

impl LinesAutomaton for CopyAutomaton {
    fn feed(&mut self, line: &mut Lexer<'_>) -> Result<(), ParseError> {
        if line.find_empty_line() {
            return Ok(());
        }
        let mut probe = line.clone();
        if let Some(source) = probe.read_quoted() {
            if probe.find("->") {
                *line = probe;
                let target = line.read_string_or_raw_line_expecting("destination filename")?;
                self.sources.push(source);
                self.targets.push(target);
                return Ok(());
            }
            // Quoted names without an arrow: a kept-name list.
            let mut names = vec![line.read_quoted().expect("probe already parsed it")];
            while let Some(name) = line.read_quoted() {
                names.push(name);
            }
            line.check_empty_line()?;
            self.sources.extend(names.iter().cloned());
            self.targets.extend(names);
            return Ok(());
        }
        let saved = line.clone();
        match line.read_item_until_any(&["->"], &[])? {
            Some((Some(0), source, _)) => {
                if source.is_empty() {
                    return Err(line.error("Could not find source filename in Copy line."));
                }
                let target = line.read_string_or_raw_line_expecting("destination filename")?;
                self.sources.push(source);
                self.targets.push(target);
                Ok(())
            }
            _ => {
                // No arrow: whitespace-separated kept names.
                *line = saved;
                let names: Vec<String> = line
                    .read_line()
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect();
                self.sources.extend(names.iter().cloned());
                self.targets.extend(names);
                Ok(())
            }
        }
    }

    fn terminate(self: Box<Self>) -> Result<Instruction, ParseError> {
        Ok(Instruction::Act(Box::new(Copy {
            sources: self.sources,
            targets: self.targets,
            location: self.location,
        })))
    }
}
