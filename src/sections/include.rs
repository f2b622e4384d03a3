//! The Include section sources another specification file.
//!
//! ```text
//! include (more_tests.clib): Optional section title.
//!
//! # The star spawns a nested runner with its own state (and optionally
//! # another input folder), merging its reports back afterwards.
//! include* (sub/specs, sub/input):
//! ```
//!
//! Paths resolve relatively to the including file; a missing `.clib`
//! extension is tried automatically. Diagnostics of included files carry
//! the whole include chain.

use crate::context::Location;
use crate::error::{quoted, Error, ParseError, RunError};
use crate::lexer::Lexer;
use crate::reader::{check_colon, check_keyword, Action, Instruction, Reader, SectionMatch};
use crate::runner::TestRunner;

struct Include {
    spawn: bool,
    spec_file: String,
    input_folder: Option<String>,
    title: String,
    location: Location,
}

impl Include {
    /// Resolve the included path, trying a `.clib` suffix when that helps.
    fn resolve(&self, parent: &std::path::Path) -> Result<std::path::PathBuf, RunError> {
        let direct = parent.join(&self.spec_file);
        let mut candidates = vec![direct.clone()];
        if direct.extension() != Some(std::ffi::OsStr::new("clib")) {
            let mut named = direct.as_os_str().to_owned();
            named.push(".clib");
            candidates.push(std::path::PathBuf::from(named));
        }
        let found = candidates
            .into_iter()
            .find(|c| c.exists())
            .ok_or_else(|| {
                RunError::new(
                    format!("Missing file to include: {}.", self.spec_file),
                    self.location.clone(),
                )
            })?;
        if found.is_dir() {
            return Err(RunError::new(
                format!("The file to include is a directory: {}.", self.spec_file),
                self.location.clone(),
            ));
        }
        Ok(found.canonicalize().unwrap_or(found))
    }

    fn check_not_circular(&self, resolved: &std::path::Path) -> Result<(), RunError> {
        let own = self.location.source.path.as_deref();
        let chain_hit = self
            .location
            .source
            .includers()
            .any(|site| site.source.path.as_deref() == Some(resolved));
        if own == Some(resolved) || chain_hit {
            return Err(RunError::new(
                format!(
                    "Circular inclusion detected:\n{} includes {} again.",
                    quoted(&self.location.source.name),
                    quoted(&self.spec_file)
                ),
                self.location.clone(),
            ));
        }
        Ok(())
    }
}

impl Action for Include {
    fn location(&self) -> &Location {
        &self.location
    }

    fn execute(self: Box<Self>, runner: &mut TestRunner<'_>) -> Result<(), Error> {
        let parent = self
            .location
            .source
            .path
            .as_deref()
            .and_then(|p| p.parent())
            .map(|p| p.to_owned())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let resolved = self.resolve(&parent)?;
        self.check_not_circular(&resolved)?;

        let input_folder = match &self.input_folder {
            Some(folder) => {
                let path = parent.join(folder);
                if !path.exists() {
                    return Err(RunError::new(
                        format!(
                            "Missing input folder {} to include from {}.",
                            folder,
                            parent.display()
                        ),
                        self.location.clone(),
                    )
                    .into());
                }
                if !path.is_dir() {
                    return Err(RunError::new(
                        format!(
                            "Input folder {} to include from {} is not a directory.",
                            folder,
                            parent.display()
                        ),
                        self.location.clone(),
                    )
                    .into());
                }
                Some(path)
            }
            None => None,
        };

        if !self.title.is_empty() {
            runner.announce_section(&self.title, &self.spec_file);
        }

        let instructions =
            runner
                .parser()
                .parse_file(&self.spec_file, &resolved, Some(self.location.clone()))?;

        if self.spawn {
            // A whole new nested set, reporting back into this one.
            let input = input_folder.unwrap_or_else(|| runner.folders().input_folder);
            let sub_id = format!("{}+", runner.id());
            let mut nested = TestRunner::new(
                runner.parser(),
                input,
                runner.sandbox_root(),
                &sub_id,
                Some(&self.location),
            )?;
            nested.run_all(instructions)?;
            runner.absorb(nested);
            return Ok(());
        }
        runner.run_all(instructions)
    }
}

pub struct IncludeReader;

impl Reader for IncludeReader {
    fn name(&self) -> &'static str {
        "IncludeReader"
    }

    fn section_match(&self, lexer: &mut Lexer<'_>) -> Result<SectionMatch, ParseError> {
        let location = match check_keyword(lexer, "include") {
            Some(location) => location,
            None => return Ok(SectionMatch::NoMatch),
        };
        let spawn = lexer.find("*");
        let mut params = lexer.read_tuple(&[1, 2])?;
        let spec_file = params.remove(0);
        let input_folder = params.pop();
        check_colon(lexer, "Include")?;
        let title = lexer.read_line().to_owned();
        Ok(SectionMatch::Hard(Instruction::Act(Box::new(Include {
            spawn,
            spec_file,
            input_folder,
            title,
            location,
        }))))
    }
}
