//! The test runner: one sandboxed state per spec file, fed with parsed
//! instructions.

use std::collections::HashMap;

use crate::checker::{CapturedOutput, Checker, Expectations};
use crate::color::Palette;
use crate::context::Location;
use crate::error::{quoted, RunError};
use crate::filesystem::{self, TestFolder};
use crate::macros::{debug, eprint, eprintln};
use crate::parser::Parser;
use crate::reader::Instruction;

/// The folders a test interacts with, handed to checkers for token
/// expansion in expected outputs.
#[derive(Clone, Debug)]
pub struct Folders {
    pub test_folder: std::path::PathBuf,
    pub input_folder: std::path::PathBuf,
}

/// Checks outcome of one named test.
#[derive(Debug)]
pub struct TestReport {
    pub name: String,
    pub location: Location,
    /// One entry per failed checker.
    pub failures: Vec<(Location, String)>,
}

/// Holds a consistent state to run tests within:
/// one test folder to run in, one input folder to find source data in, one
/// shell command to evaluate, and the checkers verifying its output.
/// Instructions mutate this state or trigger runs; reports accumulate.
pub struct TestRunner<'p> {
    parser: &'p Parser,
    id: String,
    input_folder: std::path::PathBuf,
    test_folder: TestFolder,
    /// Where nested runners (`include*:`) put their own test folders.
    sandbox_root: Option<std::path::PathBuf>,
    command: Option<(String, Location)>,
    timeout: Option<std::time::Duration>,
    checkers: Vec<Box<dyn Checker>>,
    test_name: Option<(String, Location)>,
    output: Option<CapturedOutput>,
    /// Pre-edit content of files with pending temporary changes.
    backups: HashMap<std::path::PathBuf, Vec<u8>>,
    pub(crate) tests: Vec<TestReport>,
    palette: Palette,
}

impl<'p> TestRunner<'p> {
    pub fn new(
        parser: &'p Parser,
        input_folder: impl Into<std::path::PathBuf>,
        sandbox_root: Option<&std::path::Path>,
        id: &str,
        context: Option<&Location>,
    ) -> Result<Self, RunError> {
        let at = context
            .cloned()
            .unwrap_or_else(|| Location::anonymous(id));
        let input_folder: std::path::PathBuf = input_folder.into();
        let input_folder = input_folder
            .canonicalize()
            .map_err(|_| {
                RunError::new(
                    format!(
                        "Could not find input folder: {}.",
                        quoted(&input_folder.display().to_string())
                    ),
                    at.clone(),
                )
            })?;
        let test_folder = TestFolder::new(sandbox_root, id)
            .map_err(|e| RunError::new(e, at.clone()))?;
        debug!("test folder for {}: {}", id, test_folder.path().display());
        Ok(Self {
            parser,
            id: id.to_owned(),
            input_folder,
            test_folder,
            sandbox_root: sandbox_root.map(|p| p.to_owned()),
            command: None,
            timeout: None,
            checkers: Vec::new(),
            test_name: None,
            output: None,
            backups: HashMap::new(),
            tests: Vec::new(),
            palette: Palette::auto(),
        })
    }

    pub fn parser(&self) -> &'p Parser {
        self.parser
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sandbox_root(&self) -> Option<&std::path::Path> {
        self.sandbox_root.as_deref()
    }

    pub fn set_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.timeout = timeout;
    }

    pub fn folders(&self) -> Folders {
        Folders {
            test_folder: self.test_folder.path().to_owned(),
            input_folder: self.input_folder.clone(),
        }
    }

    // ------------------------------------------------------------ file paths

    /// Absolute path for a file name given in the spec: relative names live
    /// in the test folder.
    pub fn test_file_path(&self, name: &str) -> std::path::PathBuf {
        let path = std::path::Path::new(name);
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.test_folder.path().join(path)
        }
    }

    pub fn check_test_file(
        &self,
        name: &str,
        at: &Location,
    ) -> Result<std::path::PathBuf, RunError> {
        let path = self.test_file_path(name);
        if !path.exists() {
            return Err(RunError::new(
                format!(
                    "Could not find file {} in test folder {}.",
                    quoted(name),
                    self.test_folder.path().display()
                ),
                at.clone(),
            ));
        }
        Ok(path)
    }

    pub fn input_file_path(&self, name: &str) -> std::path::PathBuf {
        self.input_folder.join(name)
    }

    pub fn check_input_file(
        &self,
        name: &str,
        at: &Location,
    ) -> Result<std::path::PathBuf, RunError> {
        let path = self.input_file_path(name);
        if !path.exists() {
            return Err(RunError::new(
                format!(
                    "Could not find file {} in input folder {}.",
                    quoted(name),
                    self.input_folder.display()
                ),
                at.clone(),
            ));
        }
        Ok(path)
    }

    /// Create a file within the test folder, replacing any existing one.
    pub fn create_file(&self, name: &str, content: &str, at: &Location) -> Result<(), RunError> {
        let path = self.test_file_path(name);
        filesystem::write_text(&path, content).map_err(|e| {
            RunError::new(format!("Could not create file ({}): {}", name, e), at.clone())
        })
    }

    /// Bring a file (or tree) from the input folder into the test folder.
    pub fn copy_from_input(
        &self,
        source: &str,
        target: &str,
        at: &Location,
    ) -> Result<(), RunError> {
        let from = self.input_file_path(source);
        let to = self.test_file_path(target);
        filesystem::copy_path(&from, &to).map_err(|e| {
            RunError::new(
                format!("Could not copy file {} to {}: {}", source, target, e),
                at.clone(),
            )
        })
    }

    // -------------------------------------------------------------- command

    pub fn update_command(&mut self, command: String, location: Location) {
        self.command = Some((command, location));
    }

    pub fn update_test_name(&mut self, name: String, location: Location) {
        self.test_name = Some((name, location));
    }

    pub fn current_test_name(&self) -> &str {
        self.test_name
            .as_ref()
            .map(|(name, _)| name.as_str())
            .unwrap_or("<UNNAMED TEST>")
    }

    /// Run the command and record all output for the checkers.
    pub fn run_command(&mut self, at: &Location) -> Result<(), RunError> {
        let (command_line, defined) = self
            .command
            .as_ref()
            .ok_or_else(|| RunError::new("No command to be run.", at.clone()))?;
        debug!("$ {}", command_line);
        let mut command = crate::command::shell_command(command_line);
        command.current_dir(self.test_folder.path());
        command.stdin(std::process::Stdio::piped());
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());
        let output = command
            .spawn()
            .and_then(|child| crate::command::wait_with_input_output(child, None, self.timeout))
            .map_err(|e| {
                RunError::new(
                    format!(
                        "Could not run the testing command ({}). The command is:\n{}\nand was \
                         defined in {}.",
                        e,
                        command_line,
                        defined.position()
                    ),
                    at.clone(),
                )
            })?;
        self.output = Some(CapturedOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        });
        Ok(())
    }

    // ------------------------------------------------------------- checkers

    /// Append new checkers, first evicting existing ones with overlapping
    /// expectations so later sections override earlier ones.
    pub fn add_checkers(&mut self, checkers: Vec<Box<dyn Checker>>) {
        let mut incoming = Expectations::default();
        for checker in &checkers {
            let e = checker.expectations();
            incoming.code |= e.code;
            incoming.stdout |= e.stdout;
            incoming.stderr |= e.stderr;
        }
        self.clear_checkers(incoming);
        self.checkers.extend(checkers);
    }

    /// Drop all checkers constraining any of the masked channels.
    pub fn clear_checkers(&mut self, mask: Expectations) {
        self.checkers
            .retain(|checker| !checker.expectations().overlaps(&mask));
    }

    /// Run all checks, record a report under the current test name, and
    /// reset the name. False if some check failed.
    pub fn run_checks(&mut self, at: &Location) -> bool {
        let folders = self.folders();
        let output = self.output.clone().unwrap_or_default();
        let mut failures = Vec::new();
        for checker in &self.checkers {
            if let Some(report) = checker.check(&folders, &output) {
                failures.push((checker.location().clone(), report));
            }
        }
        let (name, location) = match self.test_name.take() {
            Some((name, location)) => (name, location),
            None => ("<UNNAMED TEST>".to_owned(), at.clone()),
        };
        let success = failures.is_empty();
        self.tests.push(TestReport {
            name,
            location,
            failures,
        });
        success
    }

    /// Progress line opening one test ("  name..").
    pub fn announce_test(&self, name: &str) {
        eprint!("  {}..", name.trim_end_matches('.'));
    }

    pub fn conclude_test(&self, success: bool) {
        if success {
            eprintln!(" {}", self.palette.info("PASS"));
        } else {
            eprintln!(" {}", self.palette.error("FAIL"));
        }
    }

    // -------------------------------------------------------------- backups

    /// Save the current content of a test file, to restore after the next
    /// test run. An existing backup is kept unless `replace` is set.
    pub fn backup_file(&mut self, name: &str, replace: bool, at: &Location) -> Result<(), RunError> {
        let path = self.test_file_path(name);
        if !path.exists() {
            return Err(RunError::new(
                format!("Cannot backup unexistent file {}.", path.display()),
                at.clone(),
            ));
        }
        if self.backups.contains_key(&path) && !replace {
            return Ok(());
        }
        let data = std::fs::read(&path).map_err(|e| {
            RunError::new(
                format!("Could not backup file {}: {}", path.display(), e),
                at.clone(),
            )
        })?;
        self.backups.insert(path, data);
        Ok(())
    }

    /// Transform a file back into its last available backup.
    pub fn restore_file(
        &mut self,
        path: &std::path::Path,
        keep_backup: bool,
        at: &Location,
    ) -> Result<(), RunError> {
        let data = if keep_backup {
            self.backups.get(path).cloned()
        } else {
            self.backups.remove(path)
        };
        let data = data.ok_or_else(|| {
            RunError::new(
                format!("No available backup to restore file {}.", path.display()),
                at.clone(),
            )
        })?;
        std::fs::write(path, data).map_err(|e| {
            RunError::new(
                format!("Could not restore file {}: {}", path.display(), e),
                at.clone(),
            )
        })
    }

    /// Restore every file with a pending backup.
    pub fn restore_all_files(&mut self, keep_backup: bool, at: &Location) -> Result<(), RunError> {
        let paths: Vec<_> = self.backups.keys().cloned().collect();
        for path in paths {
            self.restore_file(&path, keep_backup, at)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------ execution

    pub fn execute(&mut self, instruction: Instruction) -> Result<(), crate::Error> {
        match instruction {
            Instruction::Act(action) => action.execute(self),
            Instruction::Check(checker) => {
                self.add_checkers(vec![checker]);
                Ok(())
            }
        }
    }

    pub fn run_all(&mut self, instructions: Vec<Instruction>) -> Result<(), crate::Error> {
        for instruction in instructions {
            self.execute(instruction)?;
        }
        Ok(())
    }

    /// Section delineation printed by titled `include:` sections.
    pub(crate) fn announce_section(&self, title: &str, origin: &str) {
        eprintln!(
            "\n{} {}{}",
            self.palette.info(title.trim_end_matches('.')),
            self.palette.hint(format!("({})", origin)),
            self.palette.info(":"),
        );
    }

    /// Merge reports of a nested (spawned) runner into this one.
    pub(crate) fn absorb(&mut self, other: TestRunner<'_>) {
        self.tests.extend(other.tests);
    }

    /// Organize all reports into a summary on stderr.
    /// False if it contains failed tests.
    pub fn report(&self) -> bool {
        fn plural<'a>(n: usize, many: &'a str, one: &'a str) -> &'a str {
            if n > 1 {
                many
            } else {
                one
            }
        }
        let palette = self.palette;
        let failed: Vec<_> = self
            .tests
            .iter()
            .filter(|t| !t.failures.is_empty())
            .collect();
        let n_total = self.tests.len();
        let n_failed = failed.len();
        let n_ok = n_total - n_failed;
        if !failed.is_empty() {
            eprintln!(
                "\n{} {} test{} ha{} failed:\n",
                palette.error("🗙"),
                n_failed,
                plural(n_failed, "s", ""),
                plural(n_failed, "ve", "s"),
            );
            for test in &failed {
                eprintln!(
                    "{} {}",
                    palette.error(&test.name),
                    palette.hint(format!("<{}>", test.location.position()))
                );
                let mut last_line = test.location.line;
                for (location, report) in &test.failures {
                    if last_line != location.line {
                        eprintln!("{}", palette.hint(format!("<{}>", location.position())));
                    }
                    eprintln!("{}\n", report);
                    last_line = location.line;
                }
            }
            eprintln!(
                "{} test{} run: {} success{}, {} failure{}.",
                n_total,
                plural(n_total, "s", ""),
                palette.info(n_ok),
                plural(n_ok, "es", ""),
                palette.error(n_failed),
                plural(n_failed, "s", ""),
            );
            return false;
        }
        if n_ok > 0 {
            eprintln!(
                "\n{} Success: {} test{} run.",
                palette.info("✔"),
                n_total,
                plural(n_total, "s", "")
            );
        } else {
            eprintln!("\n{} Success? 0 test run.", palette.warn("??"));
        }
        true
    }
}
