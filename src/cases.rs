//! Entry point for running spec files from `cargo test`.

use rayon::prelude::*;

use crate::color::Palette;
use crate::error::Error;
use crate::macros::{debug, eprintln};
use crate::parser::Parser;
use crate::reader::Reader;
use crate::runner::TestRunner;

/// Enumerates `.clib` spec files and runs each in its own sandbox.
///
/// ```rust,no_run
/// #[test]
/// fn clib_tests() {
///     clibate::TestCases::new()
///         .case("tests/specs/*.clib")
///         .input_dir("tests/input");
/// }
/// ```
///
/// Runs on drop unless [`run`][Self::run] was called explicitly, and
/// panics if any test failed.
#[derive(Default)]
pub struct TestCases {
    inner: std::cell::RefCell<Inner>,
}

#[derive(Default)]
struct Inner {
    globs: Vec<String>,
    input: Option<std::path::PathBuf>,
    sandbox: Option<std::path::PathBuf>,
    timeout: Option<std::time::Duration>,
    readers: Vec<Box<dyn Reader>>,
    has_run: bool,
}

impl TestCases {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add spec files by glob pattern (or literal path).
    pub fn case(&self, glob: impl AsRef<str>) -> &Self {
        self.inner.borrow_mut().globs.push(glob.as_ref().to_owned());
        self
    }

    /// Folder holding the source files `copy:` sections pull from.
    /// Defaults to each spec file's parent directory.
    pub fn input_dir(&self, path: impl Into<std::path::PathBuf>) -> &Self {
        self.inner.borrow_mut().input = Some(path.into());
        self
    }

    /// Keep test folders under this directory instead of temp space.
    pub fn sandbox_dir(&self, path: impl Into<std::path::PathBuf>) -> &Self {
        self.inner.borrow_mut().sandbox = Some(path.into());
        self
    }

    /// Kill test commands that outlive this duration.
    pub fn timeout(&self, timeout: std::time::Duration) -> &Self {
        self.inner.borrow_mut().timeout = Some(timeout);
        self
    }

    /// Teach the spec dialect a user-defined section.
    pub fn reader(&self, reader: Box<dyn Reader>) -> &Self {
        self.inner.borrow_mut().readers.push(reader);
        self
    }

    pub fn run(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.has_run = true;

        let mut parser = Parser::new();
        for reader in inner.readers.drain(..) {
            parser.add_reader(reader);
        }

        let palette = Palette::auto();
        let mut paths = Vec::new();
        for pattern in &inner.globs {
            match ::glob::glob(pattern) {
                Ok(found) => {
                    for path in found {
                        match path {
                            Ok(path) => paths.push(path),
                            Err(err) => eprintln!("{}", palette.error(err)),
                        }
                    }
                }
                Err(err) => {
                    eprintln!("{}: {}", palette.error("Invalid glob"), err);
                }
            }
        }
        paths.sort();
        paths.dedup();

        if paths.is_empty() {
            eprintln!("{}", palette.warn("There are no clibate tests enabled yet"));
            return;
        }

        let input = inner.input.clone();
        let sandbox = inner.sandbox.clone();
        let timeout = inner.timeout;
        drop(inner);

        let failures: Vec<_> = paths
            .par_iter()
            .filter(|path| !run_spec(&parser, path, input.as_deref(), sandbox.as_deref(), timeout))
            .collect();

        if !failures.is_empty() {
            panic!("{} of {} spec files failed", failures.len(), paths.len());
        }
    }
}

impl std::panic::RefUnwindSafe for TestCases {}

#[doc(hidden)]
impl Drop for TestCases {
    fn drop(&mut self) {
        if !self.inner.borrow().has_run && !std::thread::panicking() {
            self.run();
        }
    }
}

/// Parse and run one spec file; true when all of its tests passed.
/// Failures and errors are reported on stderr.
pub fn run_spec(
    parser: &Parser,
    path: &std::path::Path,
    input: Option<&std::path::Path>,
    sandbox: Option<&std::path::Path>,
    timeout: Option<std::time::Duration>,
) -> bool {
    let palette = Palette::auto();
    let name = path.display().to_string();
    eprintln!("\n{} {}", palette.hint("Running"), name);
    match run_spec_inner(parser, path, input, sandbox, timeout) {
        Ok(passed) => passed,
        Err(err) => {
            eprintln!("{}", palette.error(err));
            false
        }
    }
}

fn run_spec_inner(
    parser: &Parser,
    path: &std::path::Path,
    input: Option<&std::path::Path>,
    sandbox: Option<&std::path::Path>,
    timeout: Option<std::time::Duration>,
) -> Result<bool, Error> {
    let name = path.display().to_string();
    let instructions = parser.parse_file(&name, path, None)?;
    debug!("{}: {} instructions", name, instructions.len());

    let input = input
        .map(|p| p.to_owned())
        .or_else(|| {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_owned())
        })
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spec".to_owned());

    let mut runner = TestRunner::new(parser, input, sandbox, &id, None)?;
    runner.set_timeout(timeout);
    runner.run_all(instructions)?;
    Ok(runner.report())
}
