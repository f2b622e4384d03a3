//! ## Black-box testing for command-line programs
//!
//! `clibate` runs tests described in line-oriented `.clib` spec files: each
//! spec declares base files, a command, a sequence of tests, expected
//! outputs, and — critically — *edits* patching the files between tests.
//! The harness materializes a sandbox folder, applies the edits, runs the
//! command, compares streams and exit codes, and reports pass/fail.
//!
//! ### Getting started
//!
//! Create a `tests/clib_tests.rs` with:
//! ```rust,no_run
//! #[test]
//! fn clib_tests() {
//!     clibate::TestCases::new()
//!         .case("tests/specs/*.clib")
//!         .input_dir("tests/input");
//! }
//! ```
//!
//! And a spec such as `tests/specs/demo.clib`:
//! ```text
//! command: ./run main.cfg
//!
//! file (main.cfg):: EOF
//!     mode = simple
//!     level = 3
//! EOF
//!
//! success: The base configuration works.
//!     processed 3 levels
//!
//! edit (main.cfg):
//!     DIFF level = 3
//!        ~ level = 7
//!
//! success: More levels are processed on demand.
//!     processed 7 levels
//! ```
//!
//! Sections are dispatched through a registry of readers and user-defined
//! ones can be added with [`TestCases::reader`]; the edit mini-language
//! (`DIFF`, `INSERT`, `REMOVE`, `PREFIX`, `UNPREF`, `REPLACE`) is
//! documented in the [`edit`] module and usable standalone through
//! [`edit::parse_edits`] and [`edit::apply_edits`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub(crate) mod macros;

mod cases;
mod checker;
mod color;
mod command;
mod context;
pub mod edit;
mod error;
mod filesystem;
mod lexer;
mod parser;
mod reader;
mod runner;
pub mod sections;

pub use cases::{run_spec, TestCases};
pub use checker::{CapturedOutput, Checker, Expectations};
pub use context::{Location, Source};
pub use error::{Error, ParseError, RunError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use reader::{Action, Instruction, LinesAutomaton, Reader, SectionMatch};
pub use runner::{Folders, TestReport, TestRunner};
