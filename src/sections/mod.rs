//! The default section set understood by [`Parser::new`](crate::Parser::new).

mod check;
mod command;
mod copy;
mod edit;
mod exit_code;
mod expect;
mod file;
mod include;
mod output;
mod run;
mod test;

pub use check::CheckReader;
pub use command::CommandReader;
pub use copy::CopyReader;
pub use edit::EditReader;
pub use exit_code::ExitCodeReader;
pub use expect::ExpectReader;
pub use file::FileReader;
pub use include::IncludeReader;
pub use output::OutputReader;
pub use run::RunReader;
pub use test::TestReader;

use crate::reader::Reader;

/// Construct a fresh sequence of the pre-implemented readers.
pub fn default_readers() -> Vec<Box<dyn Reader>> {
    vec![
        Box::new(CheckReader),
        Box::new(CommandReader),
        Box::new(CopyReader),
        Box::new(EditReader),
        Box::new(ExitCodeReader),
        Box::new(ExpectReader::success()),
        Box::new(ExpectReader::failure()),
        Box::new(FileReader),
        Box::new(IncludeReader),
        Box::new(OutputReader::stdout()),
        Box::new(OutputReader::stderr()),
        Box::new(RunReader),
        Box::new(TestReader),
    ]
}
