use clap::Parser as CliParser;

/// Black-box integration testing for CLI programs, driven by `.clib` specs.
#[derive(CliParser, Debug)]
#[command(name = "clibate", version, about)]
struct Cli {
    /// Spec files (or glob patterns) to run.
    #[arg(required = true)]
    specs: Vec<String>,

    /// Folder holding source files for `copy:` sections
    /// (defaults to each spec file's parent directory).
    #[arg(long)]
    input: Option<std::path::PathBuf>,

    /// Keep test folders under this directory instead of temp space.
    #[arg(long)]
    sandbox: Option<std::path::PathBuf>,

    /// Kill test commands after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let mut paths = Vec::new();
    for pattern in &cli.specs {
        match glob::glob(pattern) {
            Ok(found) => paths.extend(found.filter_map(Result::ok)),
            Err(err) => {
                eprintln!("Invalid glob {}: {}", pattern, err);
                return std::process::ExitCode::FAILURE;
            }
        }
    }
    paths.sort();
    paths.dedup();
    if paths.is_empty() {
        eprintln!("No spec files matched.");
        return std::process::ExitCode::FAILURE;
    }

    let parser = clibate::Parser::new();
    let timeout = cli.timeout.map(std::time::Duration::from_secs);
    let mut failed = 0usize;
    for path in &paths {
        if !clibate::run_spec(
            &parser,
            path,
            cli.input.as_deref(),
            cli.sandbox.as_deref(),
            timeout,
        ) {
            failed += 1;
        }
    }
    if failed > 0 {
        eprintln!("\n{} of {} spec files failed.", failed, paths.len());
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
