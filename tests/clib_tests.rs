//! Full-stack runs of real spec files in throwaway sandboxes.
#![cfg(unix)]

use std::path::Path;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn run(dir: &Path, spec: &std::path::Path) -> bool {
    let parser = clibate::Parser::new();
    clibate::run_spec(&parser, spec, Some(dir), None, None)
}

#[test]
fn temporary_edits_are_reverted_between_tests() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "edits.clib",
        "\
file (greeting.txt):: EOF
    hello world
EOF
command: cat greeting.txt

success: The base file is printed.
    hello world

edit (greeting.txt):
DIFF hello world
   ~ hello there

success: The edit is visible.
    hello there

success: The edit was reverted after the previous test.
    hello world
",
    );
    assert!(run(dir.path(), &spec));
}

#[test]
fn starred_edits_persist_across_tests() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "persistent.clib",
        "\
file (config.txt):: EOF
    v = 1
EOF
command: cat config.txt

edit* (config.txt):
DIFF v = 1
   ~ v = 2

success: The starred edit applies.
    v = 2

success: And it sticks.
    v = 2
",
    );
    assert!(run(dir.path(), &spec));
}

#[test]
fn copy_run_check_and_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "input/data.txt", "forty-two\n");
    let spec = write(
        dir.path(),
        "codes.clib",
        "\
copy:
    data.txt -> copied.txt

command: cat copied.txt
success: Copied files are readable.
    forty-two

command: exit 3
stdout: *
EXITCODE 3
RUN
CHECK: The declared exit code is observed.
",
    );
    let parser = clibate::Parser::new();
    assert!(clibate::run_spec(
        &parser,
        &spec,
        Some(&dir.path().join("input")),
        None,
        None,
    ));
}

#[test]
fn failure_sections_expect_stderr_and_nonzero_codes() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "failing.clib",
        "\
command: echo oops >&2; exit 1

failure: Errors land on stderr.
    oops
",
    );
    assert!(run(dir.path(), &spec));
}

#[test]
fn unmet_expectations_fail_the_spec() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "unmet.clib",
        "\
command: echo hello

success: This expectation cannot hold.
    goodbye
",
    );
    assert!(!run(dir.path(), &spec));
}

#[test]
fn exact_output_through_heredoc_markers() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "exact.clib",
        "\
command: printf 'a\\nb\\n'

success:: Exact lines. EOO
    a
    b
EOO
",
    );
    assert!(run(dir.path(), &spec));
}

#[test]
fn included_specs_feed_the_same_runner() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "child.clib",
        "\
success: The included check runs with the parent command.
    nested
",
    );
    let spec = write(
        dir.path(),
        "parent.clib",
        "\
command: echo nested

include (child): Nested checks.
",
    );
    assert!(run(dir.path(), &spec));
}

#[test]
fn missing_includes_are_run_errors() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(
        dir.path(),
        "broken.clib",
        "include (no_such_spec):\n",
    );
    assert!(!run(dir.path(), &spec));
}
