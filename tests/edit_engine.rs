//! End-to-end checks of the edit engine through its public API.

use clibate::edit::{apply_edits, parse_edits};
use clibate::{Location, Source};

fn edit(instructions: &str, input: &str) -> String {
    let ops = parse_edits(instructions, Location::anonymous("<spec>"))
        .unwrap_or_else(|e| panic!("{}", e));
    let lines = input.split('\n').map(str::to_owned).collect();
    let lines = apply_edits(lines, &ops).unwrap_or_else(|e| panic!("{}", e));
    lines.join("\n")
}

#[test]
fn diff_rewrites_first_match_with_loose_indent() {
    let input = "      chain = chain \"-\" $1\n  chain = chain \"-\" $1";
    let instructions = "DIFF 'chain = chain \"-\" $1'\n   ~ 'chain = chain \"+\" $1'";
    let expected = "      chain = chain \"+\" $1\n  chain = chain \"-\" $1";
    assert_eq!(edit(instructions, input), expected);
}

#[test]
fn prefix_with_exact_indent_notation() {
    assert_eq!(
        edit("PREFIX (8, #) END {", "        END {"),
        "        # END {"
    );
}

#[test]
fn starred_unpref_requires_anchored_prefix() {
    assert_eq!(edit("UNPREF* (#1) a = b + c", "# a = b + c"), "a = b + c");

    let ops = parse_edits("UNPREF* (#1) a = b + c", Location::anonymous("<spec>")).unwrap();
    let lines = vec!["\t# a = b + c".to_owned()];
    let err = apply_edits(lines, &ops).unwrap_err();
    assert_eq!(
        err.message,
        "Could not match line 'a = b + c' with prefix '# '."
    );
}

#[test]
fn insert_above_the_top_of_file() {
    assert_eq!(edit("INSERT ABOVE + X\n :a", ":a\n :b"), "X\n:a\n :b");
}

#[test]
fn replace_all_with_group_and_continuation() {
    let instructions = "REPLACE ALL \\bth[a-z]+\n        /   ' ([a-z]+)'\n        BY  DA \\1\\1";
    let input = "Find interesting things\nLike the thing in the doc";
    let expected = "Find interesting things\nLike DA thingthing in DA docdoc";
    assert_eq!(edit(instructions, input), expected);
}

#[test]
fn ambiguous_replace_diagnostic_shape() {
    let source = Source::new("edit_REPLACE");
    // The instruction itself starts at column 5.
    let err = parse_edits(
        "REPLACE thing BY song BY more",
        Location::new(source, 23, 5),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Clibate parsing error:\n\
         Ambiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. \
         Consider quoting match and/or replace pattern(s). <edit_REPLACE:23:13>"
    );
}

#[test]
fn quoted_bodies_round_trip_their_bytes() {
    // Tails and tabs inside quoted bodies survive the engine untouched.
    assert_eq!(
        edit("DIFF marker\n~ 'a\\tb  '", "marker"),
        "a\tb  "
    );
}

#[test]
fn insert_all_growth_stays_bounded() {
    // The inserted line matches its own instruction: one new line per
    // original match, never more.
    let out = edit("INSERT ALL a\n+ a", "a\na");
    assert_eq!(out, "a\na\na\na");
    // Subsequent instructions do see the inserted lines.
    let out = edit("INSERT a\n+ b\nDIFF ALL b\n~ c", "a\nb");
    assert_eq!(out, "a\nc\nc");
}

#[test]
fn star_coherence_is_a_parse_error() {
    let err = parse_edits("DIFF a\n~ ** b", Location::anonymous("<spec>")).unwrap_err();
    assert_eq!(
        err.message,
        "Double replace star mark '**' is meaningless without matching both \
         variable indent (I) and a fixed prefix (P)."
    );
    let err = parse_edits("DIFF * a\n~ * b", Location::anonymous("<spec>")).unwrap_err();
    assert_eq!(
        err.message,
        "Replace star mark '*' is redundant when matching with no indent (I) \
         and no prefix (P)."
    );
}

#[test]
fn regex_mode_requires_both_parenthesized_sides() {
    let err = parse_edits("DIFF/ body\n~ (x) other", Location::anonymous("<spec>")).unwrap_err();
    assert!(err
        .message
        .contains("but no parenthesized '(pattern)' was provided."));
    let err = parse_edits("DIFF/ (p) body\n~ other", Location::anonymous("<spec>")).unwrap_err();
    assert!(err
        .message
        .contains("but no parenthesized '(replacement)' pattern was provided."));
}

#[test]
fn prefix_notation_consumes_whitespace_ahead_of_indent() {
    // The decoded prefix swallows the line's leading whitespace itself:
    // anchored matching, no free indent in front.
    assert_eq!(edit("REMOVE (2s#1) x", "  # x\ny"), "y");
    let ops = parse_edits("REMOVE (2s#1) x", Location::anonymous("<spec>")).unwrap();
    let err = apply_edits(vec![" ".to_owned() + "  # x"], &ops).unwrap_err();
    assert_eq!(err.message, "Could not match line 'x' with prefix '  # '.");
}

#[test]
fn apply_errors_render_the_run_class() {
    let ops = parse_edits("DIFF lost\n~ found", Location::anonymous("<spec>")).unwrap();
    let err = apply_edits(vec!["nothing here".to_owned()], &ops).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Error during clibate tests run:\nCould not match line 'lost'."));
}
