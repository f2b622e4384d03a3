//! Execute an ordered list of edit operations against an in-memory buffer.

use crate::edit::{EditOp, LineInstruction, ReplaceInstruction};
use crate::error::RunError;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Placement {
    Inplace,
    Below,
    Above,
    Remove,
}

/// Apply `ops` in order to the buffer, each operation seeing the effects of
/// the previous ones. The buffer is returned unchanged on error.
pub fn apply_edits(lines: Vec<String>, ops: &[EditOp]) -> Result<Vec<String>, RunError> {
    let mut buffer = lines;
    for op in ops {
        match op {
            EditOp::Diff(op) | EditOp::Prefix(op) | EditOp::Unpref(op) => {
                apply_line_op(&mut buffer, op, Placement::Inplace)?
            }
            EditOp::InsertBelow(op) => apply_line_op(&mut buffer, op, Placement::Below)?,
            EditOp::InsertAbove(op) => apply_line_op(&mut buffer, op, Placement::Above)?,
            EditOp::Remove(op) => apply_line_op(&mut buffer, op, Placement::Remove)?,
            EditOp::Replace(op) => buffer = apply_replace(buffer, op)?,
        }
    }
    Ok(buffer)
}

fn apply_line_op(
    lines: &mut Vec<String>,
    op: &LineInstruction,
    placement: Placement,
) -> Result<(), RunError> {
    // Freeze the match set before touching the buffer, so inserted lines
    // can never feed back into their own instruction.
    let mut rewrites: Vec<(usize, Vec<String>)> = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if let Some(matched) = op.matcher.match_line(line) {
            let built = op.news.iter().map(|new| new.build(&matched)).collect();
            rewrites.push((index, built));
            if !op.all {
                break;
            }
        }
    }

    if rewrites.is_empty() {
        let inserting = placement == Placement::Below || placement == Placement::Above;
        if op.all && inserting {
            return Ok(());
        }
        return Err(RunError::new(
            op.matcher.no_match_message(),
            op.matcher.location.clone(),
        ));
    }

    let mut offset = 0isize;
    for (index, mut built) in rewrites {
        let at = (index as isize + offset) as usize;
        match placement {
            Placement::Inplace => {
                lines[at] = built.pop().expect("inplace instructions build one line");
            }
            Placement::Remove => {
                lines.remove(at);
                offset -= 1;
            }
            Placement::Below | Placement::Above => {
                let start = if placement == Placement::Below { at + 1 } else { at };
                offset += built.len() as isize;
                for (k, line) in built.into_iter().enumerate() {
                    lines.insert(start + k, line);
                }
            }
        }
    }
    Ok(())
}

fn apply_replace(lines: Vec<String>, op: &ReplaceInstruction) -> Result<Vec<String>, RunError> {
    let content = lines.join("\n");
    if !op.pattern.is_match(&content) {
        return Err(RunError::new(
            format!("Could not match file with pattern /{}/.", op.pattern_text),
            op.pattern_location.clone(),
        ));
    }
    let limit = if op.all { 0 } else { 1 };
    let replaced = op
        .pattern
        .replacen(&content, limit, |caps: &regex::Captures<'_>| {
            op.template.expand(caps)
        });
    Ok(replaced.split('\n').map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Location;
    use crate::edit::parse_edits;

    fn run(instructions: &str, input: &str) -> Result<Vec<String>, RunError> {
        let ops = parse_edits(instructions, Location::anonymous("<test>"))
            .unwrap_or_else(|e| panic!("unexpected parse error: {}", e));
        let lines = input.split('\n').map(str::to_owned).collect();
        apply_edits(lines, &ops)
    }

    fn check(instructions: &str, input: &str, expected: &str) {
        let lines = run(instructions, input).unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(lines.join("\n"), expected);
    }

    #[test]
    fn diff_first_match_only() {
        check(
            "DIFF 'chain = chain \"-\" $1'\n~ 'chain = chain \"+\" $1'",
            "      chain = chain \"-\" $1\n  chain = chain \"-\" $1",
            "      chain = chain \"+\" $1\n  chain = chain \"-\" $1",
        );
    }

    #[test]
    fn diff_all_matches() {
        check(
            "DIFF ALL a = b\n~ a = c",
            "  a = b\na = b\nx",
            "  a = c\na = c\nx",
        );
    }

    #[test]
    fn diff_zero_matches_is_an_error() {
        let err = run("DIFF missing\n~ there", "a\nb").unwrap_err();
        assert_eq!(err.message, "Could not match line 'missing'.");

        let err = run("DIFF (#) missing\n~ there", "a\nb").unwrap_err();
        assert_eq!(err.message, "Could not match line 'missing' with prefix '# '.");
    }

    #[test]
    fn prefix_with_exact_indent() {
        check("PREFIX (8, #) END {", "        END {", "        # END {");
    }

    #[test]
    fn unpref_star_requires_no_indent() {
        check("UNPREF* (#1) a = b + c", "# a = b + c", "a = b + c");
        let err = run("UNPREF* (#1) a = b + c", "\t# a = b + c").unwrap_err();
        assert_eq!(err.message, "Could not match line 'a = b + c' with prefix '# '.");
    }

    #[test]
    fn unpref_floats_over_indent_by_default() {
        check("UNPREF (#) a = b", "  # a = b", "  a = b");
    }

    #[test]
    fn insert_above_top_of_file() {
        check("INSERT ABOVE + X\n :a", ":a\n :b", "X\n:a\n :b");
    }

    #[test]
    fn insert_below_keeps_indent() {
        check(
            "INSERT a = b\n+ c = d",
            "  a = b\nrest",
            "  a = b\n  c = d\nrest",
        );
    }

    #[test]
    fn insert_all_zero_matches_is_a_noop() {
        check("INSERT ALL missing\n+ new", "a\nb", "a\nb");
    }

    #[test]
    fn insert_non_all_zero_matches_is_an_error() {
        let err = run("INSERT missing\n+ new", "a\nb").unwrap_err();
        assert_eq!(err.message, "Could not match line 'missing'.");
    }

    #[test]
    fn insert_all_does_not_loop_on_its_own_lines() {
        // The inserted line matches the instruction; growth stays bounded
        // because the match set is frozen before inserting.
        check(
            "INSERT ALL a\n+ a",
            "a\nx\na",
            "a\na\nx\na\na",
        );
    }

    #[test]
    fn later_instructions_see_earlier_insertions() {
        check(
            "INSERT a\n+ b\nDIFF b\n~ c",
            "a",
            "a\nc",
        );
    }

    #[test]
    fn remove_lines() {
        check("REMOVE a = b", "x\n  a = b\ny", "x\ny");
        check("REMOVE ALL a", "a\nx\na", "x");
        // `()` means no indent and no prefix.
        let err = run("REMOVE () a", "  a").unwrap_err();
        assert_eq!(err.message, "Could not match line 'a' with prefix ''.");
        check("REMOVE () a", "a\n  a", "  a");
    }

    #[test]
    fn regex_mode_diff() {
        check(
            "DIFF/ ('(\\s*)#\\s*') target\n~ ('\\1') target",
            " # target",
            " target",
        );
    }

    #[test]
    fn regex_mode_insert_expands_groups() {
        check(
            "INSERT/ ALL ('(\\s*)#\\s*') target\n+ ('\\1--') transformed",
            " #target",
            " #target\n --transformed",
        );
    }

    #[test]
    fn regex_unpref_keeps_first_group() {
        check("UNPREF/ ('(\\s*)#\\s*') a = b", "  # a = b", "  a = b");
    }

    #[test]
    fn replace_all_with_groups_and_continuation() {
        check(
            "REPLACE ALL \\bth[a-z]+\n/   ' ([a-z]+)'\nBY  DA \\1\\1",
            "Find interesting things\nLike the thing in the doc",
            "Find interesting things\nLike DA thingthing in DA docdoc",
        );
    }

    #[test]
    fn replace_first_match_only() {
        check("REPLACE a BY b", "a a\na", "b a\na");
    }

    #[test]
    fn replace_zero_matches_is_an_error() {
        let err = run("REPLACE missing BY there", "a\nb").unwrap_err();
        assert_eq!(err.message, "Could not match file with pattern /missing/.");
    }

    #[test]
    fn replace_spans_lines_with_dotall() {
        check("REPLACE '(?s)a.b' BY c", "x a\nb y", "x c y");
    }

    #[test]
    fn quoted_bodies_match_exact_tails() {
        check("DIFF 'a = b' *\n~ done", "a = b", "done");
        let err = run("DIFF 'a = b' *\n~ done", "a = b  ").unwrap_err();
        assert_eq!(err.message, "Could not match line 'a = b'.");
    }

    #[test]
    fn replace_star_drops_indent() {
        check("DIFF * a = b\n~ a = b", "a = b", "a = b");
        check("DIFF a = b\n~ * a = b", "   a = b", "a = b");
        check("DIFF (#) a\n~ * b", "# a", "b");
        check("DIFF * (#) a\n~ ** b", "  # a", "b");
    }
}
