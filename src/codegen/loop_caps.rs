use super::edits::LineEdits;
use crate::analysis::find_loops;
use crate::parser::{indent_of, mask_comments};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Maximum iterations keyed by loop index (encounter order in the function).
pub type LoopCaps = HashMap<usize, u32>;

pub fn counter_name(index: usize) -> String {
    format!("_dbg_loop{}_iter", index)
}

/// Bound the loops of one function so an interactive preview cannot stall.
///
/// Each loop whose index is in `caps` gets a zeroed counter declared just
/// before its header and, as the first statement of its body, a guard that
/// increments the counter and breaks once it exceeds the cap. Loops missing
/// from `caps` and loops without a braced body are left alone.
pub fn cap_loop_iterations(lines: &[String], function_start: usize, caps: &LoopCaps) -> Vec<String> {
    if caps.is_empty() {
        return lines.to_vec();
    }

    let code = mask_comments(lines);
    let mut edits = LineEdits::new();

    for site in find_loops(lines, function_start) {
        let Some(&cap) = caps.get(&site.index) else {
            continue;
        };
        let Some((open_line, open_col)) = site.open else {
            warn!(index = site.index, header = %site.header_text, "cannot cap a loop without braces");
            continue;
        };

        let counter = counter_name(site.index);
        let indent = indent_of(&lines[site.header_line]);
        edits.insert_before(site.header_line, format!("{}int {} = 0;", indent, counter));

        let guard = format!("if (++{} > {}) break;", counter, cap);
        let rest_of_line = code[open_line].get(open_col + 1..).unwrap_or("");
        if rest_of_line.trim().is_empty() {
            edits.insert_after(open_line, format!("{}    {}", indent, guard));
        } else {
            edits.splice_after(open_line, open_col, format!(" {}", guard));
        }
        debug!(index = site.index, cap, "capped loop");
    }

    edits.apply(lines)
}
