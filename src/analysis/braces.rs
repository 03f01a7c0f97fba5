use crate::error::InstrumentError;
use crate::parser::mask_comments;
use crate::parser::preprocessor::brace_delta;
use tracing::{debug, error};

/// Line of the `}` matching the `{` at (`line`, `col`) in masked code.
pub fn find_matching_close(code: &[String], line: usize, col: usize) -> Option<usize> {
    let mut depth = 0i32;

    for (i, text) in code.iter().enumerate().skip(line) {
        let from = if i == line { col } else { 0 };
        for ch in text.get(from..).unwrap_or("").chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
    }

    None
}

/// Net `{` minus `}` from `from` to the end of the source.
pub fn open_brace_count(lines: &[String], from: usize) -> i32 {
    mask_comments(lines)
        .iter()
        .skip(from)
        .map(|line| brace_delta(line))
        .sum()
}

/// Append one `}` line per brace still open after `function_start`.
///
/// Never removes braces. A negative count means the source closes more than
/// it opens, which no generation step produces, so it is reported as a defect.
pub fn close_open_braces(
    lines: &[String],
    function_start: usize,
) -> Result<Vec<String>, InstrumentError> {
    let open = open_brace_count(lines, function_start);

    if open < 0 {
        error!(function_start, excess = -open, "brace count went negative");
        return Err(InstrumentError::BraceUnderflow {
            function_start,
            excess: open.unsigned_abs() as usize,
        });
    }

    let mut out = lines.to_vec();
    if open > 0 {
        debug!(count = open, "closing open braces");
        out.extend((0..open).map(|_| "}".to_string()));
    }
    Ok(out)
}
