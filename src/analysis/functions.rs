use crate::codegen::DefaultValueProvider;
use crate::parser::types::FunctionSignature;
use crate::parser::{header_start_for_brace, mask_comments, parse_signature};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RETURN_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^return\s+(.+?)\s*;$").unwrap());

/// Header line of the nearest function whose body contains `line`.
///
/// Scans upward tracking brace depth; every unmatched `{` met on the way is
/// an enclosing block, and the first one headed by a function signature
/// wins. `None` means `line` sits at global scope.
pub fn find_enclosing_function(lines: &[String], line: usize) -> Option<usize> {
    let code = mask_comments(lines);
    if line >= code.len() {
        return None;
    }

    let mut depth = 0i32;
    for i in (0..=line).rev() {
        for (col, ch) in code[i].char_indices().rev() {
            match ch {
                '}' => depth += 1,
                '{' if depth > 0 => depth -= 1,
                '{' => {
                    if let Some(header) = header_start_for_brace(&code, i, col) {
                        debug!(line, header, "found enclosing function");
                        return Some(header);
                    }
                }
                _ => {}
            }
        }
    }

    None
}

/// The entry point is instrumented in place, never wrapped.
pub fn is_entry_point(signature: &FunctionSignature, entry_point: &str) -> bool {
    signature.name == entry_point
}

/// Header line of the top-level definition of `name`, if the source has one.
pub fn find_function_by_name(lines: &[String], name: &str) -> Option<usize> {
    let code = mask_comments(lines);
    let call = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))).ok()?;
    let values = DefaultValueProvider::default();
    let mut depth = 0i32;

    for (i, text) in code.iter().enumerate() {
        if depth == 0 && call.is_match(text) {
            if let Some(sig) = parse_signature(lines, i, &values) {
                if sig.name == name {
                    return Some(i);
                }
            }
        }
        for ch in text.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    None
}

/// Line and expression of the last `return` in the function body.
pub fn last_return(lines: &[String], signature: &FunctionSignature) -> Option<(usize, String)> {
    let code = mask_comments(lines);
    let end = signature.end_line.unwrap_or(code.len().saturating_sub(1));

    (signature.open_line..=end.min(code.len().saturating_sub(1)))
        .rev()
        .find_map(|i| {
            let caps = RETURN_STATEMENT.captures(code[i].trim())?;
            Some((i, caps.get(1)?.as_str().to_string()))
        })
}
