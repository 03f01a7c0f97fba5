use super::types::Statement;
use crate::error::InstrumentError;

/// Statements longer than this many lines are not joined.
const MAX_STATEMENT_LINES: usize = 32;

/// Blank out `//` and `/* */` comments, keeping every byte offset intact so
/// columns found in the masked text index the original line too.
pub fn mask_comments<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut in_block = false;

    for line in lines {
        let line = line.as_ref();
        let mut masked = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut in_line_comment = false;

        while let Some(ch) = chars.next() {
            if in_line_comment {
                push_blank(&mut masked, ch);
                continue;
            }
            if in_block {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    masked.push_str("  ");
                    in_block = false;
                } else {
                    push_blank(&mut masked, ch);
                }
                continue;
            }
            if ch == '/' {
                match chars.peek() {
                    Some('/') => {
                        chars.next();
                        masked.push_str("  ");
                        in_line_comment = true;
                        continue;
                    }
                    Some('*') => {
                        chars.next();
                        masked.push_str("  ");
                        in_block = true;
                        continue;
                    }
                    _ => {}
                }
            }
            masked.push(ch);
        }

        out.push(masked);
    }

    out
}

fn push_blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

/// Count `{` and `}` in already-masked code.
pub fn count_braces(code: &str) -> (usize, usize) {
    code.chars().fold((0, 0), |(opens, closes), ch| match ch {
        '{' => (opens + 1, closes),
        '}' => (opens, closes + 1),
        _ => (opens, closes),
    })
}

/// Net brace delta of a masked line.
pub fn brace_delta(code: &str) -> i32 {
    let (opens, closes) = count_braces(code);
    opens as i32 - closes as i32
}

/// Net parenthesis delta of a masked line.
pub fn paren_delta(code: &str) -> i32 {
    let mut delta = 0i32;
    for ch in code.chars() {
        match ch {
            '(' => delta += 1,
            ')' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Leading whitespace of a line.
pub fn indent_of(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

fn ends_previous_statement(code: &str) -> bool {
    let t = code.trim();
    t.is_empty()
        || t.ends_with(';')
        || t.ends_with('{')
        || t.ends_with('}')
        || t.starts_with('#')
        || starts_with_control_header(t)
}

fn starts_with_control_header(t: &str) -> bool {
    let word: String = t
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    matches!(word.as_str(), "for" | "while" | "if" | "else" | "do" | "switch")
}

/// Join the statement touching `target` from masked code.
///
/// Walks back while the previous line does not end a statement, then forward
/// tracking paren depth until a `;` outside parentheses. Returns `None` when
/// a brace interrupts the statement or no `;` follows within reach.
pub fn statement_at(code: &[String], target: usize) -> Option<Statement> {
    if target >= code.len() {
        return None;
    }

    let mut start = target;
    while start > 0 && target - start < MAX_STATEMENT_LINES {
        if ends_previous_statement(&code[start - 1]) {
            break;
        }
        start -= 1;
    }

    let mut text = String::new();
    let mut depth = 0i32;
    let last = (start + MAX_STATEMENT_LINES).min(code.len());

    for (i, line) in code.iter().enumerate().take(last).skip(start) {
        let piece = line.trim();
        if !text.is_empty() && !piece.is_empty() {
            text.push(' ');
        }
        for ch in piece.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                '{' | '}' if depth <= 0 => return None,
                ';' if depth <= 0 => {
                    text.push(ch);
                    if i < target {
                        // The statement ended before reaching the target line.
                        return None;
                    }
                    return Some(Statement {
                        text,
                        start,
                        end: i,
                    });
                }
                _ => {}
            }
            text.push(ch);
        }
    }

    None
}

/// Map the editor's line number onto the current source, tolerating drift.
///
/// When `expected` is non-empty and differs from the text at `line`, the
/// nearest line within `window` whose trimmed text equals `expected` wins.
pub fn resolve_target_line(
    lines: &[String],
    line: usize,
    expected: &str,
    window: usize,
) -> Result<usize, InstrumentError> {
    if line >= lines.len() {
        return Err(InstrumentError::TargetLineOutOfRange {
            line,
            len: lines.len(),
        });
    }

    let expected = expected.trim();
    if expected.is_empty() || lines[line].trim() == expected {
        return Ok(line);
    }

    for offset in 1..=window {
        if let Some(up) = line.checked_sub(offset) {
            if lines[up].trim() == expected {
                return Ok(up);
            }
        }
        let down = line + offset;
        if down < lines.len() && lines[down].trim() == expected {
            return Ok(down);
        }
    }

    Err(InstrumentError::TargetLineNotFound { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(src: &str) -> Vec<String> {
        let lines: Vec<&str> = src.lines().collect();
        mask_comments(&lines)
    }

    #[test]
    fn test_mask_keeps_offsets() {
        let masked = code("x = 1; // set {x}\n/* a { */ y = 2;");
        assert_eq!(masked[0].len(), "x = 1; // set {x}".len());
        assert_eq!(masked[0].trim_end(), "x = 1;");
        assert_eq!(masked[1].trim(), "y = 2;");
    }

    #[test]
    fn test_mask_multiline_block_comment() {
        let masked = code("a;\n/* start {\n still } here\n end */ b;");
        assert_eq!(count_braces(&masked.join("\n")), (0, 0));
        assert_eq!(masked[3].trim(), "b;");
    }

    #[test]
    fn test_brace_and_paren_delta() {
        assert_eq!(brace_delta("for (int i = 0; i < 3; i++) {"), 1);
        assert_eq!(brace_delta("} else {"), 0);
        assert_eq!(paren_delta("f(a, (b)"), 1);
    }

    #[test]
    fn test_statement_single_line() {
        let c = code("void f() {\n    float d = length(p);\n}");
        let s = statement_at(&c, 1).unwrap();
        assert_eq!(s.text, "float d = length(p);");
        assert_eq!((s.start, s.end), (1, 1));
    }

    #[test]
    fn test_statement_split_across_lines() {
        let c = code("{\n    col =\n        mix(a,\n            b, t);\n}");
        for target in 1..=3 {
            let s = statement_at(&c, target).unwrap();
            assert_eq!((s.start, s.end), (1, 3));
            assert_eq!(s.text, "col = mix(a, b, t);");
        }
    }

    #[test]
    fn test_statement_rejects_block_lines() {
        let c = code("for (int i = 0; i < 4; i++) {\n}");
        assert!(statement_at(&c, 0).is_none());
        assert!(statement_at(&c, 1).is_none());
    }

    #[test]
    fn test_resolve_target_line_drift() {
        let lines: Vec<String> = ["a;", "b;", "c;", "d;"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolve_target_line(&lines, 1, "b;", 8), Ok(1));
        assert_eq!(resolve_target_line(&lines, 0, "  d;", 8), Ok(3));
        assert_eq!(resolve_target_line(&lines, 1, "", 8), Ok(1));
        assert_eq!(
            resolve_target_line(&lines, 1, "zzz;", 8),
            Err(InstrumentError::TargetLineNotFound { line: 1 })
        );
        assert_eq!(
            resolve_target_line(&lines, 9, "a;", 8),
            Err(InstrumentError::TargetLineOutOfRange { line: 9, len: 4 })
        );
    }
}
