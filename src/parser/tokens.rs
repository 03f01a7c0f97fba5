/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on `sep` only where it is not nested in `()` or `[]`.
pub fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in text.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ => {}
        }

        if ch == sep && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
            continue;
        }

        current.push(ch);
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ignores_nested_commas() {
        let parts = split_top_level("vec2 p, float r = max(a, b), in vec3 c", ',');
        assert_eq!(parts, vec!["vec2 p", "float r = max(a, b)", "in vec3 c"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_top_level("  ", ',').is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("float   sdf (\tvec2 p )"), "float sdf ( vec2 p )");
    }
}
