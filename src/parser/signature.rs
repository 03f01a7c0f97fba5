use super::preprocessor::{mask_comments, paren_delta};
use super::tokens::{normalize_whitespace, split_top_level};
use super::types::{is_control_keyword, FunctionSignature, Parameter, Qualifier, ShaderType};
use crate::analysis::find_matching_close;
use crate::codegen::DefaultValueProvider;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Header lines are gathered at most this far from the body brace.
const MAX_HEADER_LINES: usize = 8;

static FUNCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:highp|mediump|lowp|precise|inline)\s+)*([A-Za-z_]\w*)\s+([A-Za-z_]\w*)\s*\((.*)\)$",
    )
    .unwrap()
});

/// Return type, name and raw parameter list of a joined header.
fn split_header(header: &str) -> Option<(&str, &str, &str)> {
    let caps = FUNCTION_HEADER.captures(header)?;
    let return_type = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();
    if is_control_keyword(return_type) || is_control_keyword(name) {
        return None;
    }
    Some((return_type, name, caps.get(3)?.as_str()))
}

/// Find where the header of the block opened at (`brace_line`, `brace_col`)
/// starts, if that block is a function body.
pub fn header_start_for_brace(code: &[String], brace_line: usize, brace_col: usize) -> Option<usize> {
    let mut header = code[brace_line][..brace_col].trim().to_string();
    let mut start = brace_line;

    while (header.is_empty() || paren_delta(&header) != 0 || !header.contains('('))
        && start > 0
        && brace_line - start < MAX_HEADER_LINES
    {
        let prev = code[start - 1].trim();
        if prev.ends_with(';') || prev.ends_with('}') || prev.ends_with('{') {
            break;
        }
        start -= 1;
        header = format!("{} {}", prev, header);
    }

    let header = normalize_whitespace(&header);
    split_header(&header).map(|_| start)
}

fn parse_parameter(token: &str, values: &DefaultValueProvider) -> Option<Parameter> {
    let mut qualifier = Qualifier::In;
    let mut words = Vec::new();

    for word in token.split_whitespace() {
        match word {
            "in" => qualifier = Qualifier::In,
            "out" => qualifier = Qualifier::Out,
            "inout" => qualifier = Qualifier::InOut,
            "const" | "highp" | "mediump" | "lowp" => {}
            other => words.push(other),
        }
    }

    let [ty, name] = words.as_slice() else {
        return None;
    };
    let name = name.split('[').next().unwrap_or_default();

    Some(values.parameter(name, ShaderType::parse(ty), qualifier))
}

/// Parse the function whose header begins at `header_line`.
///
/// Returns `None` for prototypes, control blocks and anything else that is
/// not a function definition.
pub fn parse_signature(
    lines: &[String],
    header_line: usize,
    values: &DefaultValueProvider,
) -> Option<FunctionSignature> {
    let code = mask_comments(lines);
    let mut header = String::new();
    let mut open = None;

    'gather: for (i, line) in code
        .iter()
        .enumerate()
        .skip(header_line)
        .take(MAX_HEADER_LINES)
    {
        for (col, ch) in line.char_indices() {
            match ch {
                '{' => {
                    header.push_str(&line[..col]);
                    open = Some((i, col));
                    break 'gather;
                }
                ';' => return None,
                _ => {}
            }
        }
        header.push_str(line);
        header.push(' ');
    }

    let (open_line, open_col) = open?;
    let header = normalize_whitespace(&header);
    let (return_type, name, params) = split_header(&header)?;

    let mut parameters = Vec::new();
    for token in split_top_level(params, ',') {
        if token == "void" {
            continue;
        }
        parameters.push(parse_parameter(&token, values)?);
    }

    let signature = FunctionSignature {
        name: name.to_string(),
        return_type: ShaderType::parse(return_type),
        parameters,
        start_line: header_line,
        open_line,
        end_line: find_matching_close(&code, open_line, open_col),
    };
    debug!(
        name = %signature.name,
        params = signature.parameters.len(),
        "parsed function signature"
    );
    Some(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ParamMode;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_simple_signature() {
        let src = lines("float sdf(vec2 p, float r) {\n    return length(p) - r;\n}");
        let sig = parse_signature(&src, 0, &DefaultValueProvider::default()).unwrap();
        assert_eq!(sig.name, "sdf");
        assert_eq!(sig.return_type, ShaderType::Float);
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[0].ty, ShaderType::Vec2);
        assert_eq!(sig.parameters[0].mode, ParamMode::Uv);
        assert_eq!(sig.parameters[1].mode, ParamMode::Custom);
        assert_eq!((sig.open_line, sig.end_line), (0, Some(2)));
    }

    #[test]
    fn test_parse_qualifiers_and_out_params() {
        let src = lines(
            "void shade(in vec3 n, inout float t,\n           out vec3 col)\n{\n    col = n * t;\n}",
        );
        let sig = parse_signature(&src, 0, &DefaultValueProvider::default()).unwrap();
        assert_eq!(sig.return_type, ShaderType::Void);
        assert_eq!(sig.open_line, 2);
        assert_eq!(sig.end_line, Some(4));

        let quals: Vec<Qualifier> = sig.parameters.iter().map(|p| p.qualifier).collect();
        assert_eq!(quals, vec![Qualifier::In, Qualifier::InOut, Qualifier::Out]);

        let configurable: Vec<&str> = sig
            .configurable_parameters()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(configurable, vec!["n", "t"]);
    }

    #[test]
    fn test_parse_nested_commas_in_params() {
        let src = lines("vec3 f(vec2 a, float b[2]) { return vec3(a, b[0]); }");
        let sig = parse_signature(&src, 0, &DefaultValueProvider::default()).unwrap();
        assert_eq!(sig.parameters[1].name, "b");
        assert_eq!(sig.end_line, Some(0));
    }

    #[test]
    fn test_void_parameter_list() {
        let src = lines("float noise(void) {\n    return 0.0;\n}");
        let sig = parse_signature(&src, 0, &DefaultValueProvider::default()).unwrap();
        assert!(sig.parameters.is_empty());
    }

    #[test]
    fn test_prototypes_and_control_blocks_are_not_functions() {
        let values = DefaultValueProvider::default();
        assert!(parse_signature(&lines("float sdf(vec2 p);"), 0, &values).is_none());
        assert!(parse_signature(&lines("if (x > 0.0) {\n}"), 0, &values).is_none());
        assert!(parse_signature(&lines("} else if (x) {\n}"), 0, &values).is_none());
    }

    #[test]
    fn test_header_start_for_multiline_header() {
        let code = lines("float sdf(vec2 p,\n          float r)\n{\n}");
        assert_eq!(header_start_for_brace(&code, 2, 0), Some(0));

        let loop_code = lines("for (int i = 0; i < 3; i++) {\n}");
        assert_eq!(header_start_for_brace(&loop_code, 0, 28), None);
    }
}
