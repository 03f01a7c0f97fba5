use super::preprocessor::{mask_comments, resolve_target_line, statement_at};
use super::types::{is_control_keyword, is_type_keyword, ShaderType, Statement, VarInfo};
use crate::error::InstrumentError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const DEFAULT_DRIFT_WINDOW: usize = 8;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:const|highp|mediump|lowp|precise)\s+)*([A-Za-z_]\w*)\s+([A-Za-z_]\w*)\s*(\[[^\]]*\]\s*)?=([^=].*)$",
    )
    .unwrap()
});

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)((?:\s*\.\s*[A-Za-z_]\w*|\s*\[[^\]]*\])*)\s*([-+*/]?=)(.*)$").unwrap()
});

/// What the statement on the target line does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Declaration { var: VarInfo, statement: Statement },
    Assignment { var: VarInfo, statement: Statement },
    NoMatch,
}

impl Classification {
    pub fn var(&self) -> Option<&VarInfo> {
        match self {
            Classification::Declaration { var, .. } | Classification::Assignment { var, .. } => {
                Some(var)
            }
            Classification::NoMatch => None,
        }
    }

    pub fn statement(&self) -> Option<&Statement> {
        match self {
            Classification::Declaration { statement, .. }
            | Classification::Assignment { statement, .. } => Some(statement),
            Classification::NoMatch => None,
        }
    }
}

/// Raw matcher result, before the assigned variable's type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Declared(VarInfo),
    Assigned(String),
}

struct Matcher {
    name: &'static str,
    apply: fn(&str) -> Option<Candidate>,
}

/// Tried in order; the first hit wins.
const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "declaration-with-initializer",
        apply: match_declaration,
    },
    Matcher {
        name: "assignment",
        apply: match_assignment,
    },
];

/// `<type> <name> = <expr>;` with a recognized type keyword. Array
/// declarations have no single color and never match.
pub fn match_declaration(text: &str) -> Option<Candidate> {
    let caps = DECLARATION.captures(text.trim())?;
    let ty = caps.get(1)?.as_str();
    if !is_type_keyword(ty) || caps.get(3).is_some() {
        return None;
    }
    let name = caps.get(2)?.as_str();
    Some(Candidate::Declared(VarInfo::new(name, ShaderType::parse(ty))))
}

/// `name = expr;` or `name op= expr;`, member and swizzle targets included.
/// Comparisons never match.
pub fn match_assignment(text: &str) -> Option<Candidate> {
    let caps = ASSIGNMENT.captures(text.trim())?;
    let name = caps.get(1)?.as_str();
    if is_control_keyword(name) || is_type_keyword(name) {
        return None;
    }
    let op = caps.get(3)?.as_str();
    let rest = caps.get(4)?.as_str();
    if op == "=" && rest.starts_with('=') {
        return None;
    }
    Some(Candidate::Assigned(name.to_string()))
}

/// Run the ordered matchers over one statement's text.
pub fn match_statement(text: &str) -> Option<Candidate> {
    MATCHERS.iter().find_map(|m| {
        let hit = (m.apply)(text);
        if hit.is_some() {
            debug!(matcher = m.name, statement = text, "statement matched");
        }
        hit
    })
}

/// Type found at a variable's declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub ty: ShaderType,
    pub is_array: bool,
}

fn declaration_pattern(name: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?:^|[^\w.])([A-Za-z_]\w*)\s+{}\s*(\[[^\]]*\]\s*)?(?:[=;,)]|$)",
        regex::escape(name)
    ))
    .ok()
}

fn declared_on_line(pattern: &Regex, line: &str) -> Option<Declaration> {
    pattern
        .captures_iter(line)
        .find(|c| c.get(1).is_some_and(|ty| is_type_keyword(ty.as_str())))
        .and_then(|c| {
            Some(Declaration {
                ty: ShaderType::parse(c.get(1)?.as_str()),
                is_array: c.get(2).is_some(),
            })
        })
}

/// Search backward from `before` for the declaration of `name` in the same
/// or an enclosing scope. Blocks that closed before `before` are skipped,
/// together with their headers.
pub fn find_declaration(code: &[String], name: &str, before: usize) -> Option<Declaration> {
    let pattern = declaration_pattern(name)?;
    let mut depth = 0i32;
    let mut skip_header = false;

    for i in (0..before.min(code.len())).rev() {
        let line = code[i].trim();

        if skip_header {
            if line.is_empty() || line.ends_with(';') || line.ends_with('{') || line.ends_with('}') {
                skip_header = false;
            } else {
                continue;
            }
        }

        if depth == 0 {
            if let Some(found) = declared_on_line(&pattern, line) {
                debug!(name, line = i, ty = %found.ty, "resolved variable type");
                return Some(found);
            }
        }

        // Right to left, so the `}` of `} else {` closes the sibling block.
        let was_nested = depth > 0;
        for ch in line.chars().rev() {
            match ch {
                '}' => depth += 1,
                '{' => depth = (depth - 1).max(0),
                _ => {}
            }
        }
        if was_nested && depth == 0 && line == "{" {
            skip_header = true;
        }
    }

    None
}

/// Classify the statement touching `target_line`, reporting why nothing
/// matched. Never returns `Ok(Classification::NoMatch)`.
pub fn try_classify(
    lines: &[String],
    target_line: usize,
    target_line_text: &str,
) -> Result<Classification, InstrumentError> {
    let line = resolve_target_line(lines, target_line, target_line_text, DEFAULT_DRIFT_WINDOW)?;
    let code = mask_comments(lines);
    let statement = statement_at(&code, line).ok_or(InstrumentError::NoMatch { line })?;

    match match_statement(&statement.text) {
        Some(Candidate::Declared(var)) => Ok(Classification::Declaration { var, statement }),
        Some(Candidate::Assigned(name)) => {
            let declaration = find_declaration(&code, &name, statement.start)
                .ok_or(InstrumentError::UnresolvedType { name: name.clone() })?;
            if declaration.is_array {
                debug!(%name, "assignment into an array");
                return Err(InstrumentError::NoMatch { line });
            }
            Ok(Classification::Assignment {
                var: VarInfo::new(name, declaration.ty),
                statement,
            })
        }
        None => Err(InstrumentError::NoMatch { line }),
    }
}

/// Classify the statement touching `target_line`.
pub fn classify(lines: &[String], target_line: usize, target_line_text: &str) -> Classification {
    try_classify(lines, target_line, target_line_text).unwrap_or(Classification::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_declaration_requires_type_keyword() {
        assert_eq!(
            match_declaration("vec3 col = vec3(uv, 0.5);"),
            Some(Candidate::Declared(VarInfo::new("col", ShaderType::Vec3)))
        );
        assert_eq!(
            match_declaration("const float k = 2.0;"),
            Some(Candidate::Declared(VarInfo::new("k", ShaderType::Float)))
        );
        assert_eq!(match_declaration("Ray r = Ray(ro, rd);"), None);
        assert_eq!(match_declaration("col = vec3(uv, 0.5);"), None);
    }

    #[test]
    fn test_assignment_rejects_comparisons() {
        assert_eq!(
            match_assignment("col = vec3(uv, 0.5);"),
            Some(Candidate::Assigned("col".into()))
        );
        assert_eq!(
            match_assignment("col.rg *= 0.5;"),
            Some(Candidate::Assigned("col".into()))
        );
        assert_eq!(
            match_assignment("t += h;"),
            Some(Candidate::Assigned("t".into()))
        );
        assert_eq!(match_assignment("x == 0.5;"), None);
        assert_eq!(match_assignment("x != 0.5;"), None);
        assert_eq!(match_assignment("x <= 0.5;"), None);
        assert_eq!(match_assignment("x >= 0.5;"), None);
        assert_eq!(match_assignment("if (x == 0.5) col = a;"), None);
    }

    #[test]
    fn test_declaration_beats_assignment() {
        assert_eq!(
            match_statement("float d = length(p) - 0.5;"),
            Some(Candidate::Declared(VarInfo::new("d", ShaderType::Float)))
        );
    }

    #[test]
    fn test_classify_assignment_resolves_bare_declaration() {
        let src = lines(
            "void mainImage(out vec4 fragColor, in vec2 fragCoord) {\n    vec3 wp;\n    wp = vec3(fragCoord, 1.0);\n}",
        );
        match classify(&src, 2, "wp = vec3(fragCoord, 1.0);") {
            Classification::Assignment { var, statement } => {
                assert_eq!(var, VarInfo::new("wp", ShaderType::Vec3));
                assert_eq!(statement.end, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_parameter_and_loop_variable_types() {
        let src = lines(
            "float f(vec2 p) {\n    p = abs(p);\n    for (int i = 0; i < 4; i++) {\n        i += 1;\n    }\n    return p.x;\n}",
        );
        assert_eq!(
            classify(&src, 1, "").var(),
            Some(&VarInfo::new("p", ShaderType::Vec2))
        );
        assert_eq!(
            classify(&src, 3, "").var(),
            Some(&VarInfo::new("i", ShaderType::Int))
        );
    }

    #[test]
    fn test_sibling_block_declarations_are_invisible() {
        let src = lines(
            "void f() {\n    if (true) {\n        float t = 1.0;\n    }\n    t = 2.0;\n}",
        );
        assert_eq!(
            try_classify(&src, 4, ""),
            Err(InstrumentError::UnresolvedType { name: "t".into() })
        );
    }

    #[test]
    fn test_else_branch_skips_sibling_if_body() {
        let src = lines(
            "void f(bool c) {\n    float t = 0.0;\n    if (c) {\n        vec3 t = vec3(1.0);\n    } else {\n        t = 1.0;\n    }\n}",
        );
        assert_eq!(
            classify(&src, 5, "t = 1.0;").var(),
            Some(&VarInfo::new("t", ShaderType::Float))
        );
    }

    #[test]
    fn test_arrays_are_not_visualized() {
        assert_eq!(match_declaration("float k[3] = float[3](1.0, 2.0, 3.0);"), None);

        let src = lines("void f() {\n    float a[2];\n    a[0] = 1.0;\n}");
        assert_eq!(
            try_classify(&src, 2, "a[0] = 1.0;"),
            Err(InstrumentError::NoMatch { line: 2 })
        );

        let vec = lines("void f() {\n    vec3 c = vec3(0.0);\n    c[0] = 1.0;\n}");
        assert_eq!(
            classify(&vec, 2, "").var(),
            Some(&VarInfo::new("c", ShaderType::Vec3))
        );
    }

    #[test]
    fn test_closed_function_parameters_are_invisible() {
        let src = lines(
            "float g(vec2 q)\n{\n    return q.x;\n}\nvoid f() {\n    q = vec2(1.0);\n}",
        );
        assert_eq!(classify(&src, 5, ""), Classification::NoMatch);
    }

    #[test]
    fn test_multiline_statement_classifies_from_any_line() {
        let src = lines("void f() {\n    float d =\n        length(\n            p);\n}");
        for line in 1..=3 {
            let c = classify(&src, line, "");
            assert_eq!(c.var(), Some(&VarInfo::new("d", ShaderType::Float)));
            assert_eq!(c.statement().map(|s| s.end), Some(3));
        }
    }

    #[test]
    fn test_conditional_is_no_match() {
        let src = lines("void f() {\n    float x = 0.0;\n    if (x == 0.5) {\n    }\n}");
        assert_eq!(classify(&src, 2, "if (x == 0.5) {"), Classification::NoMatch);
    }
}
