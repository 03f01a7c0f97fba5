use super::defaults::DefaultValueProvider;
use super::edits::LineEdits;
use super::shadow::{shadow_assignment, shadow_declaration, shadow_name};
use super::visualize::return_statement_for_var;
use super::Rewrite;
use crate::analysis::{close_open_braces, find_function_by_name, last_return};
use crate::config::InstrumentOptions;
use crate::error::InstrumentError;
use crate::parser::preprocessor::brace_delta;
use crate::parser::types::{FunctionSignature, LoopSite, Qualifier, Statement, VarInfo};
use crate::parser::{indent_of, mask_comments};
use regex::{Regex, RegexSet};
use tracing::debug;

const INDENT: &str = "    ";

/// How the synthetic entry point gets at the debugged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surfacing {
    /// The function already returns the variable; show the call's result.
    ReturnValue,
    /// Copy the variable into a file-scope shadow and show that after the call.
    Shadow,
}

/// Return-value surfacing needs the target at function-body depth outside
/// every loop, a matching return type, and a final `return <var>;` with no
/// write to the variable in between.
pub fn choose_surfacing(
    lines: &[String],
    signature: &FunctionSignature,
    statement: &Statement,
    var: &VarInfo,
    enclosing_loops: &[LoopSite],
) -> Surfacing {
    if !enclosing_loops.is_empty() || signature.return_type != var.ty {
        return Surfacing::Shadow;
    }
    let Some((return_line, expression)) = last_return(lines, signature) else {
        return Surfacing::Shadow;
    };
    if expression != var.name || return_line <= statement.end {
        return Surfacing::Shadow;
    }

    let code = mask_comments(lines);
    let depth: i32 = code
        .get(signature.open_line..statement.start)
        .unwrap_or_default()
        .iter()
        .map(|line| brace_delta(line))
        .sum();
    if depth > 1 || written_between(&code, &var.name, statement.end + 1, return_line) {
        return Surfacing::Shadow;
    }
    Surfacing::ReturnValue
}

/// Whether any masked line in `from..to` assigns, increments or decrements
/// `name`, including through a swizzle or an index.
fn written_between(code: &[String], name: &str, from: usize, to: usize) -> bool {
    let name = regex::escape(name);
    let patterns = [
        format!(
            r"(?:^|[^\w.]){}\s*(?:\.\s*\w+|\[[^\]]*\])*\s*(?:(?:<<|>>|[-+*/%&|^])?=(?:[^=]|$)|\+\+|--)",
            name
        ),
        format!(r"(?:\+\+|--)\s*{}\b", name),
    ];
    let Ok(writes) = RegexSet::new(&patterns) else {
        return true;
    };
    code[from.min(to)..to].iter().any(|line| writes.is_match(line))
}

/// Setup statements and argument list for calling a function with debug inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugCall {
    pub setup: Vec<String>,
    pub arguments: Vec<String>,
}

/// Derive one argument per parameter. `in` parameters are passed inline,
/// `inout` ones through an initialised local and `out` ones through an
/// uninitialised local.
pub fn generate_default_parameters(signature: &FunctionSignature) -> Result<DebugCall, InstrumentError> {
    let mut call = DebugCall::default();

    for param in &signature.parameters {
        if param.qualifier == Qualifier::Out {
            let local = format!("_dbg_out_{}", param.name);
            call.setup.push(format!("{} {};", param.ty, local));
            call.arguments.push(local);
            continue;
        }

        let value = param
            .value()
            .ok_or_else(|| InstrumentError::UnsupportedParameter {
                name: param.name.clone(),
                ty: param.ty.to_string(),
            })?;

        if param.qualifier == Qualifier::InOut {
            let local = format!("_dbg_arg_{}", param.name);
            call.setup.push(format!("{} {} = {};", param.ty, local, value));
            call.arguments.push(local);
        } else {
            call.arguments.push(value.to_string());
        }
    }

    Ok(call)
}

fn entry_header(options: &InstrumentOptions) -> String {
    format!(
        "void {}(out vec4 {}, in vec2 {}) {{",
        options.entry_point, options.output_var, options.coord_var
    )
}

fn entry_prologue(options: &InstrumentOptions) -> Vec<String> {
    let mut out = vec![entry_header(options)];
    for line in DefaultValueProvider::new(options).uv_setup() {
        out.push(format!("{}{}", INDENT, line));
    }
    out
}

/// Put a bare statement into a minimal entry point that shows `var`.
pub fn wrap_one_liner_for_debugging(
    line_text: &str,
    var: &VarInfo,
    options: &InstrumentOptions,
) -> Vec<String> {
    let mut out = entry_prologue(options);
    out.push(format!("{}{}", INDENT, line_text.trim()));
    out.push(format!(
        "{}{}",
        INDENT,
        return_statement_for_var(&var.ty, &var.name, &options.output_var)
    ));
    out.push("}".to_string());
    out
}

/// Rename an existing entry point so the appended one is the only definition.
fn rename_entry_point(lines: &[String], edits: &mut LineEdits, options: &InstrumentOptions) {
    let Some(header) = find_function_by_name(lines, &options.entry_point) else {
        return;
    };
    let Ok(pattern) = Regex::new(&format!(r"\b{}(\s*\()", regex::escape(&options.entry_point))) else {
        return;
    };
    let renamed = format!("_dbg_original_{}", options.entry_point);
    let text = pattern.replace(&lines[header], format!("{}$1", renamed).as_str());
    debug!(line = header, %renamed, "renamed existing entry point");
    edits.replace(header, text.into_owned());
}

/// Debug a non-entry function by calling it from a synthetic entry point.
///
/// With [`Surfacing::ReturnValue`] the function is left untouched. With
/// [`Surfacing::Shadow`] the only edits are a zero-initialised global shadow
/// before its header and a copy into it after the target statement.
pub fn wrap_function_for_debugging(
    lines: &[String],
    signature: &FunctionSignature,
    statement: &Statement,
    var: &VarInfo,
    enclosing_loops: &[LoopSite],
    options: &InstrumentOptions,
) -> Result<Rewrite, InstrumentError> {
    let call = generate_default_parameters(signature)?;
    let surfacing = choose_surfacing(lines, signature, statement, var, enclosing_loops);
    let mut edits = LineEdits::new();

    if surfacing == Surfacing::Shadow {
        edits.insert_before(signature.start_line, shadow_declaration(var));
        edits.insert_after(
            statement.end,
            format!("{}{}", indent_of(&lines[statement.end]), shadow_assignment(var)),
        );
    }
    rename_entry_point(lines, &mut edits, options);

    let function_start = signature.start_line + edits.shift_of(signature.start_line);
    // The debugged function must be closed before anything is appended.
    let mut out = close_open_braces(&edits.apply(lines), function_start)?;

    let invocation = format!("{}({})", signature.name, call.arguments.join(", "));
    out.push(String::new());
    out.extend(entry_prologue(options));
    out.extend(call.setup.iter().map(|line| format!("{}{}", INDENT, line)));
    match surfacing {
        Surfacing::ReturnValue => {
            out.push(format!("{}{} _dbg_result = {};", INDENT, signature.return_type, invocation));
            out.push(format!(
                "{}{}",
                INDENT,
                return_statement_for_var(&var.ty, "_dbg_result", &options.output_var)
            ));
        }
        Surfacing::Shadow => {
            out.push(format!("{}{};", INDENT, invocation));
            out.push(format!(
                "{}{}",
                INDENT,
                return_statement_for_var(&var.ty, &shadow_name(var), &options.output_var)
            ));
        }
    }
    out.push("}".to_string());

    debug!(
        function = %signature.name,
        var = %var.name,
        ?surfacing,
        "wrapped function for debugging"
    );
    Ok(Rewrite {
        lines: out,
        function_start,
    })
}
