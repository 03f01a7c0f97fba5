use super::edits::LineEdits;
use super::shadow::queue_shadow;
use super::visualize::return_statement_for_var;
use super::Rewrite;
use crate::analysis::close_open_braces;
use crate::config::InstrumentOptions;
use crate::error::InstrumentError;
use crate::parser::indent_of;
use crate::parser::types::{FunctionSignature, LoopSite, Qualifier, ShaderType, Statement, VarInfo};
use tracing::debug;

/// Name the entry point writes its color to: its own `out vec4` parameter,
/// else the configured default.
pub fn output_var_of<'a>(signature: &'a FunctionSignature, options: &'a InstrumentOptions) -> &'a str {
    signature
        .parameters
        .iter()
        .find(|p| p.qualifier == Qualifier::Out && p.ty == ShaderType::Vec4)
        .map(|p| p.name.as_str())
        .unwrap_or(options.output_var.as_str())
}

/// Surface `var` directly inside the entry point.
///
/// Outside loops the color is written and the function returns right after
/// the target statement. Inside loops the value is carried out through a
/// shadow and shown once the outermost loop finishes. An outermost loop that
/// never closes is closed first so the color is still written after it.
pub fn instrument_entry_point(
    lines: &[String],
    signature: &FunctionSignature,
    statement: &Statement,
    var: &VarInfo,
    enclosing_loops: &[LoopSite],
    options: &InstrumentOptions,
) -> Result<Rewrite, InstrumentError> {
    let output = output_var_of(signature, options);
    let mut edits = LineEdits::new();

    match queue_shadow(lines, &mut edits, statement.end, var, enclosing_loops) {
        None => {
            let indent = indent_of(&lines[statement.end]);
            edits.insert_after(
                statement.end,
                format!("{}{}", indent, return_statement_for_var(&var.ty, &var.name, output)),
            );
            edits.insert_after(statement.end, format!("{}return;", indent));
        }
        Some(shadow) => {
            let outermost = &enclosing_loops[0];
            let indent = indent_of(&lines[outermost.header_line]);
            let show = format!("{}{}", indent, return_statement_for_var(&var.ty, &shadow, output));
            let leave = format!("{}return;", indent);

            let Some(close_line) = outermost.close_line else {
                let header = outermost.header_line + edits.shift_of(outermost.header_line);
                let mut out = close_open_braces(&edits.apply(lines), header)?;
                out.push(show);
                out.push(leave);
                debug!(
                    function = %signature.name,
                    var = %var.name,
                    loops = enclosing_loops.len(),
                    "closed unterminated loop before showing value"
                );
                return Ok(Rewrite {
                    lines: out,
                    function_start: signature.start_line,
                });
            };
            edits.insert_after(close_line, show);
            edits.insert_after(close_line, leave);
        }
    }

    debug!(
        function = %signature.name,
        var = %var.name,
        loops = enclosing_loops.len(),
        "instrumented entry point in place"
    );
    Ok(Rewrite {
        lines: edits.apply(lines),
        function_start: signature.start_line,
    })
}
