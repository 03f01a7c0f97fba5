use super::defaults::zero_literal;
use super::edits::LineEdits;
use crate::parser::indent_of;
use crate::parser::types::{LoopSite, VarInfo};
use tracing::debug;

pub fn shadow_name(var: &VarInfo) -> String {
    format!("_dbg_shadow_{}", var.name)
}

/// `<type> <shadow> = <zero>;`, without initializer when the type has no zero.
pub fn shadow_declaration(var: &VarInfo) -> String {
    match zero_literal(&var.ty) {
        Some(zero) => format!("{} {} = {};", var.ty, shadow_name(var), zero),
        None => format!("{} {};", var.ty, shadow_name(var)),
    }
}

pub fn shadow_assignment(var: &VarInfo) -> String {
    format!("{} = {};", shadow_name(var), var.name)
}

/// Queue the shadow edits for a value computed inside `enclosing_loops`.
/// Returns the shadow's name, or `None` when no loop encloses the target.
pub(crate) fn queue_shadow(
    lines: &[String],
    edits: &mut LineEdits,
    target_line: usize,
    var: &VarInfo,
    enclosing_loops: &[LoopSite],
) -> Option<String> {
    let outermost = enclosing_loops.first()?;

    let header_indent = indent_of(&lines[outermost.header_line]);
    edits.insert_before(
        outermost.header_line,
        format!("{}{}", header_indent, shadow_declaration(var)),
    );

    let target_indent = indent_of(&lines[target_line]);
    edits.insert_after(
        target_line,
        format!("{}{}", target_indent, shadow_assignment(var)),
    );

    debug!(
        var = %var.name,
        loops = enclosing_loops.len(),
        outermost = outermost.header_line,
        "inserted shadow variable"
    );
    Some(shadow_name(var))
}

/// Carry a loop-local value past its loops: declare a shadow before the
/// outermost enclosing loop and copy the value into it right after
/// `target_line`. Once the loops finish the shadow holds the value from the
/// last executed iteration. No-op without enclosing loops.
pub fn insert_shadow_variable(
    lines: &[String],
    target_line: usize,
    var: &VarInfo,
    enclosing_loops: &[LoopSite],
) -> Vec<String> {
    let mut edits = LineEdits::new();
    queue_shadow(lines, &mut edits, target_line, var, enclosing_loops);
    edits.apply(lines)
}
