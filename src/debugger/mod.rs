//! Per-request orchestration: locate the target, pick a surfacing strategy,
//! apply loop caps and close braces. Nothing persists between calls.

mod target;

pub use crate::codegen::LoopCaps;
pub use target::DebugTarget;

use crate::analysis::{close_open_braces, is_entry_point};
use crate::codegen::{
    cap_loop_iterations, instrument_entry_point, wrap_function_for_debugging,
    wrap_one_liner_for_debugging, DefaultValueProvider,
};
use crate::config::InstrumentOptions;
use crate::error::InstrumentError;
use crate::parser::types::{ShaderType, SourceLines, VarInfo};
use crate::parser::{match_statement, Candidate};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct Instrumenter {
    options: InstrumentOptions,
    values: DefaultValueProvider,
}

impl Default for Instrumenter {
    fn default() -> Self {
        Self::new(InstrumentOptions::default())
    }
}

impl Instrumenter {
    pub fn new(options: InstrumentOptions) -> Self {
        let values = DefaultValueProvider::new(&options);
        Self { options, values }
    }

    pub fn options(&self) -> &InstrumentOptions {
        &self.options
    }

    /// Rewrite `source` so the output color shows the value set on
    /// `target_line`, or report why that line cannot be shown.
    pub fn try_instrument(
        &self,
        source: &str,
        target_line: usize,
        target_line_text: &str,
        loop_caps: &LoopCaps,
    ) -> Result<String, InstrumentError> {
        let lines = SourceLines::new(source);
        let target = DebugTarget::locate(
            &lines,
            target_line,
            target_line_text,
            self.options.drift_window,
            &self.values,
        )?;
        let (Some(var), Some(statement)) = (target.var(), target.statement()) else {
            return Err(InstrumentError::NoMatch { line: target.line });
        };

        let rewrite = if is_entry_point(&target.function, &self.options.entry_point) {
            instrument_entry_point(
                &lines,
                &target.function,
                statement,
                var,
                &target.enclosing_loops,
                &self.options,
            )?
        } else {
            wrap_function_for_debugging(
                &lines,
                &target.function,
                statement,
                var,
                &target.enclosing_loops,
                &self.options,
            )?
        };

        let mut out = rewrite.lines;
        if !loop_caps.is_empty() {
            out = cap_loop_iterations(&out, rewrite.function_start, loop_caps);
        }
        let out = close_open_braces(&out, rewrite.function_start)?;

        debug!(
            line = target.line,
            function = %target.function.name,
            var = %var.name,
            ty = %var.ty,
            "instrumented shader"
        );
        Ok(lines.render(&out))
    }

    /// Like [`Instrumenter::try_instrument`], with every failure collapsed
    /// to `None`. Defects are logged before being dropped.
    pub fn instrument(
        &self,
        source: &str,
        target_line: usize,
        target_line_text: &str,
        loop_caps: &LoopCaps,
    ) -> Option<String> {
        match self.try_instrument(source, target_line, target_line_text, loop_caps) {
            Ok(out) => Some(out),
            Err(e) if e.is_defect() => {
                error!(error = %e, target_line, "instrumentation defect");
                None
            }
            Err(e) => {
                debug!(reason = %e, target_line, "nothing to visualize");
                None
            }
        }
    }

    /// Wrap a bare statement that lives outside any function. Assignments
    /// need `ty` since there is no surrounding code to resolve it from.
    pub fn instrument_snippet(&self, line_text: &str, ty: Option<ShaderType>) -> Option<String> {
        let var = match (match_statement(line_text.trim())?, ty) {
            (Candidate::Declared(var), _) => var,
            (Candidate::Assigned(name), Some(ty)) => VarInfo::new(name, ty),
            (Candidate::Assigned(name), None) => {
                debug!(%name, "snippet assignment without a type");
                return None;
            }
        };
        Some(wrap_one_liner_for_debugging(line_text, &var, &self.options).join("\n"))
    }
}

/// Instrument with the default Shadertoy options.
pub fn instrument(
    source: &str,
    target_line: usize,
    target_line_text: &str,
    loop_caps: &LoopCaps,
) -> Option<String> {
    Instrumenter::default().instrument(source, target_line, target_line_text, loop_caps)
}
