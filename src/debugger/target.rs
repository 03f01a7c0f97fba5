use crate::analysis::{find_enclosing_function, find_enclosing_loops};
use crate::codegen::DefaultValueProvider;
use crate::error::InstrumentError;
use crate::parser::types::{FunctionSignature, LoopSite, Statement, VarInfo};
use crate::parser::{parse_signature, resolve_target_line, try_classify, Classification};
use tracing::debug;

/// Everything known about the line being debugged, derived fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTarget {
    /// Target line after drift resolution.
    pub line: usize,
    pub function: FunctionSignature,
    pub classification: Classification,
    /// Braced loops around the target, outermost first.
    pub enclosing_loops: Vec<LoopSite>,
}

impl DebugTarget {
    pub fn locate(
        lines: &[String],
        target_line: usize,
        target_line_text: &str,
        drift_window: usize,
        values: &DefaultValueProvider,
    ) -> Result<Self, InstrumentError> {
        let line = resolve_target_line(lines, target_line, target_line_text, drift_window)?;
        if line != target_line {
            debug!(from = target_line, to = line, "target line drifted");
        }

        let header = find_enclosing_function(lines, line).ok_or(InstrumentError::GlobalScope { line })?;
        let function =
            parse_signature(lines, header, values).ok_or(InstrumentError::GlobalScope { line })?;

        // The line is already resolved, so the drift check is skipped here.
        let classification = try_classify(lines, line, "")?;
        let enclosing_loops = find_enclosing_loops(lines, header, line);

        Ok(Self {
            line,
            function,
            classification,
            enclosing_loops,
        })
    }

    pub fn var(&self) -> Option<&VarInfo> {
        self.classification.var()
    }

    pub fn statement(&self) -> Option<&Statement> {
        self.classification.statement()
    }
}
