use thiserror::Error;

/// Reasons an instrumentation request produced no output.
///
/// Everything except [`InstrumentError::BraceUnderflow`] is an expected
/// "nothing to visualize here" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    #[error("target line {line} is out of range (source has {len} lines)")]
    TargetLineOutOfRange { line: usize, len: usize },

    #[error("line {line} no longer matches the editor text")]
    TargetLineNotFound { line: usize },

    #[error("line {line} is not inside a function")]
    GlobalScope { line: usize },

    #[error("line {line} is not a supported declaration or assignment")]
    NoMatch { line: usize },

    #[error("could not resolve the type of `{name}`")]
    UnresolvedType { name: String },

    #[error("parameter `{name}` of type `{ty}` has no debug value")]
    UnsupportedParameter { name: String, ty: String },

    #[error("brace count went negative from line {function_start} ({excess} unmatched closing braces)")]
    BraceUnderflow { function_start: usize, excess: usize },
}

impl InstrumentError {
    /// True for internal inconsistencies that should never happen on valid input.
    pub fn is_defect(&self) -> bool {
        matches!(self, InstrumentError::BraceUnderflow { .. })
    }
}

/// Failure to load [`crate::InstrumentOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_brace_underflow_is_a_defect() {
        assert!(InstrumentError::BraceUnderflow {
            function_start: 0,
            excess: 1
        }
        .is_defect());
        assert!(!InstrumentError::GlobalScope { line: 3 }.is_defect());
        assert!(!InstrumentError::NoMatch { line: 3 }.is_defect());
        assert!(!InstrumentError::UnresolvedType { name: "x".into() }.is_defect());
    }

    #[test]
    fn test_messages_name_the_line() {
        let msg = InstrumentError::NoMatch { line: 12 }.to_string();
        assert!(msg.contains("12"));
    }
}
