pub mod classifier;
pub mod preprocessor;
pub mod signature;
pub mod tokens;
pub mod types;

pub use classifier::{classify, match_statement, try_classify, Candidate, Classification};
pub use preprocessor::{indent_of, mask_comments, resolve_target_line, statement_at};
pub use signature::{header_start_for_brace, parse_signature};
pub use tokens::{normalize_whitespace, split_top_level};
pub use types::{
    FunctionSignature, LoopSite, ParamMode, Parameter, Qualifier, ShaderType, SourceLines,
    Statement, VarInfo,
};
