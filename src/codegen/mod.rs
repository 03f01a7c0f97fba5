//! Source generation: visualization expressions, default inputs, shadows,
//! loop caps and the two ways of surfacing a value (in place inside the
//! entry point, or through a synthetic entry point that calls the function).
//!
//! Generators never mutate their input; each returns a fresh line sequence.

mod defaults;
mod edits;
mod inplace;
mod loop_caps;
mod shadow;
mod visualize;
mod wrap;

pub use defaults::{zero_literal, DefaultValueProvider, TypeDefaults};
pub use edits::LineEdits;
pub use inplace::{instrument_entry_point, output_var_of};
pub use loop_caps::{cap_loop_iterations, counter_name, LoopCaps};
pub use shadow::{insert_shadow_variable, shadow_assignment, shadow_declaration, shadow_name};
pub use visualize::{
    color_expression, return_statement_for_var, visualization_rule, TypeVisualizationRule,
    UNSUPPORTED_COLOR,
};
pub use wrap::{
    choose_surfacing, generate_default_parameters, wrap_function_for_debugging,
    wrap_one_liner_for_debugging, DebugCall, Surfacing,
};

/// Rewritten source plus where the debugged function's header now sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub lines: Vec<String>,
    pub function_start: usize,
}
