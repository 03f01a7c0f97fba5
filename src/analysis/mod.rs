//! Structural analysis of shader source: function boundaries, loop nesting
//! and brace balance. Everything here works on raw lines and masks comments
//! itself.

mod braces;
mod functions;
mod loops;

pub use braces::{close_open_braces, find_matching_close, open_brace_count};
pub use functions::{
    find_enclosing_function, find_function_by_name, is_entry_point, last_return,
};
pub use loops::{find_enclosing_loops, find_loops};
