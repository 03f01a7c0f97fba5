//! Shader debug instrumentation.
//!
//! GPU shading pipelines have no breakpoints, so this crate rewrites a
//! Shadertoy-style GLSL shader such that the per-pixel output color shows the
//! runtime value of the variable assigned or declared on a chosen line.
//!
//! ```text
//! source → parser (lines, statements, signatures)
//!        → analysis (functions, loops, braces)
//!        → codegen (visualization, shadows, wrappers, loop caps)
//!        → debugger::Instrumenter (orchestration)
//!        → server (framed JSON transport for editors)
//! ```
//!
//! The engine is a pure function of its inputs: every call derives its state
//! fresh and returns a new source string, or nothing when the line has no
//! visualizable value.

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod debugger;
pub mod error;
pub mod parser;
pub mod server;

pub use config::InstrumentOptions;
pub use debugger::{instrument, DebugTarget, Instrumenter, LoopCaps};
pub use error::{ConfigError, InstrumentError};
