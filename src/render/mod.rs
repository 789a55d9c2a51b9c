//! Comment-command rendering.
//!
//! # Module Structure
//!
//! ```text
//! render/
//! ├── command.rs   # Token grammar and scanner
//! ├── engine.rs    # Renderer: scan, resolve in parallel, splice
//! ├── dispatch.rs  # TEMPLATE / EVAL / pass-through
//! ├── eval.rs      # Evaluator registry and expression parsing
//! └── error.rs     # RenderError
//! ```

pub mod command;
mod dispatch;
mod engine;
mod error;
mod eval;

pub use dispatch::names;
pub use engine::{DEFAULT_MAX_DEPTH, Renderer};
pub use error::RenderError;
pub use eval::{EvalContext, Evaluators};
