//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files.
//!
//! Template loading chain:
//! 1. Configured override directory `{dir}/{name}.pmt`
//! 2. `prompts/{name}.pmt` in the working directory
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution, with HTML
//! escaping turned off.

pub mod embedded;
mod loader;

pub use loader::{ItineraryContext, PromptLoader};
