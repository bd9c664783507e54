//! Rendering of parsed documents into their final output.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{apply_note_policy, to_text};
