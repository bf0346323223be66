//! Rendering module: serialization, the document shell, and options.

mod options;
mod result;
mod serialize;
mod template;

pub use options::{Preset, TranscodeOptions};
pub use result::{TranscodeResult, TranscodeStats};
pub use serialize::{escape_text, serialize_children, serialize_node};
pub use template::{wrap_document, GENERATOR, WRAPPER_CLASS};
