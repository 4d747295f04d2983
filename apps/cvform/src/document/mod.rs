// Phase 4: Document assembly. FormState → DocumentTree for the renderer, plus the
// HTML preview built from the same ordering rules.

pub mod assembler;
pub mod preview;
pub mod styles;
pub mod tree;

pub use assembler::assemble;
pub use preview::render_preview;
pub use tree::{Block, DocumentTree, StyleName};
