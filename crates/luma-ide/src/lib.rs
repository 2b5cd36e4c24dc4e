//! Editor-facing features on top of the parser: function folding regions,
//! the outline derived from them, the background reparse pipeline that keeps
//! both up to date, and an LSP server exposing them.

pub mod folding;
pub mod outline;
pub mod reparse;
mod server;

pub use folding::{FoldRegion, extract, fold_regions};
pub use outline::{OutlineEntry, caret_offset, outline};
pub use reparse::{FoldSink, FoldUpdate, ReparseConfig, Reparser, Sinks};
pub use server::Server;
