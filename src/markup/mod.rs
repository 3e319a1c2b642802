//! Positional table rewriting over raw markup text.
//!
//! Everything in this module works on the markup as a string. Elements
//! are located by byte search, never built into a tree, so untouched
//! regions survive byte for byte: attribute order, namespace quirks,
//! insignificant whitespace, and producer-specific oddities all come out
//! exactly as they went in. That matters because HWPX consumers are
//! pickier about their own output than the XML standard would suggest.
//!
//! The entry point is [`TableEditor`], which addresses cells as
//! `(table, row, cell)` index triples and edits them through the shape
//! rules in [`CellShape`]. [`SignatureLine`] covers the one edit that
//! lives outside any table.

mod cell;
mod editor;
mod segment;
mod signature;
mod tags;

pub use cell::CellShape;
pub use editor::{CellAddress, CellEdit, TableEditor};
pub use signature::SignatureLine;
pub use tags::{Tag, TagSet};
