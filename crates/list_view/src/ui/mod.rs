//! Rendering of the config table, the pagination controls and the list fragment.

pub mod document;
pub mod pagination;
pub mod table;
