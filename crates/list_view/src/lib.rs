pub mod controller;
pub mod ui;

pub use controller::{
    events::{DeleteOutcome, EventOutcome, Key, ViewEvent},
    orchestration::{AlwaysConfirm, Confirmer, ListViewController, LoadOutcome, DELETE_PROMPT},
    reducer::QueryState,
};
pub use ui::document::{HtmlDocument, ListView};
