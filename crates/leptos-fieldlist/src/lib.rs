//! Leptos Field List
//!
//! Add/remove controls for repeatable form field lists rendered by the server.
//! Each list is a `<ul>` of `<li>` rows whose `id`/`for`/`name` attributes carry
//! the row index; adding and removing rows keeps those indices `0..len` so the
//! server can bind every row back to its position.
//!
//! The row model (`model`, `ident`) has no DOM dependency; `dom` binds it to
//! the document and mounts the controls with Leptos.

mod dom;
mod ident;
mod model;
mod options;

pub use dom::{attach_all, attach_when_ready, DomRow, ADD_CONTROL_CLASS, ATTACHED_ATTRIBUTE, REMOVE_CONTROL_CLASS};
pub use ident::IndexPrefix;
pub use model::{ControlId, ControlIds, ControlSlots, FieldList, FieldListError, RowNode};
pub use options::FieldListOptions;
