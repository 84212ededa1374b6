mod components;
mod view;

pub use view::{FieldRow, Notice, UiContext, draw};
