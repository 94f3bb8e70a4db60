//! CLI command implementations

pub(crate) mod common;
pub(crate) mod create;
pub(crate) mod down;
pub(crate) mod history;
pub(crate) mod mark;
pub(crate) mod new;
pub(crate) mod redo;
pub(crate) mod to;
pub(crate) mod up;
