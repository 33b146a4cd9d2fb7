//! CLI command implementations.

pub(crate) mod diff;
pub(crate) mod render;

pub(crate) use diff::DiffArgs;
pub(crate) use render::RenderArgs;
