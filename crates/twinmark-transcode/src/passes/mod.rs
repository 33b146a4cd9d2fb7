//! Individual transcoding passes, in the order the transcoder runs them.

mod attributes;
mod blocks;
mod callouts;
mod embeds;
mod inline;
mod links;
mod styles;
mod whitespace;

pub(crate) use attributes::{remove_unsafe, strip_final_attributes, strip_host_attributes};
pub(crate) use blocks::{replace_code_blocks, replace_figures};
pub(crate) use callouts::convert_callouts;
pub(crate) use embeds::materialize_embeds;
pub(crate) use inline::{apply_typography, normalize_strikethrough};
pub(crate) use links::validate_urls;
pub(crate) use styles::apply_styles;
pub(crate) use whitespace::trim_block_text;
