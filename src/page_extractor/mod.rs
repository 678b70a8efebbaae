//! Page content extraction
//!
//! In-page scripts live in `js_scripts`; `content` turns a body snapshot into
//! `PageContent`.

pub mod content;
pub mod js_scripts;

pub use content::{
    CodeBlock, ExtractOptions, PageContent, Section, Table, extract_page_content,
    parse_page_content, try_extract, wait_for_render,
};
