//! Storage for the comma-separated cell file format and Markdown export

mod codec;
mod md;

pub use codec::{
    LoadSummary, parse_sheet_content, read_sheet, write_sheet, write_sheet_content,
};
pub use md::{write_markdown, write_markdown_content};
