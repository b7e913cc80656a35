//! The scrape pipeline.
//!
//! Stages, each a plain function over the previous stage's output:
//! - [`extract`] - pick the main content fragment out of the page
//! - [`split`] - cut the fragment into ordered sections
//! - [`transform`] - rewrite each section through the completion model
//! - [`assemble`] - join the results into one document
//!
//! [`Pipeline`] drives them for one job and hands the document to a sink.

pub mod assemble;
pub mod extract;
pub mod orchestrator;
pub mod prompts;
pub mod split;
pub mod transform;

pub use assemble::{assemble_document, SECTION_SEPARATOR};
pub use extract::extract_main_content;
pub use orchestrator::Pipeline;
pub use prompts::{format_section_prompt, SECTION_PROMPT};
pub use split::split_content;
pub use transform::{
    fallback_block, strip_code_fence, transform_section, transform_sections, ERROR_MARKER,
};
