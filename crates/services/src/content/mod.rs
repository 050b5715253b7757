//! Fetching module documents and keeping their prepared fragments.

mod cache;
mod source;

pub use cache::ContentCache;
pub use source::{ContentSource, HttpContentSource};
