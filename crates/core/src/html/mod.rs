//! Small HTML helpers for module documents: region extraction and asset
//! reference rewriting. Neither builds a DOM; both work on tag spans.

mod assets;
mod region;
mod scan;

pub use assets::{AssetRewriter, TOKEN_PARAM, append_token, as_directory};
pub use region::{CONTENT_REGION, Fragment, FragmentSource, extract_content};
