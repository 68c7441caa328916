pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{excerpt, normalize_whitespace, safe_truncate_boundary};
pub use url_utils::{UrlNormalizer, is_valid_url, last_segment_slug, page_slug, path_slug};
