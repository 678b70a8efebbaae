pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{join_base, validate_base_url};
