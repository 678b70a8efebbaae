//! Browser capability: the page/backend traits, the Chrome implementation
//! and the load helpers built on them.

pub mod chrome;
pub mod driver;
pub mod page_helpers;
pub mod page_timeout;
pub mod profile;
pub mod safe_navigate;
pub mod setup;

pub use chrome::{ChromeBackend, ChromePage};
pub use driver::{BrowserBackend, LoadState, PageDriver};
pub use page_timeout::with_page_timeout;
pub use safe_navigate::{NavigationTiming, safe_navigate};
