//! Page loader implementations.
//!
//! - `HttpLoader` - plain HTTP GET
//! - `FirecrawlLoader` - headless rendering via Firecrawl (requires `firecrawl` feature)
//!
//! Tests use `MockLoader` from [`crate::testing`].

mod http;

#[cfg(feature = "firecrawl")]
mod firecrawl;

pub use http::HttpLoader;

#[cfg(feature = "firecrawl")]
pub use firecrawl::FirecrawlLoader;

pub use crate::traits::loader::{LoadOptions, PageLoader, RawPage, WaitUntil};
