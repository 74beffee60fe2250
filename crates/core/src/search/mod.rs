//! Video search.
//!
//! This module provides a `Searcher` trait over the platform's search
//! API. Search never fails outward: any error or empty result set
//! yields a single fixed placeholder hit, so clients always have at
//! least one row to show.

mod types;
mod youtube;

pub use types::*;
pub use youtube::YoutubeSearcher;
