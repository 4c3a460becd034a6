//! Instagram post retrieval.
//!
//! Validates inbound links, extracts post shortcodes, and downloads the media
//! of public posts through the web GraphQL endpoint. [`MediaFetcher`] is the
//! seam the relay workflow depends on; [`InstagramClient`] implements it.

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod link;
mod model;

pub use {
    client::InstagramClient,
    config::InstagramConfig,
    error::{Error, FetchError, Result},
    fetcher::{FetchSummary, MediaFetcher},
    link::{INSTAGRAM_DOMAIN, Shortcode, extract_shortcode, is_instagram_link},
};
