//! Local media handling: classify downloaded files by kind and own the
//! per-request scratch directory they are downloaded into.

pub mod classify;
pub mod error;
pub mod scratch;

pub use {
    classify::{ClassifiedFile, MediaKind, classify_dir, classify_name},
    error::{Error, Result},
    scratch::ScratchDir,
};
