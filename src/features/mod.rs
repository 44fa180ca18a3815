//! Feature implementations for ocr-labeler.
//!
//! - Review: the one-image-at-a-time labeling workflow

pub mod review;
