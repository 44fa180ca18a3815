//! Core abstractions for ocr-labeler.
//!
//! This module provides the collaborator contracts shared by the review
//! controller and its adapters.

mod natural;
mod traits;

pub use natural::{natural_cmp, natural_key, Chunk};
pub use traits::{
    Extraction, ExtractionService, ImageRef, ImageSource, Label, LabelStore, NextImage, Progress,
    StoreReceipt,
};

#[cfg(test)]
pub use traits::{MockExtractionService, MockImageSource, MockLabelStore};
