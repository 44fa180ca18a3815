//! ocr-labeler - human-in-the-loop OCR labeling
//!
//! This crate walks a directory of images, proposes text for each one with an
//! external OCR program, and records the reviewer's corrected text as a label.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extraction;
pub mod features;
pub mod images;
pub mod logging;
pub mod output;
pub mod storage;
pub mod tui;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::LabelerError;
pub use features::review::WorkflowController;
