use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ocr-labeler")]
#[command(about = "Review and correct OCR output one image at a time")]
#[command(long_about = "ocr-labeler - human-in-the-loop OCR labeling

Walks a directory of images in natural order. For each unlabeled image it
runs an OCR program, shows the proposed text, and lets you correct it before
appending `<image> <text>` to labels.txt (or a SQLite database).

QUICK START:
  ocr-labeler review                 Start labeling ./images
  ocr-labeler --images scans review  Label a different directory
  ocr-labeler images                 Show progress
  ocr-labeler labels -o json         Export saved labels

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  ocr-labeler <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Configuration file (default: ~/.ocr-labeler/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of images to label, overriding the config file
    #[arg(long, global = true, env = "OCR_LABELER_IMAGES", value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Labels file (or database) to write, overriding the config file
    #[arg(long, global = true, env = "OCR_LABELER_LABELS", value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Also write log lines to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Label images interactively
    ///
    /// Opens the review screen on the first unlabeled image. Extraction runs
    /// automatically; correct the text and press Enter to save it and move on.
    ///
    /// # Keys
    ///
    ///   Enter / Ctrl-S    Save the corrected text
    ///   Tab / Ctrl-N      Skip this image
    ///   Ctrl-R            Run extraction again
    ///   Ctrl-L            Load the next image (after a load failure)
    ///   Ctrl-U            Clear the text
    ///   Esc / Ctrl-C      Quit
    ///
    /// A summary of the session is printed on exit.
    #[command(alias = "r")]
    Review,

    /// Show labeling progress and the image list
    ///
    /// # Examples
    ///
    ///   ocr-labeler images            Progress plus every image
    ///   ocr-labeler status -o json    Short alias, JSON output
    #[command(alias = "status")]
    Images,

    /// Show the next image waiting for a label
    Next,

    /// List saved labels
    Labels,

    /// Run extraction on a single image
    ///
    /// The image is looked up in the images directory unless a path to an
    /// existing file is given.
    Extract {
        /// Image file name (or path)
        image: String,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell.
    /// Redirect to a file or source directly.
    ///
    /// Example: ocr-labeler completions bash > ~/.bash_completion.d/ocr-labeler
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Show installation instructions
        #[arg(long, short = 'i')]
        install: bool,
    },
}
