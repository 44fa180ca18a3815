//! JSON output formatting for ocr-labeler.
//!
//! Field names follow what scripts built around `labels.txt` expect:
//! `total`/`processed`/`remaining` for progress and `image_name`/`text`
//! for labels.

use serde::Serialize;
use serde_json::json;

use crate::core::{Extraction, Label, NextImage, Progress};
use crate::error::LabelerError;
use crate::features::review::SessionSummary;
use crate::images::Overview;

fn progress_json(progress: Progress) -> serde_json::Value {
    json!({
        "total": progress.total,
        "processed": progress.processed,
        "remaining": progress.remaining(),
    })
}

/// Format progress and the image list as JSON
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_overview_json(overview: &Overview) -> Result<String, LabelerError> {
    let mut output = progress_json(overview.progress);
    output["images"] = serde_json::to_value(&overview.images)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the next image as JSON
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_next_json(next: &NextImage) -> Result<String, LabelerError> {
    let output = match next {
        NextImage::Ready { image, progress } => json!({
            "image_name": image.id,
            "image_url": image.source_uri,
            "progress": progress_json(*progress),
            "done": false,
        }),
        NextImage::Exhausted { progress } => json!({
            "image_name": null,
            "message": "All images have been processed",
            "progress": progress_json(*progress),
            "done": true,
        }),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format saved labels as JSON
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_labels_json(labels: &[Label]) -> Result<String, LabelerError> {
    let items: Vec<_> = labels
        .iter()
        .map(|label| json!({ "image_name": label.image, "text": label.text }))
        .collect();
    let output = json!({
        "count": labels.len(),
        "labels": items,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format an extraction result as JSON
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_extraction_json(
    image: &str,
    extraction: &Extraction,
) -> Result<String, LabelerError> {
    let output = json!({
        "image_name": image,
        "success": extraction.success,
        "text": extraction.text,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a session summary as JSON
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn format_summary_json(summary: &SessionSummary) -> Result<String, LabelerError> {
    to_json(summary)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `LabelerError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, LabelerError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::ImageRef;
    use crate::images::ImageStatus;

    #[test]
    fn test_format_overview_json() {
        let overview = Overview {
            progress: Progress::new(1, 2),
            images: vec![
                ImageStatus {
                    name: "a.png".to_string(),
                    path: PathBuf::from("/img/a.png"),
                    labeled: true,
                },
                ImageStatus {
                    name: "b.png".to_string(),
                    path: PathBuf::from("/img/b.png"),
                    labeled: false,
                },
            ],
        };

        let value: serde_json::Value =
            serde_json::from_str(&format_overview_json(&overview).unwrap()).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["processed"], 1);
        assert_eq!(value["remaining"], 1);
        assert_eq!(value["images"][1]["name"], "b.png");
        assert_eq!(value["images"][0]["labeled"], true);
    }

    #[test]
    fn test_format_next_json() {
        let ready = NextImage::Ready {
            image: ImageRef {
                id: "img2.png".to_string(),
                source_uri: "/img/img2.png".to_string(),
            },
            progress: Progress::new(1, 3),
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_next_json(&ready).unwrap()).unwrap();
        assert_eq!(value["image_name"], "img2.png");
        assert_eq!(value["done"], false);
        assert_eq!(value["progress"]["remaining"], 2);

        let done = NextImage::Exhausted {
            progress: Progress::new(3, 3),
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_next_json(&done).unwrap()).unwrap();
        assert!(value["image_name"].is_null());
        assert_eq!(value["done"], true);
    }

    #[test]
    fn test_format_labels_json() {
        let labels = vec![Label {
            image: "a.png".to_string(),
            text: "Hello World".to_string(),
        }];
        let value: serde_json::Value =
            serde_json::from_str(&format_labels_json(&labels).unwrap()).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["labels"][0]["image_name"], "a.png");
        assert_eq!(value["labels"][0]["text"], "Hello World");
    }

    #[test]
    fn test_format_summary_json() {
        let summary = SessionSummary {
            saved: 2,
            skipped: 1,
            elapsed_seconds: 90,
            progress: Progress::new(5, 5),
            finished: true,
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_summary_json(&summary).unwrap()).unwrap();
        assert_eq!(value["saved"], 2);
        assert_eq!(value["finished"], true);
        assert_eq!(value["progress"]["total"], 5);
    }
}
