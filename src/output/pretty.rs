use colored::Colorize;

use crate::core::{Extraction, Label, NextImage, Progress};
use crate::features::review::SessionSummary;
use crate::images::Overview;

fn progress_line(progress: Progress) -> String {
    format!(
        "{} / {} labeled ({:.0}%), {} remaining",
        progress.processed.to_string().bold(),
        progress.total,
        progress.percent(),
        progress.remaining()
    )
}

/// Format progress and the image list as pretty output
pub fn format_overview_pretty(overview: &Overview) -> String {
    let mut output = format!("Images ({})\n", overview.images.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    if overview.images.is_empty() {
        output.push_str("  No images\n");
    }

    for image in &overview.images {
        let icon = if image.labeled {
            "[x]".green()
        } else {
            "[ ]".white()
        };
        output.push_str(&format!("{icon} {}\n", image.name));
    }

    output.push_str(&"─".repeat(60));
    output.push('\n');
    output.push_str(&progress_line(overview.progress));
    output
}

/// Format the next image as pretty output
pub fn format_next_pretty(next: &NextImage) -> String {
    match next {
        NextImage::Ready { image, progress } => format!(
            "{} {}\n  {}: {}\n  {}",
            "Next:".cyan().bold(),
            image.id.bold(),
            "Path".dimmed(),
            image.source_uri,
            progress_line(*progress)
        ),
        NextImage::Exhausted { progress } => format!(
            "{}\n  {}",
            "All images have been processed.".green().bold(),
            progress_line(*progress)
        ),
    }
}

/// Format saved labels as pretty output
pub fn format_labels_pretty(labels: &[Label]) -> String {
    if labels.is_empty() {
        return "Labels (0)\n  No labels".to_string();
    }

    let width = labels.iter().map(|l| l.image.len()).max().unwrap_or(0);

    let mut output = format!("Labels ({})\n", labels.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for label in labels {
        output.push_str(&format!(
            "{:<width$}  {}\n",
            label.image.dimmed(),
            label.text
        ));
    }

    output
}

/// Format an extraction result as pretty output
pub fn format_extraction_pretty(image: &str, extraction: &Extraction) -> String {
    if !extraction.success {
        return format!("{} {}: extraction failed", "[-]".red(), image.bold());
    }
    if extraction.text.is_empty() {
        return format!(
            "{} {}: {}",
            "[ ]".yellow(),
            image.bold(),
            "No text detected in this image.".dimmed()
        );
    }
    format!("{} {}: {}", "[x]".green(), image.bold(), extraction.text)
}

/// Format a session summary as pretty output
pub fn format_summary_pretty(summary: &SessionSummary) -> String {
    let minutes = summary.elapsed_seconds / 60;
    let seconds = summary.elapsed_seconds % 60;

    let mut output = if summary.finished {
        format!("{}\n", "All done! No more images to review.".green().bold())
    } else {
        format!("{}\n", "Review session ended.".bold())
    };
    output.push_str(&format!(
        "  {}: {}\n  {}: {}\n  {}: {minutes}m {seconds:02}s\n  {}",
        "Saved".dimmed(),
        summary.saved.to_string().green(),
        "Skipped".dimmed(),
        summary.skipped.to_string().yellow(),
        "Time".dimmed(),
        progress_line(summary.progress)
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ImageRef;

    #[test]
    fn test_format_labels_pretty_empty() {
        assert!(format_labels_pretty(&[]).contains("No labels"));
    }

    #[test]
    fn test_format_labels_pretty() {
        colored::control::set_override(false);
        let labels = vec![
            Label {
                image: "a.png".to_string(),
                text: "Hello".to_string(),
            },
            Label {
                image: "long_name.png".to_string(),
                text: "World".to_string(),
            },
        ];
        let output = format_labels_pretty(&labels);
        assert!(output.starts_with("Labels (2)"));
        assert!(output.contains("a.png          Hello"));
        assert!(output.contains("long_name.png  World"));
    }

    #[test]
    fn test_format_next_pretty() {
        colored::control::set_override(false);
        let next = NextImage::Ready {
            image: ImageRef {
                id: "img2.png".to_string(),
                source_uri: "/img/img2.png".to_string(),
            },
            progress: Progress::new(1, 4),
        };
        let output = format_next_pretty(&next);
        assert!(output.contains("img2.png"));
        assert!(output.contains("1 / 4 labeled (25%), 3 remaining"));

        let done = format_next_pretty(&NextImage::Exhausted {
            progress: Progress::new(4, 4),
        });
        assert!(done.contains("All images have been processed."));
    }

    #[test]
    fn test_format_extraction_pretty() {
        colored::control::set_override(false);
        assert!(format_extraction_pretty("a.png", &Extraction::found("Hi")).ends_with("a.png: Hi"));
        assert!(format_extraction_pretty("a.png", &Extraction::found("")).contains("No text"));
        assert!(format_extraction_pretty("a.png", &Extraction::failed()).contains("failed"));
    }

    #[test]
    fn test_format_summary_pretty() {
        colored::control::set_override(false);
        let summary = SessionSummary {
            saved: 3,
            skipped: 1,
            elapsed_seconds: 125,
            progress: Progress::new(3, 10),
            finished: false,
        };
        let output = format_summary_pretty(&summary);
        assert!(output.contains("Review session ended."));
        assert!(output.contains("Saved: 3"));
        assert!(output.contains("2m 05s"));
    }
}
