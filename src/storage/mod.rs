//! Label persistence.
//!
//! Two backends implement [`LabelStore`](crate::core::LabelStore):
//! - [`LabelsFile`] - append-only `labels.txt`
//! - [`SqliteLabelStore`] - `SQLite` table with one row per image

mod database;
mod migrations;
mod sqlite;
mod text_file;

pub use database::Database;
pub use sqlite::SqliteLabelStore;
pub use text_file::{parse_labels, LabelsFile};

/// Collapse every whitespace run to a single space and trim the ends.
#[must_use]
pub fn normalize_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Hello\n\tWorld  "), "Hello World");
        assert_eq!(normalize_label(" \n "), "");
        assert_eq!(normalize_label("one"), "one");
    }
}
