//! Flat-file output.
//!
//! One UTF-8 CSV file per run, overwritten each time, with a header row:
//!
//! ```text
//! postText,postDate,comments
//! "Vends vélo…",2025-06-06T10:30:00,"Dispo ?, Je prends"
//! ```
//!
//! Comments are joined into one cell with `", "`. Commenters are not part of
//! the flat file; they only go to the document store.

use crate::error::SinkWriteError;
use crate::models::NormalizedPost;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Separator between comments inside the `comments` cell.
pub const COMMENT_SEPARATOR: &str = ", ";

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "postText")]
    post_text: &'a str,
    #[serde(rename = "postDate")]
    post_date: String,
    comments: String,
}

/// Render posts as CSV bytes, header included.
pub fn render_csv(posts: &[NormalizedPost]) -> Result<Vec<u8>, SinkWriteError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for post in posts {
        writer.serialize(CsvRow {
            post_text: &post.post_text,
            post_date: post.post_date.to_string(),
            comments: post.comments.join(COMMENT_SEPARATOR),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| SinkWriteError::Io(e.into_error()))
}

/// Write posts to `path`, replacing any previous file.
///
/// # Arguments
///
/// * `posts` - Posts to write, one row each, in order.
/// * `path` - Target file; its directory must already exist.
///
/// # Returns
///
/// The number of data rows written (the header is not counted).
///
/// # Errors
///
/// [`SinkWriteError::Csv`] if a row cannot be serialized, or
/// [`SinkWriteError::Io`] if the file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_csv(posts: &[NormalizedPost], path: &Path) -> Result<usize, SinkWriteError> {
    let bytes = render_csv(posts)?;
    fs::write(path, bytes).await?;
    info!(rows = posts.len(), "CSV file created");
    Ok(posts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostDate, RawPost};
    use chrono::NaiveDate;

    fn post(text: &str, date: PostDate, comments: &[&str]) -> NormalizedPost {
        NormalizedPost::from_raw(
            RawPost {
                text: text.to_string(),
                raw_date: String::new(),
                comments: comments.iter().map(|c| c.to_string()).collect(),
                commenters: vec!["Hidden Commenter".to_string()],
            },
            date,
        )
    }

    #[test]
    fn test_header_and_rows() {
        let at = NaiveDate::from_ymd_opt(2025, 6, 6)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let posts = vec![
            post("Vends vélo de course", PostDate::Instant(at), &["Dispo ?", "Je prends"]),
            post("Cherche colocation", PostDate::Raw("Hier".to_string()), &[]),
        ];

        let csv = String::from_utf8(render_csv(&posts).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "postText,postDate,comments");
        assert_eq!(
            lines[1],
            "Vends vélo de course,2025-06-06T10:30:00,\"Dispo ?, Je prends\""
        );
        assert_eq!(lines[2], "Cherche colocation,Hier,");
        assert!(!csv.contains("Hidden Commenter"));
    }

    #[test]
    fn test_multiline_text_is_quoted() {
        let posts = vec![post("ligne 1\nligne \"2\"", PostDate::Raw(String::new()), &[])];
        let csv = String::from_utf8(render_csv(&posts).unwrap()).unwrap();
        assert!(csv.contains("\"ligne 1\nligne \"\"2\"\"\""));
    }

    #[tokio::test]
    async fn test_write_csv_to_disk() {
        let path = std::env::temp_dir().join(format!("gfc_csv_{}.csv", std::process::id()));
        let posts = vec![post("Un message assez long", PostDate::Raw("2h".into()), &["ok"])];

        let rows = write_csv(&posts, &path).await.unwrap();
        assert_eq!(rows, 1);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("postText,postDate,comments\n"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_write_csv_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("gfc_definitely_missing_dir")
            .join("nested")
            .join("posts.csv");
        let result = write_csv(&[], &path).await;
        assert!(matches!(result, Err(SinkWriteError::Io(_))));
    }
}
