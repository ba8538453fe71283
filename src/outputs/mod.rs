//! Artifacts written by a crawl and read back by the analysis commands.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 마이데이터_urls_2023-07-01_2023-07-30.txt      # URL sidecar, one per line
//! └── 마이데이터_articles_2023-07-01_2023-07-30.json # ArticleCollection
//! ```

pub mod json;
pub mod sidecar;

use crate::models::{DateRange, ISO_DATE_FORMAT};
use crate::utils::file_component;

/// `{keyword}_{kind}_{start}_{end}.{ext}` with dates as `YYYY-MM-DD`.
pub(crate) fn artifact_name(keyword: &str, kind: &str, range: DateRange, ext: &str) -> String {
    format!(
        "{}_{}_{}_{}.{}",
        file_component(keyword),
        kind,
        range.start().format(ISO_DATE_FORMAT),
        range.end().format(ISO_DATE_FORMAT),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name() {
        let range = DateRange::parse("2017.06.19", "2023-07-30").unwrap();
        assert_eq!(
            artifact_name("마이데이터", "urls", range, "txt"),
            "마이데이터_urls_2017-06-19_2023-07-30.txt"
        );
    }
}
