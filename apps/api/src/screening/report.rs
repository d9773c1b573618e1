//! Report compilation and persistence.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::errors::ScreenError;
use crate::screening::matcher::MatchResult;

/// Improvement bullets shown in a report.
const MAX_IMPROVEMENTS: usize = 3;

/// Renders the report text. Pure: the same inputs always give the same text.
///
/// A recorded error wins over any match data.
pub fn compile_report(result: &MatchResult, error: Option<&str>) -> String {
    if let Some(error) = error {
        return failure_report(error);
    }

    let improvements: Vec<String> = result
        .suggestions
        .iter()
        .take(MAX_IMPROVEMENTS)
        .map(|s| format!("- {s}"))
        .collect();

    format!(
        "Resume Analysis Report\n\
         \n\
         Match Score: {score}%\n\
         \n\
         Missing Skills: {missing_count}\n\
         -> {missing}\n\
         \n\
         Improvements:\n\
         {improvements}\n",
        score = result.match_score,
        missing_count = result.missing_skills.len(),
        missing = result.missing_skills.join(", "),
        improvements = improvements.join("\n"),
    )
}

pub fn failure_report(error: &str) -> String {
    format!("# Analysis Failed\n\nReason: {error}")
}

/// Writes reports as timestamped markdown files under one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists `report`, creating the directory if needed. Two writes within the
    /// same second share a file name; the later one wins.
    pub fn persist(&self, report: &str) -> Result<PathBuf, ScreenError> {
        std::fs::create_dir_all(&self.dir)?;
        let file_name = format!("report_{}.md", Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(file_name);
        std::fs::write(&path, report)?;
        info!("Report saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        MatchResult {
            match_score: 68,
            matching_skills: vec!["Python".into(), "Django".into()],
            missing_skills: vec!["React".into(), "Docker".into()],
            suggestions: vec![
                "Add a React project".into(),
                "Mention Docker usage".into(),
                "Quantify Django work".into(),
                "Fix typos".into(),
            ],
        }
    }

    #[test]
    fn test_report_lists_score_gaps_and_top_three() {
        let report = compile_report(&sample(), None);
        assert!(report.starts_with("Resume Analysis Report"));
        assert!(report.contains("Match Score: 68%"));
        assert!(report.contains("Missing Skills: 2\n-> React, Docker"));
        assert!(report.contains("- Add a React project\n- Mention Docker usage\n- Quantify Django work"));
        assert!(!report.contains("Fix typos"));
    }

    #[test]
    fn test_error_takes_precedence_over_match_data() {
        let report = compile_report(&sample(), Some("no resume file or text provided"));
        assert_eq!(
            report,
            "# Analysis Failed\n\nReason: no resume file or text provided"
        );
        assert!(!report.contains("68"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let result = sample();
        assert_eq!(compile_report(&result, None), compile_report(&result, None));
    }

    #[test]
    fn test_default_result_renders_zero_report() {
        let report = compile_report(&MatchResult::default(), None);
        assert!(report.contains("Match Score: 0%"));
        assert!(report.contains("Missing Skills: 0"));
    }

    #[test]
    fn test_persist_creates_directory_and_file() {
        let root = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(root.path().join("nested").join("reports"));

        let path = writer.persist("hello report").unwrap();

        assert!(path.starts_with(writer.dir()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("report_") && name.ends_with(".md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
    }
}
