use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::repository::{AssessmentLog, AssessmentLogError, AssessmentRecord};

const HEADER: [&str; 5] = [
    "Timestamp",
    "Email",
    "Stress Score",
    "ML Prediction",
    "Summary",
];

/// Longest summary excerpt written to a log row, in characters.
const SUMMARY_LIMIT: usize = 500;

/// Appends one CSV row per assessment, writing the header when the file is new.
#[derive(Debug)]
pub struct CsvAssessmentLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvAssessmentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssessmentLog for CsvAssessmentLog {
    fn append(&self, email: &str, record: &AssessmentRecord) -> Result<(), AssessmentLogError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let is_new = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            writer.write_record(HEADER)?;
        }

        let timestamp = record.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let score = record.stress_score.to_string();
        writer.write_record([
            timestamp.as_str(),
            email,
            score.as_str(),
            record.recommendation.category.label(),
            summary_excerpt(&record.summary.text).as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

fn summary_excerpt(text: &str) -> String {
    text.chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(SUMMARY_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn writes_header_once_and_flattens_summaries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = CsvAssessmentLog::new(dir.path().join("assessment_logs.csv"));

        let mut first = sample_record(1, 7);
        first.summary.text = "line one\nline two\r\nline three".to_string();
        log.append("ada@example.com", &first).expect("first row");
        log.append("ada@example.com", &sample_record(2, 7))
            .expect("second row");

        let mut reader = csv::Reader::from_path(log.path()).expect("log readable");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("rows parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "ada@example.com");
        assert_eq!(&rows[0][3], "Meditation");
        assert_eq!(&rows[0][4], "line one line two  line three");
    }

    #[test]
    fn long_summaries_are_truncated() {
        let long = "é".repeat(SUMMARY_LIMIT + 20);
        assert_eq!(summary_excerpt(&long).chars().count(), SUMMARY_LIMIT);
    }
}
