//! Pre-flight input validation
//!
//! Everything here runs before any external call: course identity checks and
//! per-stage CSV header validation against the fixed column schemas.

use crate::errors::{PipelineError, Result};
use crate::pipeline::state::Stage;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Columns required in a feedback CSV
pub const FEEDBACK_COLUMNS: [&str; 8] = [
    "student_id",
    "course",
    "course_content",
    "lecture_delivery",
    "teaching_materials",
    "practicals",
    "assessment",
    "text_feedback",
];

/// Columns required in a performance CSV
pub const PERFORMANCE_COLUMNS: [&str; 9] = [
    "student_id",
    "student_name",
    "course",
    "marks_obtained",
    "total_marks",
    "grade",
    "grade_points",
    "attendance_percentage",
    "semester",
];

/// Columns required in a job-trends CSV
pub const TREND_COLUMNS: [&str; 6] = [
    "job_title",
    "required_skills",
    "salary_usd",
    "experience_level",
    "industry",
    "salary_bucket",
];

/// Course identities allow word characters, spaces and hyphens
pub fn validate_course_name(course: &str) -> Result<()> {
    let valid = !course.trim().is_empty()
        && course
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ');

    if valid {
        Ok(())
    } else {
        Err(PipelineError::Validation(
            "Course name contains invalid characters".to_string(),
        ))
    }
}

/// Required header columns for a stage's CSV input, if it takes one
pub fn required_columns(stage: Stage) -> Option<&'static [&'static str]> {
    match stage {
        Stage::Feedback => Some(&FEEDBACK_COLUMNS),
        Stage::Performance => Some(&PERFORMANCE_COLUMNS),
        Stage::Trend => Some(&TREND_COLUMNS),
        Stage::Recommendation | Stage::Report => None,
    }
}

/// Check a CSV header against the stage's required column set.
///
/// Extra columns are tolerated; missing ones are a validation failure, not a
/// crash. Stages without a CSV input accept any path.
pub fn validate_csv_schema(stage: Stage, path: &Path) -> Result<()> {
    let Some(required) = required_columns(stage) else {
        return Ok(());
    };

    let file = File::open(path).map_err(|e| PipelineError::Validation(format!(
        "cannot read {} input {}: {e}",
        stage.name(),
        path.display()
    )))?;

    let mut header = String::new();
    BufReader::new(file).read_line(&mut header)?;

    let present: Vec<&str> = header
        .trim_end()
        .split(',')
        .map(|col| col.trim().trim_matches('"'))
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .filter(|col| !present.contains(col))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch {
            stage: stage.name().to_string(),
            missing: missing.join(", "),
        })
    }
}
