//! Read-only content files: the question bank and the study plan.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use study_core::model::{BankError, QuestionBank, StudyPlan};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] BankError),
}

/// Load and validate the question bank.
///
/// # Errors
///
/// Returns `ContentError` if the file is missing, malformed, or contains an
/// invalid question.
pub async fn load_question_bank(path: &Path) -> Result<QuestionBank, ContentError> {
    let raw = read(path).await?;
    let bank = parse_question_bank(path, &raw)?;
    tracing::debug!(path = %path.display(), topics = bank.len(), "question bank loaded");
    Ok(bank)
}

/// Parse and validate question bank JSON.
///
/// # Errors
///
/// Returns `ContentError::Parse` or `ContentError::Invalid`.
pub fn parse_question_bank(path: &Path, raw: &str) -> Result<QuestionBank, ContentError> {
    let bank: QuestionBank = serde_json::from_str(raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    bank.validate()?;
    Ok(bank)
}

// The plan file is stored as a one-element array; a bare object is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanFile {
    List(Vec<StudyPlan>),
    Single(StudyPlan),
}

/// Load the study plan. A missing file yields an empty plan.
///
/// # Errors
///
/// Returns `ContentError` if the file cannot be read or parsed.
pub async fn load_study_plan(path: &Path) -> Result<StudyPlan, ContentError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no study plan file");
            return Ok(StudyPlan::default());
        }
        Err(source) => {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let file: PlanFile = serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match file {
        PlanFile::List(plans) => plans.into_iter().next().unwrap_or_default(),
        PlanFile::Single(plan) => plan,
    })
}

async fn read(path: &Path) -> Result<String, ContentError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })
}
