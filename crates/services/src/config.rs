use std::env;
use std::path::PathBuf;

/// File locations for the app, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    pub data_dir: PathBuf,
    pub questions_path: PathBuf,
    pub plan_path: PathBuf,
}

impl ServicesConfig {
    /// Content files default to `dsa_questions.json` and
    /// `study_schedule.json` inside the data directory.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            questions_path: data_dir.join("dsa_questions.json"),
            plan_path: data_dir.join("study_schedule.json"),
            data_dir,
        }
    }

    /// Reads `STUDY_DATA_DIR`, `STUDY_QUESTIONS_PATH` and `STUDY_PLAN_PATH`.
    /// `data_dir` takes precedence over `STUDY_DATA_DIR` when given.
    #[must_use]
    pub fn from_env(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| env::var_os("STUDY_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("data"));
        let mut config = Self::new(data_dir);
        if let Some(path) = env::var_os("STUDY_QUESTIONS_PATH") {
            config.questions_path = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("STUDY_PLAN_PATH") {
            config.plan_path = PathBuf::from(path);
        }
        config
    }
}
