pub mod alerts;
pub mod domain;
pub mod error;
pub mod model;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_DATA_DIR: &str = "data";
    const DEFAULT_MODEL_PATH: &str = "models/preharvest_model.json";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub data_dir: PathBuf,
        pub model_path: PathBuf,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                data_dir: path_var("VRIKSH_DATA_DIR", DEFAULT_DATA_DIR)?,
                model_path: path_var("VRIKSH_MODEL_PATH", DEFAULT_MODEL_PATH)?,
                sentry_dsn: std::env::var("SENTRY_DSN")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
            })
        }
    }

    fn path_var(key: &str, default: &str) -> anyhow::Result<PathBuf> {
        match std::env::var(key) {
            Ok(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
            Ok(_) => Ok(PathBuf::from(default)),
            Err(std::env::VarError::NotPresent) => Ok(PathBuf::from(default)),
            Err(e) => Err(e).with_context(|| format!("{key} is not valid unicode")),
        }
    }
}
