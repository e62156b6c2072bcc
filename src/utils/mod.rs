pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct SampleConfig {
        /// Per-collection sample bound for ERD inference (default 10).
        pub erd_limit: Option<usize>,
        /// Per-collection sample bound for schema extraction (default 100).
        pub schema_limit: Option<usize>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct OutputConfig {
        pub default_format: Option<String>, // "mermaid" | "json"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        pub sample: Option<SampleConfig>,
        pub output: Option<OutputConfig>,
    }

    fn default_config_path(root: &Path) -> PathBuf {
        root.join("docstore-erd.toml")
    }

    #[must_use]
    pub fn load_config_at(path: &Path) -> Option<Config> {
        let data = fs::read_to_string(path).ok()?;
        toml::from_str::<Config>(&data).ok()
    }

    /// Load `docstore-erd.toml` next to the source directory, if present.
    #[must_use]
    pub fn load_config_near(root: &Path) -> Option<Config> {
        let path = default_config_path(root);
        if path.exists() {
            load_config_at(&path)
        } else {
            None
        }
    }
}
