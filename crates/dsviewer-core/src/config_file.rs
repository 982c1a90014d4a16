use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::{SourceKind, SourceSettings};
use crate::wordcloud::WordCloudOptions;
use crate::{CoreError, DatasetKind, Result};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub source: Option<SourceConfig>,
    pub defaults: Option<DefaultsConfig>,
    pub display: Option<DisplayConfig>,
    pub wordcloud: Option<WordCloudConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `hub` or `local`.
    pub kind: Option<String>,
    pub local_root: Option<String>,
    pub endpoint: Option<String>,
    pub config_name: Option<String>,
    pub max_rows: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub hf_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub qa_dataset: Option<String>,
    pub multimodal_dataset: Option<String>,
    pub image_folder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub fps: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordCloudConfig {
    pub max_words: Option<usize>,
    pub max_font_size: Option<f32>,
}

/// Platform config directory path: `<config_dir>/dsviewer/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dsviewer").join("config.toml"))
}

/// Load config by cascading CWD `.dsviewer.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".dsviewer.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!("ignoring unparsable config {}: {}", path.display(), e);
            None
        }
    }
}

/// Load a config the user named explicitly; unlike [`load_from_path`] a
/// missing or malformed file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    toml::from_str(&content)
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
}

fn pick<T>(overlay: Option<T>, base: Option<T>) -> Option<T> {
    overlay.or(base)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bs = base.source.unwrap_or_default();
    let os = overlay.source.unwrap_or_default();
    let bd = base.defaults.unwrap_or_default();
    let od = overlay.defaults.unwrap_or_default();
    let bp = base.display.unwrap_or_default();
    let op = overlay.display.unwrap_or_default();
    let bw = base.wordcloud.unwrap_or_default();
    let ow = overlay.wordcloud.unwrap_or_default();

    ConfigFile {
        source: Some(SourceConfig {
            kind: pick(os.kind, bs.kind),
            local_root: pick(os.local_root, bs.local_root),
            endpoint: pick(os.endpoint, bs.endpoint),
            config_name: pick(os.config_name, bs.config_name),
            max_rows: pick(os.max_rows, bs.max_rows),
            timeout_secs: pick(os.timeout_secs, bs.timeout_secs),
            hf_token: pick(os.hf_token, bs.hf_token),
        }),
        defaults: Some(DefaultsConfig {
            qa_dataset: pick(od.qa_dataset, bd.qa_dataset),
            multimodal_dataset: pick(od.multimodal_dataset, bd.multimodal_dataset),
            image_folder: pick(od.image_folder, bd.image_folder),
        }),
        display: Some(DisplayConfig {
            theme: pick(op.theme, bp.theme),
            fps: pick(op.fps, bp.fps),
        }),
        wordcloud: Some(WordCloudConfig {
            max_words: pick(ow.max_words, bw.max_words),
            max_font_size: pick(ow.max_font_size, bw.max_font_size),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path()
        .ok_or_else(|| CoreError::Config("could not determine config directory".into()))?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| CoreError::Config(format!("failed to serialize config: {}", e)))?;
    std::fs::write(path, content).map_err(|e| CoreError::io(path, e))
}

/// Fully resolved settings: defaults, then config file, then environment.
/// Binaries apply their command-line flags on top.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceSettings,
    pub qa_dataset: String,
    pub multimodal_dataset: String,
    pub image_folder: String,
    pub theme: String,
    pub fps: u32,
    pub wordcloud: WordCloudOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            qa_dataset: DatasetKind::QuestionAnswering.default_dataset().to_string(),
            multimodal_dataset: DatasetKind::Multimodal.default_dataset().to_string(),
            image_folder: String::new(),
            theme: "hacker".to_string(),
            fps: 10,
            wordcloud: WordCloudOptions::default(),
        }
    }
}

impl Settings {
    /// Only sets values that are `Some` and non-empty in the file config.
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(src) = &file.source {
            if let Some(kind) = src.kind.as_deref().and_then(SourceKind::parse) {
                self.source.kind = kind;
            }
            if let Some(root) = non_empty(&src.local_root) {
                self.source.local_root = Some(PathBuf::from(root));
            }
            if let Some(endpoint) = non_empty(&src.endpoint) {
                self.source.endpoint = endpoint.to_string();
            }
            if let Some(name) = non_empty(&src.config_name) {
                self.source.config_name = Some(name.to_string());
            }
            if let Some(rows) = src.max_rows {
                self.source.max_rows = rows.max(1);
            }
            if let Some(secs) = src.timeout_secs {
                self.source.timeout = Duration::from_secs(secs.max(1));
            }
            if let Some(token) = non_empty(&src.hf_token) {
                self.source.hf_token = Some(token.to_string());
            }
        }
        if let Some(defaults) = &file.defaults {
            if let Some(name) = non_empty(&defaults.qa_dataset) {
                self.qa_dataset = name.to_string();
            }
            if let Some(name) = non_empty(&defaults.multimodal_dataset) {
                self.multimodal_dataset = name.to_string();
            }
            if let Some(folder) = non_empty(&defaults.image_folder) {
                self.image_folder = folder.to_string();
            }
        }
        if let Some(display) = &file.display {
            if let Some(theme) = non_empty(&display.theme) {
                self.theme = theme.to_string();
            }
            if let Some(fps) = display.fps {
                self.fps = fps.clamp(1, 120);
            }
        }
        if let Some(wc) = &file.wordcloud {
            if let Some(n) = wc.max_words {
                self.wordcloud.max_words = n.max(1);
            }
            if let Some(size) = wc.max_font_size
                && size >= self.wordcloud.min_font_size
            {
                self.wordcloud.max_font_size = size;
            }
        }
    }

    /// Overlay `HF_TOKEN`, `DSVIEWER_SOURCE` and `DSVIEWER_LOCAL_ROOT`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(token) = get("HF_TOKEN").filter(|t| !t.is_empty()) {
            self.source.hf_token = Some(token);
        }
        if let Some(kind) = get("DSVIEWER_SOURCE").as_deref().and_then(SourceKind::parse) {
            self.source.kind = kind;
        }
        if let Some(root) = get("DSVIEWER_LOCAL_ROOT").filter(|r| !r.is_empty()) {
            self.source.local_root = Some(PathBuf::from(root));
        }
    }

    /// Convert into a `ConfigFile` for saving. The token is never written.
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            source: Some(SourceConfig {
                kind: Some(self.source.kind.as_str().to_string()),
                local_root: self
                    .source
                    .local_root
                    .as_ref()
                    .map(|p| p.display().to_string()),
                endpoint: Some(self.source.endpoint.clone()),
                config_name: self.source.config_name.clone(),
                max_rows: Some(self.source.max_rows),
                timeout_secs: Some(self.source.timeout.as_secs()),
                hf_token: None,
            }),
            defaults: Some(DefaultsConfig {
                qa_dataset: Some(self.qa_dataset.clone()),
                multimodal_dataset: Some(self.multimodal_dataset.clone()),
                image_folder: if self.image_folder.is_empty() {
                    None
                } else {
                    Some(self.image_folder.clone())
                },
            }),
            display: Some(DisplayConfig {
                theme: Some(self.theme.clone()),
                fps: Some(self.fps),
            }),
            wordcloud: Some(WordCloudConfig {
                max_words: Some(self.wordcloud.max_words),
                max_font_size: Some(self.wordcloud.max_font_size),
            }),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            [source]
            kind = "local"
            local_root = "/data/datasets"

            [defaults]
            qa_dataset = "race"
            "#,
        )
        .unwrap();
        let mut settings = Settings::default();
        settings.apply_file(&cfg);
        assert_eq!(settings.source.kind, SourceKind::Local);
        assert_eq!(
            settings.source.local_root,
            Some(PathBuf::from("/data/datasets"))
        );
        assert_eq!(settings.qa_dataset, "race");
        assert_eq!(settings.multimodal_dataset, "coco");
        assert_eq!(settings.source.max_rows, 10_000);
    }

    #[test]
    fn overlay_wins_in_merge() {
        let base = ConfigFile {
            source: Some(SourceConfig {
                kind: Some("hub".into()),
                max_rows: Some(500),
                ..SourceConfig::default()
            }),
            display: Some(DisplayConfig {
                theme: Some("modern".into()),
                fps: Some(30),
            }),
            ..ConfigFile::default()
        };
        let overlay = ConfigFile {
            source: Some(SourceConfig {
                kind: Some("local".into()),
                ..SourceConfig::default()
            }),
            ..ConfigFile::default()
        };
        let merged = merge(base, overlay);
        let src = merged.source.unwrap();
        assert_eq!(src.kind.as_deref(), Some("local"));
        assert_eq!(src.max_rows, Some(500));
        assert_eq!(merged.display.unwrap().theme.as_deref(), Some("modern"));
    }

    #[test]
    fn empty_strings_do_not_override() {
        let cfg = ConfigFile {
            defaults: Some(DefaultsConfig {
                qa_dataset: Some("  ".into()),
                ..DefaultsConfig::default()
            }),
            ..ConfigFile::default()
        };
        let mut settings = Settings::default();
        settings.apply_file(&cfg);
        assert_eq!(settings.qa_dataset, "squad");
    }

    #[test]
    fn values_are_clamped() {
        let cfg = ConfigFile {
            source: Some(SourceConfig {
                max_rows: Some(0),
                timeout_secs: Some(0),
                ..SourceConfig::default()
            }),
            display: Some(DisplayConfig {
                fps: Some(1000),
                ..DisplayConfig::default()
            }),
            ..ConfigFile::default()
        };
        let mut settings = Settings::default();
        settings.apply_file(&cfg);
        assert_eq!(settings.source.max_rows, 1);
        assert_eq!(settings.source.timeout, Duration::from_secs(1));
        assert_eq!(settings.fps, 120);
    }

    #[test]
    fn env_overrides_file() {
        let mut settings = Settings::default();
        settings.apply_env_from(|key| match key {
            "HF_TOKEN" => Some("hf_abc".into()),
            "DSVIEWER_SOURCE" => Some("local".into()),
            "DSVIEWER_LOCAL_ROOT" => Some("/tmp/ds".into()),
            _ => None,
        });
        assert_eq!(settings.source.hf_token.as_deref(), Some("hf_abc"));
        assert_eq!(settings.source.kind, SourceKind::Local);
        assert_eq!(settings.source.local_root, Some(PathBuf::from("/tmp/ds")));
    }

    #[test]
    fn save_and_reload_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.source.hf_token = Some("secret".into());
        settings.image_folder = "/pics".into();

        save_to_path(&settings.to_config_file(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("secret"));

        let loaded = load_explicit(&path).unwrap();
        let mut reloaded = Settings::default();
        reloaded.apply_file(&loaded);
        assert_eq!(reloaded.image_folder, "/pics");
        assert_eq!(reloaded.source.hf_token, None);
    }

    #[test]
    fn explicit_load_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[source\nkind=").unwrap();
        assert!(matches!(load_explicit(&path), Err(CoreError::Config(_))));
        assert!(load_from_path(&path).is_none());
    }
}
