use crate::ai_provider::AiProvider;
use crate::error::{FoodAiError, Result};
use crate::intake::DEFAULT_MAX_IMAGE_BYTES;
use food_ai_common::{Locale, Normalizer, PatternTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 履歴ディレクトリを上書きする環境変数
pub const HISTORY_DIR_ENV: &str = "FOOD_AI_HISTORY_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: AiProvider,
    pub model: Option<String>,
    pub timeout_seconds: u64,
    pub max_image_bytes: u64,
    pub locale: Locale,
    pub history_dir: Option<PathBuf>,
    /// 項目ごとの追加ラベル（キーはJSONのキー名。組み込みより優先）
    pub extra_labels: HashMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            model: None,
            timeout_seconds: 120,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            locale: Locale::default(),
            history_dir: None,
            extra_labels: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("food-ai").join("config.json"))
    }

    /// 履歴の保存先
    ///
    /// 環境変数 > 設定ファイル > `<データディレクトリ>/food-ai/history` の順。
    pub fn history_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(HISTORY_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.history_dir {
            return Ok(dir.clone());
        }

        let data = dirs::data_dir()
            .ok_or_else(|| FoodAiError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("food-ai").join("history"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// 設定の言語と追加ラベルを反映した正規化器
    pub fn normalizer(&self) -> Result<Normalizer> {
        let normalizer = Normalizer::new(self.locale);
        if self.extra_labels.is_empty() {
            return Ok(normalizer);
        }

        let patterns = PatternTable::default().with_extra_labels(&self.extra_labels)?;
        Ok(normalizer.with_patterns(patterns))
    }

    pub fn set_provider(&mut self, provider: AiProvider) -> Result<()> {
        self.provider = provider;
        self.save()
    }

    pub fn set_locale(&mut self, locale: Locale) -> Result<()> {
        self.locale = locale;
        self.save()
    }

    pub fn set_history_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.history_dir = Some(dir);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_ai_common::FieldKey;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.locale, Locale::Zh);
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            provider: AiProvider::Gemini,
            locale: Locale::Ja,
            history_dir: Some(PathBuf::from("/tmp/food-history")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"locale": "en"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(config.provider, AiProvider::Claude);
    }

    #[test]
    fn test_broken_file_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(FoodAiError::JsonParse(_))));
    }

    #[test]
    fn test_normalizer_with_extra_labels() {
        let mut config = Config::default();
        config
            .extra_labels
            .insert("foodName".to_string(), vec!["Dish".to_string()]);

        let record = config.normalizer().unwrap().normalize("Dish: Pad Thai");
        assert_eq!(record.get(FieldKey::FoodName), "Pad Thai");
    }

    #[test]
    fn test_normalizer_unknown_label_key() {
        let mut config = Config::default();
        config
            .extra_labels
            .insert("calories".to_string(), vec!["Kcal".to_string()]);

        assert!(matches!(config.normalizer(), Err(FoodAiError::Common(_))));
    }
}
