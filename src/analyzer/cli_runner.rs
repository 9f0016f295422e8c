//! AI CLI連携モジュール
//!
//! 画像を一時フォルダにコピーし、そのパスと固定の指示プロンプトを
//! claude / codex / gemini CLI に渡して応答テキストを受け取る。
//! 応答の解釈は行わない（`food_ai_common::normalizer` が担当）。

use super::FoodAnalyzer;
use crate::ai_provider::AiProvider;
use crate::error::{FoodAiError, Result};
use crate::intake::ImageUpload;
use food_ai_common::{build_analysis_prompt, Locale};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// AI CLIを子プロセスとして呼び出す解析器
#[derive(Debug, Clone)]
pub struct CliAnalyzer {
    pub provider: AiProvider,
    /// 実行するコマンド（既定はプロバイダのCLI名）
    pub program: String,
    pub model: Option<String>,
    pub locale: Locale,
    pub timeout: Duration,
    pub temp_dir: PathBuf,
}

impl CliAnalyzer {
    pub fn new(provider: AiProvider, locale: Locale, timeout: Duration) -> Self {
        Self {
            provider,
            program: provider.command_name().to_string(),
            model: None,
            locale,
            timeout,
            temp_dir: std::env::temp_dir().join("food-ai"),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// CLIに渡すプロンプト
    ///
    /// cmd経由でも壊れないよう改行はスペースに、二重引用符はエスケープする。
    pub fn build_prompt(&self, image_path: &Path) -> String {
        let raw_prompt = format!(
            "Read the following image file and analyze it: {}\n\n{}",
            image_path.display().to_string().replace('\\', "/"),
            build_analysis_prompt(self.locale)
        );
        raw_prompt.replace('\n', " ").replace('"', "\\\"")
    }

    fn copy_to_temp(&self, upload: &ImageUpload) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let dest = self
            .temp_dir
            .join(format!("{}.{}", uuid::Uuid::new_v4(), upload.extension()));
        std::fs::write(&dest, &upload.bytes)?;
        Ok(std::fs::canonicalize(&dest)?)
    }

    async fn run_cli(&self, prompt: &str) -> Result<String> {
        let args = self.provider.args(prompt, self.model.as_deref());

        // Windowsではcmd /c経由
        #[cfg(windows)]
        let mut command = {
            let mut c = Command::new("cmd");
            c.arg("/c").arg(&self.program).args(&args);
            c
        };

        #[cfg(not(windows))]
        let mut command = {
            let mut c = Command::new(&self.program);
            c.args(&args);
            c
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                FoodAiError::Upstream(format!(
                    "{} CLIが{}秒以内に応答しませんでした",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                FoodAiError::Upstream(format!("{} CLI実行エラー: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FoodAiError::Upstream(format!(
                "{} CLI failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        let response = String::from_utf8_lossy(&output.stdout).to_string();
        if response.trim().is_empty() {
            return Err(FoodAiError::Upstream(format!(
                "{} CLIの応答が空です",
                self.program
            )));
        }

        let preview: String = response.chars().take(500).collect();
        debug!("レスポンス ({} chars): {}", response.len(), preview);

        Ok(response)
    }
}

impl FoodAnalyzer for CliAnalyzer {
    async fn analyze(&self, upload: &ImageUpload) -> Result<String> {
        let image_path = self.copy_to_temp(upload)?;
        let prompt = self.build_prompt(&image_path);
        debug!("プロンプト長: {} chars", prompt.len());

        let result = self.run_cli(&prompt).await;
        let _ = std::fs::remove_file(&image_path);
        result
    }
}
