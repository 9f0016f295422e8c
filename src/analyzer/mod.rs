mod cli_runner;

pub use cli_runner::CliAnalyzer;

use crate::error::Result;
use crate::intake::ImageUpload;
use food_ai_common::{Normalized, Normalizer};
use tracing::{debug, info};

/// 画像を受け取りモデルの生テキスト応答を返す
///
/// 応答の形式は保証されない。解釈は `analyze_food` 側で行う。
#[allow(async_fn_in_trait)]
pub trait FoodAnalyzer {
    async fn analyze(&self, upload: &ImageUpload) -> Result<String>;
}

/// 画像を解析して正規化済みの記録を返す
///
/// 呼び出し自体の失敗（起動失敗・タイムアウト・空応答）は `Upstream` として返し、
/// 応答が返ってきた場合はどんな内容でも記録にする。
pub async fn analyze_food<A: FoodAnalyzer>(
    analyzer: &A,
    upload: &ImageUpload,
    normalizer: &Normalizer,
) -> Result<Normalized> {
    info!("解析開始: {} ({}, {} bytes)", upload.file_name, upload.mime_type, upload.bytes.len());

    let raw = analyzer.analyze(upload).await?;
    let normalized = normalizer.normalize_detailed(&raw);

    debug!("正規化: {} -> {}", upload.file_name, normalized.tier);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FoodAiError;
    use crate::intake;
    use food_ai_common::{Locale, Tier};

    struct FixedAnalyzer(std::result::Result<&'static str, &'static str>);

    impl FoodAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _upload: &ImageUpload) -> Result<String> {
            self.0
                .map(str::to_string)
                .map_err(|e| FoodAiError::Upstream(e.to_string()))
        }
    }

    fn upload() -> ImageUpload {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        intake::from_bytes("meal.jpg", bytes, intake::DEFAULT_MAX_IMAGE_BYTES).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_food_json() {
        let analyzer = FixedAnalyzer(Ok(r#"Sure! {"foodName":"Rice","carbContent":"45g"}"#));
        let normalizer = Normalizer::new(Locale::En);

        let result = analyze_food(&analyzer, &upload(), &normalizer).await.unwrap();
        assert_eq!(result.tier, Tier::Substring);
        assert_eq!(result.record.food_name, "Rice");
        assert_eq!(result.record.carb_content, "45g");
        assert_eq!(result.record.nutrients, Locale::En.placeholder_record().nutrients);
    }

    #[tokio::test]
    async fn test_analyze_food_refusal() {
        let analyzer = FixedAnalyzer(Ok("I'm sorry, I can't identify any food here."));
        let normalizer = Normalizer::new(Locale::Zh);

        let result = analyze_food(&analyzer, &upload(), &normalizer).await.unwrap();
        assert_eq!(result.tier, Tier::Refusal);
        assert_eq!(result.record, Locale::Zh.refusal_record());
    }

    #[tokio::test]
    async fn test_analyze_food_upstream_failure() {
        let analyzer = FixedAnalyzer(Err("timeout"));
        let normalizer = Normalizer::new(Locale::Zh);

        let result = analyze_food(&analyzer, &upload(), &normalizer).await;
        assert!(matches!(result, Err(FoodAiError::Upstream(_))));
    }
}
