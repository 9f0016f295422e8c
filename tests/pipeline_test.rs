//! 解析〜保存の一連の流れのテスト
//!
//! モデル応答を固定した解析器で、正規化から履歴保存・再読み込みまでを検証

use food_ai_common::{FieldKey, Locale, Normalizer, Tier};
use food_ai_rust::analyzer::{analyze_food, FoodAnalyzer};
use food_ai_rust::error::{FoodAiError, Result};
use food_ai_rust::history::{self, FsBackend, HistoryStore};
use food_ai_rust::intake::{self, ImageUpload};
use tempfile::tempdir;

const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// 決まった応答を返す解析器
struct ScriptedAnalyzer(&'static str);

impl FoodAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, _upload: &ImageUpload) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct FailingAnalyzer;

impl FoodAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _upload: &ImageUpload) -> Result<String> {
        Err(FoodAiError::Upstream("claude CLIが120秒以内に応答しませんでした".to_string()))
    }
}

fn upload() -> ImageUpload {
    intake::from_bytes("lunch.jpg", JPEG_HEADER.to_vec(), intake::DEFAULT_MAX_IMAGE_BYTES).unwrap()
}

/// JSON応答 → 保存 → 再読み込みで同じ記録と画像が返る
#[tokio::test]
async fn test_analyze_save_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history_dir = dir.path().join("history");

    let analyzer = ScriptedAnalyzer(
        r#"{"foodName":"apple","carbContent":"low","suitabilityIndex":"suitable","recommendedAmount":"1 medium","nutrients":"fiber","healthTips":"eat whole"}"#,
    );
    let normalizer = Normalizer::new(Locale::En);
    let upload = upload();

    let normalized = analyze_food(&analyzer, &upload, &normalizer).await.unwrap();
    assert_eq!(normalized.tier, Tier::Strict);

    let entry = history::new_entry(normalized.record.clone(), Some(upload.bytes.clone()));
    let id = entry.id().to_string();

    let (mut store, _) = HistoryStore::open(FsBackend::new(&history_dir)).unwrap();
    store.insert(entry).unwrap();

    let (reopened, report) = HistoryStore::open(FsBackend::new(&history_dir)).unwrap();
    assert_eq!(report.dropped_count(), 0);
    let saved = reopened.get(&id).unwrap();
    assert_eq!(saved.record(), &normalized.record);
    assert_eq!(saved.source_image(), Some(JPEG_HEADER));
}

/// ラベル形式の応答からも記録を作り、足りない項目はプレースホルダ
#[tokio::test]
async fn test_labelled_prose_response() {
    let analyzer = ScriptedAnalyzer("Food name: rice. Carb content: high.");
    let normalizer = Normalizer::new(Locale::Zh);

    let normalized = analyze_food(&analyzer, &upload(), &normalizer).await.unwrap();
    assert_eq!(normalized.tier, Tier::FieldExtraction);
    assert_eq!(normalized.record.food_name, "rice");
    assert_eq!(normalized.record.carb_content, "high");
    for key in [
        FieldKey::SuitabilityIndex,
        FieldKey::RecommendedAmount,
        FieldKey::Nutrients,
        FieldKey::HealthTips,
    ] {
        assert_eq!(normalized.record.get(key), Locale::Zh.placeholder(key));
    }
}

/// 拒否応答も1件の記録として保存できる
#[tokio::test]
async fn test_refusal_is_recorded() {
    let dir = tempdir().expect("Failed to create temp dir");
    let analyzer = ScriptedAnalyzer("I'm sorry, I can't help with that");
    let normalizer = Normalizer::new(Locale::Zh);

    let normalized = analyze_food(&analyzer, &upload(), &normalizer).await.unwrap();
    assert_eq!(normalized.record, Locale::Zh.refusal_record());
    assert_eq!(normalized.record.food_name, "未能识别的食物");

    let (mut store, _) = HistoryStore::open(FsBackend::new(dir.path())).unwrap();
    store.insert(history::new_entry(normalized.record, None)).unwrap();
    assert_eq!(store.len(), 1);
}

/// 呼び出し失敗では記録も履歴も作らない
#[tokio::test]
async fn test_upstream_failure_creates_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let history_dir = dir.path().join("history");
    let normalizer = Normalizer::new(Locale::Zh);

    let result = analyze_food(&FailingAnalyzer, &upload(), &normalizer).await;
    assert!(matches!(result, Err(FoodAiError::Upstream(_))));

    let (store, _) = HistoryStore::open(FsBackend::new(&history_dir)).unwrap();
    assert!(store.is_empty());
    assert!(!history_dir.exists());
}
