//! 解析結果の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - FieldKey: 6つの解析項目
//! - AnalysisRecord: 正規化済みの解析結果（6項目すべて非空）
//! - HistoryEntry: 履歴1件（解析結果 + 元画像 + ID + 作成時刻）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 解析項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    FoodName,
    CarbContent,
    SuitabilityIndex,
    RecommendedAmount,
    Nutrients,
    HealthTips,
}

impl FieldKey {
    /// 正準順の全項目
    pub const ALL: [FieldKey; 6] = [
        FieldKey::FoodName,
        FieldKey::CarbContent,
        FieldKey::SuitabilityIndex,
        FieldKey::RecommendedAmount,
        FieldKey::Nutrients,
        FieldKey::HealthTips,
    ];

    /// モデル出力JSON・永続化ヘッダで使うキー名
    pub fn json_key(&self) -> &'static str {
        match self {
            FieldKey::FoodName => "foodName",
            FieldKey::CarbContent => "carbContent",
            FieldKey::SuitabilityIndex => "suitabilityIndex",
            FieldKey::RecommendedAmount => "recommendedAmount",
            FieldKey::Nutrients => "nutrients",
            FieldKey::HealthTips => "healthTips",
        }
    }

    pub fn from_json_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.json_key() == key)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_key())
    }
}

/// 正規化済みの解析結果
///
/// 正規化を通った値は全項目が非空文字列。
/// 解決できなかった項目にはロケールごとのプレースホルダが入る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub food_name: String,          // 食品名
    pub carb_content: String,       // 炭水化物量
    pub suitability_index: String,  // 血糖管理への適合度
    pub recommended_amount: String, // 推奨摂取量
    pub nutrients: String,          // 主な栄養素
    pub health_tips: String,        // 食事のヒント
}

impl AnalysisRecord {
    /// 項目ごとの値から組み立てる
    pub fn from_fn(mut value: impl FnMut(FieldKey) -> String) -> Self {
        Self {
            food_name: value(FieldKey::FoodName),
            carb_content: value(FieldKey::CarbContent),
            suitability_index: value(FieldKey::SuitabilityIndex),
            recommended_amount: value(FieldKey::RecommendedAmount),
            nutrients: value(FieldKey::Nutrients),
            health_tips: value(FieldKey::HealthTips),
        }
    }

    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::FoodName => &self.food_name,
            FieldKey::CarbContent => &self.carb_content,
            FieldKey::SuitabilityIndex => &self.suitability_index,
            FieldKey::RecommendedAmount => &self.recommended_amount,
            FieldKey::Nutrients => &self.nutrients,
            FieldKey::HealthTips => &self.health_tips,
        }
    }

    /// 全項目が非空か
    pub fn is_complete(&self) -> bool {
        FieldKey::ALL.iter().all(|&k| !self.get(k).trim().is_empty())
    }
}

/// 履歴エントリ
///
/// 作成後は変更不可。訂正が必要な場合は新しいエントリを作る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    id: String,
    created_at: i64,
    source_image: Option<Vec<u8>>,
    record: AnalysisRecord,
}

impl HistoryEntry {
    /// エントリを作成
    ///
    /// 空の画像バイト列は「画像なし」として扱う。
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        source_image: Option<Vec<u8>>,
        record: AnalysisRecord,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            source_image: source_image.filter(|bytes| !bytes.is_empty()),
            record,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 作成時刻（UNIXエポックミリ秒）
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn source_image(&self) -> Option<&[u8]> {
        self.source_image.as_deref()
    }

    pub fn record(&self) -> &AnalysisRecord {
        &self.record
    }
}
