//! モデル応答の正規化
//!
//! モデルの応答は指示に関係なく信用しない。どんな文字列からでも
//! 6項目すべてが埋まった `AnalysisRecord` を返す（失敗しない）。
//!
//! 判定順序:
//! 1. 拒否文言を含む → ロケールの拒否用既定レコード
//! 2. 全体がJSONオブジェクト → キーを読み、欠けた項目はプレースホルダ
//! 3. 最初の `{` から最後の `}` までがJSONオブジェクト → 2と同じ扱い
//! 4. ラベル抽出（項目ごと）、見つからない項目はプレースホルダ
//!
//! JSONとして読めた段階で終了し、後段の方が多くの項目を埋められる場合でも
//! 後段には進まない。

use crate::extractor::PatternTable;
use crate::locale::Locale;
use crate::types::{AnalysisRecord, FieldKey};
use serde_json::{Map, Value};
use std::fmt;

/// 拒否・回答不能を示す文言（小文字で比較）
pub const REFUSAL_MARKERS: &[&str] = &[
    "cannot help",
    "can't help",
    "unable to",
    "i'm sorry",
    "i am sorry",
    "i apologize",
    "cannot assist",
    "can't assist",
    "cannot identify",
    "can't identify",
    "抱歉",
    "对不起",
    "无法识别",
    "无法分析",
    "无法提供",
    "不能帮助",
    "申し訳",
    "お答えできません",
    "識別できません",
];

/// 結果を確定させた段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Refusal,
    Strict,
    Substring,
    FieldExtraction,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Refusal => write!(f, "refusal"),
            Tier::Strict => write!(f, "strict"),
            Tier::Substring => write!(f, "substring"),
            Tier::FieldExtraction => write!(f, "field-extraction"),
        }
    }
}

/// 正規化結果（どの段で確定したか付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: AnalysisRecord,
    pub tier: Tier,
}

/// 応答正規化器
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    locale: Locale,
    patterns: PatternTable,
}

impl Normalizer {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            patterns: PatternTable::default(),
        }
    }

    /// ラベル表を差し替える（設定ファイルの追加ラベル用）
    pub fn with_patterns(mut self, patterns: PatternTable) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn normalize(&self, raw: &str) -> AnalysisRecord {
        self.normalize_detailed(raw).record
    }

    /// バイト列の応答を正規化（不正なUTF-8は置換文字で読む）
    pub fn normalize_bytes(&self, raw: &[u8]) -> Normalized {
        self.normalize_detailed(&String::from_utf8_lossy(raw))
    }

    pub fn normalize_detailed(&self, raw: &str) -> Normalized {
        if contains_refusal(raw) {
            return Normalized {
                record: self.locale.refusal_record(),
                tier: Tier::Refusal,
            };
        }

        if let Some(obj) = parse_object(raw.trim()) {
            return Normalized {
                record: self.record_from_object(&obj),
                tier: Tier::Strict,
            };
        }

        if let Some(obj) = brace_slice(raw).and_then(parse_object) {
            return Normalized {
                record: self.record_from_object(&obj),
                tier: Tier::Substring,
            };
        }

        Normalized {
            record: AnalysisRecord::from_fn(|key| {
                self.patterns
                    .extract(key, raw)
                    .unwrap_or_else(|| self.locale.placeholder(key).to_string())
            }),
            tier: Tier::FieldExtraction,
        }
    }

    fn record_from_object(&self, obj: &Map<String, Value>) -> AnalysisRecord {
        AnalysisRecord::from_fn(|key: FieldKey| {
            obj.get(key.json_key())
                .and_then(value_text)
                .unwrap_or_else(|| self.locale.placeholder(key).to_string())
        })
    }
}

/// 既定設定（zh・組み込みラベル表）で正規化
pub fn normalize(raw: &str) -> AnalysisRecord {
    Normalizer::default().normalize(raw)
}

/// 拒否文言を含むか
pub fn contains_refusal(raw: &str) -> bool {
    let lowered = raw.to_lowercase().replace('’', "'");
    REFUSAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// 最初の `{` から最後の `}` まで
fn brace_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

/// JSON値を項目の文字列へ
///
/// 文字列以外のスカラーは表記そのまま、スカラー配列は `, ` 区切りで連結。
/// null・オブジェクト・空文字は未解決扱い。
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
