//! ラベル抽出モジュール
//!
//! JSONを返さなかったモデル応答から、「食物名称：苹果」「Food name: rice.」
//! のようなラベル付きの記述を項目ごとに拾い出す。
//!
//! ラベルは項目ごとの順序付きパターン表で管理する。
//! 汎用的なラベル（例: 「营养」）が具体的なラベルの回答を横取りしないよう、
//! 具体的なものを先に並べること。

use crate::error::{Error, Result};
use crate::types::FieldKey;
use regex::Regex;
use std::collections::HashMap;

/// 組み込みのラベル表（項目ごとに優先順）
///
/// 各要素はラベル部分の正規表現。区切りのコロンと値の取り出しは
/// `PatternTable` が付け足す。
pub const DEFAULT_LABELS: &[(FieldKey, &[&str])] = &[
    (
        FieldKey::FoodName,
        &[
            r"food\s*name",
            r"name\s+of\s+(?:the\s+)?food",
            r"\bdish\b",
            r"食物名称",
            r"食品名称",
            r"食品名",
            r"料理名",
        ],
    ),
    (
        FieldKey::CarbContent,
        &[
            r"carb(?:ohydrate)?s?\s*content",
            r"\bcarb(?:ohydrate)?s?\b",
            r"碳水化合物含量",
            r"碳水化合物[^:：\n]*",
            r"碳水[^:：\n]*",
            r"炭水化物(?:量|含有量)?",
            r"糖質",
        ],
    ),
    (
        FieldKey::SuitabilityIndex,
        &[
            r"suitability\s*index",
            r"glycemic\s*suitability",
            r"\bsuitability\b",
            r"suitable\s*for",
            r"适合控制血糖人群食用指数",
            r"适合[^:：\n]*",
            r"适宜[^:：\n]*",
            r"適合度",
        ],
    ),
    (
        FieldKey::RecommendedAmount,
        &[
            r"recommended\s*(?:amount|serving|portion|intake)",
            r"serving\s*size",
            r"\bportion\b",
            r"建议食用量",
            r"推荐[^:：\n]*量",
            r"食用量",
            r"推奨(?:摂取)?量",
            r"目安量",
        ],
    ),
    (
        FieldKey::Nutrients,
        &[
            r"\bnutrients\b",
            r"nutritional\s*value",
            r"\bnutrition(?:al)?(?:\s*facts)?\b",
            r"营养成分",
            r"营养价值",
            r"营养[^:：\n]*",
            r"栄養素",
            r"栄養[^:：\n]*",
        ],
    ),
    (
        FieldKey::HealthTips,
        &[
            r"health(?:y)?\s*(?:eating\s*)?tips?",
            r"\btips?\b",
            r"\badvice\b",
            r"健康饮食小贴士",
            r"小贴士",
            r"贴士",
            r"ヒント",
            r"アドバイス",
        ],
    ),
];

lazy_static::lazy_static! {
    static ref DEFAULT_TABLE: PatternTable = PatternTable::from_labels(DEFAULT_LABELS).unwrap();
}

/// 項目ごとの順序付きパターン表
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: HashMap<FieldKey, Vec<Regex>>,
}

impl PatternTable {
    /// ラベル正規表現のリストから表を組み立てる
    pub fn from_labels(labels: &[(FieldKey, &[&str])]) -> Result<Self> {
        let mut patterns: HashMap<FieldKey, Vec<Regex>> = HashMap::new();
        for (key, field_labels) in labels {
            let compiled = field_labels
                .iter()
                .map(|label| compile_label(label))
                .collect::<Result<Vec<_>>>()?;
            patterns.entry(*key).or_default().extend(compiled);
        }
        Ok(Self { patterns })
    }

    /// 設定ファイル由来のラベルを各項目の先頭に追加した表を返す
    ///
    /// キーは `foodName` などのJSONキー名。
    pub fn with_extra_labels(&self, extra: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut table = self.clone();
        for (key_name, labels) in extra {
            let key = FieldKey::from_json_key(key_name)
                .ok_or_else(|| Error::Config(format!("未知の項目キー: {}", key_name)))?;
            let mut compiled = labels
                .iter()
                .map(|label| compile_label(label))
                .collect::<Result<Vec<_>>>()?;
            let existing = table.patterns.remove(&key).unwrap_or_default();
            compiled.extend(existing);
            table.patterns.insert(key, compiled);
        }
        Ok(table)
    }

    /// 項目のパターン（優先順）
    pub fn patterns(&self, key: FieldKey) -> &[Regex] {
        self.patterns.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 1項目を抽出
    ///
    /// 先頭から順にパターンを試し、空でない値が取れた最初のものを返す。
    pub fn extract(&self, key: FieldKey, text: &str) -> Option<String> {
        self.patterns(key).iter().find_map(|re| {
            re.captures(text)
                .and_then(|cap| cap.get(1))
                .map(|m| clean_value(m.as_str()))
                .filter(|value| !value.is_empty())
        })
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

/// 組み込みの表で1項目を抽出
pub fn extract(key: FieldKey, text: &str) -> Option<String> {
    DEFAULT_TABLE.extract(key, text)
}

/// ラベル → 値 の正規表現を作る
///
/// ラベルの後に `**` や引用符が挟まっていても区切りのコロンまで読み飛ばし、
/// 値は次の句読点・改行・文字列末尾まで。
fn compile_label(label: &str) -> Result<Regex> {
    let pattern = format!(r#"(?i)(?:{})[*"'\s]*[:：]\s*([^.,\r\n。，；;]*)"#, label);
    Regex::new(&pattern).map_err(|e| Error::Pattern(format!("{}: {}", label, e)))
}

fn clean_value(raw: &str) -> String {
    raw.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '`' | '“' | '”' | '「' | '」')
    })
    .to_string()
}
