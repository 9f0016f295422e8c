//! ロケール別の固定文言
//!
//! 解決できなかった項目のプレースホルダと、モデルが回答を拒否した場合の
//! 既定レコードをロケールごとに定義する。

use crate::types::{AnalysisRecord, FieldKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 表示・プレースホルダ言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
    Ja,
}

impl Locale {
    /// 項目が解決できなかったときの値
    pub fn placeholder(&self, key: FieldKey) -> &'static str {
        match (self, key) {
            (Locale::Zh, FieldKey::FoodName) => "未能识别食物",
            (Locale::Zh, FieldKey::CarbContent) => "未知",
            (Locale::Zh, FieldKey::SuitabilityIndex) => "不确定",
            (Locale::Zh, FieldKey::RecommendedAmount) => "参考量不详",
            (Locale::Zh, FieldKey::Nutrients) => "未能识别营养成分",
            (Locale::Zh, FieldKey::HealthTips) => "建议咨询营养师获取个性化建议",

            (Locale::En, FieldKey::FoodName) => "unrecognized food",
            (Locale::En, FieldKey::CarbContent) => "unknown",
            (Locale::En, FieldKey::SuitabilityIndex) => "undetermined",
            (Locale::En, FieldKey::RecommendedAmount) => "no reference amount",
            (Locale::En, FieldKey::Nutrients) => "nutrients not identified",
            (Locale::En, FieldKey::HealthTips) => "consult a dietitian for personalised advice",

            (Locale::Ja, FieldKey::FoodName) => "食品を認識できませんでした",
            (Locale::Ja, FieldKey::CarbContent) => "不明",
            (Locale::Ja, FieldKey::SuitabilityIndex) => "判定不可",
            (Locale::Ja, FieldKey::RecommendedAmount) => "目安量不明",
            (Locale::Ja, FieldKey::Nutrients) => "栄養素を特定できませんでした",
            (Locale::Ja, FieldKey::HealthTips) => "管理栄養士への相談をおすすめします",
        }
    }

    /// 表示用の項目名
    pub fn field_label(&self, key: FieldKey) -> &'static str {
        match (self, key) {
            (Locale::Zh, FieldKey::FoodName) => "食物名称",
            (Locale::Zh, FieldKey::CarbContent) => "碳水含量",
            (Locale::Zh, FieldKey::SuitabilityIndex) => "适宜指数",
            (Locale::Zh, FieldKey::RecommendedAmount) => "建议食用量",
            (Locale::Zh, FieldKey::Nutrients) => "营养成分",
            (Locale::Zh, FieldKey::HealthTips) => "健康提示",

            (Locale::En, FieldKey::FoodName) => "Food",
            (Locale::En, FieldKey::CarbContent) => "Carbohydrates",
            (Locale::En, FieldKey::SuitabilityIndex) => "Suitability",
            (Locale::En, FieldKey::RecommendedAmount) => "Recommended amount",
            (Locale::En, FieldKey::Nutrients) => "Nutrients",
            (Locale::En, FieldKey::HealthTips) => "Health tips",

            (Locale::Ja, FieldKey::FoodName) => "食品名",
            (Locale::Ja, FieldKey::CarbContent) => "炭水化物",
            (Locale::Ja, FieldKey::SuitabilityIndex) => "適合度",
            (Locale::Ja, FieldKey::RecommendedAmount) => "目安量",
            (Locale::Ja, FieldKey::Nutrients) => "栄養素",
            (Locale::Ja, FieldKey::HealthTips) => "ヒント",
        }
    }

    /// 全項目がプレースホルダのレコード
    pub fn placeholder_record(&self) -> AnalysisRecord {
        AnalysisRecord::from_fn(|key| self.placeholder(key).to_string())
    }

    /// モデルが解析を拒否したときの既定レコード
    pub fn refusal_record(&self) -> AnalysisRecord {
        let values: [&str; 6] = match self {
            Locale::Zh => [
                "未能识别的食物",
                "未知",
                "不确定",
                "无法确定",
                "未知",
                "请尝试使用更清晰的食物照片",
            ],
            Locale::En => [
                "food not recognized",
                "unknown",
                "undetermined",
                "cannot be determined",
                "unknown",
                "please try a clearer photo of the food",
            ],
            Locale::Ja => [
                "認識できない食品",
                "不明",
                "判定不可",
                "判定できません",
                "不明",
                "より鮮明な食品の写真でお試しください",
            ],
        };
        let mut values = values.into_iter();
        AnalysisRecord::from_fn(|_| values.next().unwrap_or_default().to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Zh => write!(f, "zh"),
            Locale::En => write!(f, "en"),
            Locale::Ja => write!(f, "ja"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" | "zh-cn" | "chinese" => Ok(Locale::Zh),
            "en" | "english" => Ok(Locale::En),
            "ja" | "jp" | "japanese" => Ok(Locale::Ja),
            _ => Err(format!("Unknown locale: {}. Use zh, en, or ja", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCALES: [Locale; 3] = [Locale::Zh, Locale::En, Locale::Ja];

    #[test]
    fn test_placeholders_non_empty() {
        for locale in LOCALES {
            assert!(locale.placeholder_record().is_complete(), "{}", locale);
            assert!(locale.refusal_record().is_complete(), "{}", locale);
        }
    }

    #[test]
    fn test_refusal_record_zh() {
        let record = Locale::Zh.refusal_record();
        assert_eq!(record.food_name, "未能识别的食物");
        assert_eq!(record.recommended_amount, "无法确定");
        assert_eq!(record.health_tips, "请尝试使用更清晰的食物照片");
    }

    #[test]
    fn test_refusal_differs_from_placeholder() {
        for locale in LOCALES {
            assert_ne!(locale.refusal_record(), locale.placeholder_record());
        }
    }

    #[test]
    fn test_field_labels_distinct() {
        for locale in LOCALES {
            let labels: std::collections::HashSet<_> =
                FieldKey::ALL.iter().map(|key| locale.field_label(*key)).collect();
            assert_eq!(labels.len(), 6, "{}", locale);
        }
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("ZH".parse::<Locale>().unwrap(), Locale::Zh);
        assert_eq!("english".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("jp".parse::<Locale>().unwrap(), Locale::Ja);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Locale::Ja).unwrap(), "\"ja\"");
        let locale: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(locale, Locale::En);
    }
}
