//! プロンプト生成モジュール
//!
//! モデルに渡す固定の指示文。6項目のJSONスキーマを説明し、JSONのみの出力を求める。
//! ただし応答は指示通りとは限らないため、解釈は `normalizer` 側で行う。

use crate::locale::Locale;
use crate::types::FieldKey;

/// 血糖管理への適合度の選択肢
pub fn suitability_options(locale: Locale) -> [&'static str; 3] {
    match locale {
        Locale::Zh => ["适量食用", "谨慎少量食用", "建议避免"],
        Locale::En => ["eat in moderation", "small portions with caution", "best avoided"],
        Locale::Ja => ["適量なら可", "少量にとどめる", "避けることを推奨"],
    }
}

fn field_description(locale: Locale, key: FieldKey) -> &'static str {
    match (locale, key) {
        (Locale::Zh, FieldKey::FoodName) => "图片中的主要食物名称",
        (Locale::Zh, FieldKey::CarbContent) => "碳水化合物含量估计：高/中/低",
        (Locale::Zh, FieldKey::SuitabilityIndex) => "控制血糖人群的食用参考",
        (Locale::Zh, FieldKey::RecommendedAmount) => "一般人群的建议食用量",
        (Locale::Zh, FieldKey::Nutrients) => "主要营养素简述",
        (Locale::Zh, FieldKey::HealthTips) => "与这类食物相关的健康饮食小贴士",

        (Locale::En, FieldKey::FoodName) => "name of the main food in the photo",
        (Locale::En, FieldKey::CarbContent) => "estimated carbohydrate content: high/medium/low",
        (Locale::En, FieldKey::SuitabilityIndex) => "guidance for people managing blood sugar",
        (Locale::En, FieldKey::RecommendedAmount) => "reference serving for a typical adult",
        (Locale::En, FieldKey::Nutrients) => "short summary of the main nutrients",
        (Locale::En, FieldKey::HealthTips) => "general healthy-eating tip for this food",

        (Locale::Ja, FieldKey::FoodName) => "写真に写っている主な食品名",
        (Locale::Ja, FieldKey::CarbContent) => "炭水化物量の目安：高/中/低",
        (Locale::Ja, FieldKey::SuitabilityIndex) => "血糖値を管理している人への目安",
        (Locale::Ja, FieldKey::RecommendedAmount) => "一般的な1回の目安量",
        (Locale::Ja, FieldKey::Nutrients) => "主な栄養素の概要",
        (Locale::Ja, FieldKey::HealthTips) => "この食品に関する一般的な食事のヒント",
    }
}

/// 解析指示プロンプトを生成
///
/// # Arguments
/// * `locale` - 回答に使わせる言語
///
/// # Returns
/// 画像1枚の解析用プロンプト文字列
pub fn build_analysis_prompt(locale: Locale) -> String {
    let (intro, language, options_label) = match locale {
        Locale::Zh => (
            "你是一位食物营养分析助手。请分析图片中的食物并给出一般性的健康饮食参考（不构成医疗建议）。",
            "请用中文回答。",
            "suitabilityIndex 取值",
        ),
        Locale::En => (
            "You are a food nutrition assistant. Analyse the food in the photo and give general healthy-eating reference information (not medical advice).",
            "Answer in English.",
            "suitabilityIndex values",
        ),
        Locale::Ja => (
            "あなたは食品の栄養分析アシスタントです。写真の食品を解析し、一般的な食事の参考情報を示してください（医療上の助言ではありません）。",
            "日本語で回答してください。",
            "suitabilityIndex の値",
        ),
    };

    let schema = FieldKey::ALL
        .iter()
        .map(|key| format!("  \"{}\": \"{}\"", key.json_key(), field_description(locale, *key)))
        .collect::<Vec<_>>()
        .join(",\n");

    let options = suitability_options(locale).join(" / ");

    format!(
        r#"{intro}
{language}

## 出力形式（このJSONオブジェクトのみを出力）
{{
{schema}
}}

{options_label}: {options}
すべての値は文字列。JSON以外の文章は出力しないこと。"#
    )
}
