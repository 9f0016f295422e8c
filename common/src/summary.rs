//! 読み上げ用サマリ
//!
//! 解析結果を音声合成向けの短い文章にまとめる。音声の再生自体は扱わない。

use crate::locale::Locale;
use crate::types::AnalysisRecord;

/// 適合度の大まかな区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitabilityAdvice {
    Recommended,
    Moderate,
    Avoid,
    Consult,
}

impl SuitabilityAdvice {
    /// `suitabilityIndex` の文言から区分を判定
    ///
    /// 「避ける」系を先に見る（「不适合」が「适合」に含まれるため）。
    pub fn classify(suitability: &str) -> Self {
        let text = suitability.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["避免", "不适合", "avoid", "not suitable", "避け", "控え"]) {
            SuitabilityAdvice::Avoid
        } else if has(&["谨慎", "少量", "caution", "limit", "small portion", "注意"]) {
            SuitabilityAdvice::Moderate
        } else if has(&["适量", "适合", "moderation", "suitable", "適量", "適して"]) {
            SuitabilityAdvice::Recommended
        } else {
            SuitabilityAdvice::Consult
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SuitabilityAdvice::Recommended, Locale::Zh) => "建议食用",
            (SuitabilityAdvice::Moderate, Locale::Zh) => "适量食用",
            (SuitabilityAdvice::Avoid, Locale::Zh) => "不建议食用",
            (SuitabilityAdvice::Consult, Locale::Zh) => "建议参考营养师意见",

            (SuitabilityAdvice::Recommended, Locale::En) => "fine to eat",
            (SuitabilityAdvice::Moderate, Locale::En) => "eat in moderation",
            (SuitabilityAdvice::Avoid, Locale::En) => "not recommended",
            (SuitabilityAdvice::Consult, Locale::En) => "ask a dietitian",

            (SuitabilityAdvice::Recommended, Locale::Ja) => "食べても大丈夫",
            (SuitabilityAdvice::Moderate, Locale::Ja) => "適量にとどめる",
            (SuitabilityAdvice::Avoid, Locale::Ja) => "おすすめしません",
            (SuitabilityAdvice::Consult, Locale::Ja) => "管理栄養士に相談",
        }
    }
}

/// 読み上げ用の文章を生成
pub fn spoken_summary(record: &AnalysisRecord, locale: Locale) -> String {
    let advice = SuitabilityAdvice::classify(&record.suitability_index).label(locale);
    match locale {
        Locale::Zh => format!(
            "食物：{}。\n食用建议：{}。\n碳水含量：{}。\n建议食用量：{}。\n小贴士：{}",
            record.food_name, advice, record.carb_content, record.recommended_amount, record.health_tips
        ),
        Locale::En => format!(
            "Food: {}.\nAdvice: {}.\nCarbohydrates: {}.\nRecommended amount: {}.\nTip: {}",
            record.food_name, advice, record.carb_content, record.recommended_amount, record.health_tips
        ),
        Locale::Ja => format!(
            "食品：{}。\n食べ方の目安：{}。\n炭水化物：{}。\n目安量：{}。\nヒント：{}",
            record.food_name, advice, record.carb_content, record.recommended_amount, record.health_tips
        ),
    }
}
