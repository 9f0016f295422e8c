use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
        }
    }

    /// 非対話モードで1回だけ応答させる引数
    pub fn args(&self, prompt: &str, model: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = match self {
            AiProvider::Claude => vec!["-p".into(), prompt.into(), "--output-format".into(), "text".into()],
            AiProvider::Codex => vec!["exec".into(), prompt.into()],
            AiProvider::Gemini => vec!["-p".into(), prompt.into()],
        };

        if let Some(model) = model.filter(|m| !m.is_empty()) {
            let flag = match self {
                AiProvider::Claude => "--model",
                AiProvider::Codex | AiProvider::Gemini => "-m",
            };
            args.push(flag.into());
            args.push(model.into());
        }
        args
    }
}
