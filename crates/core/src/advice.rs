//! Investment advice fragment appended to published briefings.

use crate::markdown::{convert_inline, md_to_html};

const GLOBAL_LABEL: &str = "🌍 해외 투자";
const KOREA_LABEL: &str = "🇰🇷 국내 투자 (한국)";
const ADVICE_TITLE: &str = "💼 투자 조언 (AI 분석)";
const DISCLAIMER: &str = "⚠️ 본 내용은 AI가 생성한 참고용 정보이며, 투자 권유가 아닙니다. 투자 결정은 본인의 판단과 책임 하에 이루어져야 합니다.";

/// Optional free-text advice blocks for global and domestic (Korean) markets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvestmentAdvice {
    pub global: Option<String>,
    pub korea: Option<String>,
}

impl InvestmentAdvice {
    pub fn new(global: Option<String>, korea: Option<String>) -> Self {
        Self { global, korea }
    }

    /// True when neither block carries any text.
    pub fn is_empty(&self) -> bool {
        present(self.global.as_deref()).is_none() && present(self.korea.as_deref()).is_none()
    }
}

fn present(block: Option<&str>) -> Option<&str> {
    block.filter(|text| !text.is_empty())
}

fn render_section(label: &str, block: Option<&str>) -> String {
    match present(block) {
        Some(text) => format!(
            "<div class=\"advice-section\">\n    <div class=\"advice-section-label\">{}</div>\n    <p>{}</p>\n  </div>",
            label,
            convert_inline(text.trim())
        ),
        None => String::new(),
    }
}

/// Renders the advice fragment.
///
/// Returns an empty string when both blocks are absent or empty; callers append the result
/// as-is with no separator. Otherwise each present block is trimmed, inline-converted and
/// wrapped in its labelled section, followed by the fixed disclaimer.
pub fn render_investment_advice(global: Option<&str>, korea: Option<&str>) -> String {
    if present(global).is_none() && present(korea).is_none() {
        return String::new();
    }

    format!(
        "<div class=\"investment-advice\">\n  <div class=\"advice-title\">{}</div>\n  {}\n  {}\n  <p class=\"disclaimer\">{}</p>\n</div>",
        ADVICE_TITLE,
        render_section(GLOBAL_LABEL, global),
        render_section(KOREA_LABEL, korea),
        DISCLAIMER
    )
}

/// Builds the full HTML payload of a published record: the converted markdown followed
/// directly by the advice fragment, if any.
pub fn compose_html(markdown: &str, advice: &InvestmentAdvice) -> String {
    let mut html = md_to_html(markdown);
    if !advice.is_empty() {
        html.push_str(&render_investment_advice(
            advice.global.as_deref(),
            advice.korea.as_deref(),
        ));
    }
    html
}
