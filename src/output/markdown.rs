//! Markdown rendering for terminal output

use termimad::MadSkin;

use crate::recommend::RecommendationResult;

/// Print markdown directly to terminal
pub fn print_markdown(text: &str) {
    let skin = MadSkin::default();
    skin.print_text(text);
}

/// Recommendation cards as a markdown table
pub fn recommendation_cards(result: &RecommendationResult) -> String {
    let mut md = String::from("|#|Crop|Confidence|\n|:-:|:-|-:|\n");
    for (rank, pick) in result.recommendations.iter().enumerate() {
        md.push_str(&format!("|{}|**{}**|{}|\n", rank + 1, pick.crop, pick.confidence));
    }
    md
}
