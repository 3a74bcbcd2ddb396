use super::colorize::ColorScheme;
use super::markdown::{print_markdown, recommendation_cards};
use crate::cli::Args;
use crate::recommend::{ConnectionError, HealthStatus, RainfallProvenance, RecommendationResult};
use std::io::IsTerminal;

const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Raw,
    Json,
}

pub struct OutputFormatter {
    mode: OutputMode,
    color: bool,
}

impl OutputFormatter {
    pub fn new(args: &Args) -> Self {
        let is_piped = !std::io::stdout().is_terminal();

        let mode = if args.json {
            OutputMode::Json
        } else if args.raw || is_piped {
            OutputMode::Raw
        } else {
            OutputMode::Pretty
        };

        Self {
            mode,
            color: args.color != Some(false) && !is_piped,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Print a recommendation in the selected mode
    pub fn format_result(&self, result: &RecommendationResult) {
        match self.mode {
            OutputMode::Json => println!("{}", to_json(result)),
            OutputMode::Raw => print!("{}", raw_lines(result)),
            OutputMode::Pretty => self.format_pretty(result),
        }
    }

    fn format_pretty(&self, result: &RecommendationResult) {
        if result.recommendations.is_empty() {
            let message = result
                .message
                .as_deref()
                .unwrap_or("The service returned no recommendations.");
            ColorScheme::print_info(message);
            for error in result.errors.iter().flatten() {
                eprintln!("  {}", ColorScheme::muted(error));
            }
        } else {
            println!("{}", ColorScheme::heading("Recommended crops"));
            if let Some(best) = result.top_pick() {
                println!("Best match: {} ({})", ColorScheme::highlight(&best.crop), best.confidence);
            }
            println!();
            if self.color {
                print_markdown(&recommendation_cards(result));
            }
            for line in bar_chart(result, BAR_WIDTH) {
                if self.color {
                    println!(
                        "  {} {} {}",
                        ColorScheme::bold(&line.label),
                        ColorScheme::confidence(&line.bar, line.value),
                        line.confidence
                    );
                } else {
                    println!("  {} {} {}", line.label, line.bar, line.confidence);
                }
            }
        }

        if let Some(ref meta) = result.metadata {
            println!();
            println!("{}", ColorScheme::muted(&provenance_line(meta)));
        }

        for warning in result.warnings.iter().flatten() {
            ColorScheme::print_warning(warning);
        }
    }

    pub fn format_health(&self, health: &HealthStatus) {
        match self.mode {
            OutputMode::Json => println!(
                "{}",
                serde_json::to_string_pretty(health).unwrap_or_default()
            ),
            OutputMode::Raw => println!(
                "{}\t{}",
                health.status,
                health.model_status.as_deref().unwrap_or("unknown")
            ),
            OutputMode::Pretty => {
                let service = health.service.as_deref().unwrap_or("service");
                let model = health.model_status.as_deref().unwrap_or("unknown");
                if health.is_ok() && health.model_loaded() {
                    println!("{} {} is up, model {}", ColorScheme::success("✓"), service, model);
                } else {
                    ColorScheme::print_error(&format!(
                        "{} reports status '{}', model {}",
                        service, health.status, model
                    ));
                }
            }
        }
    }

    /// Report a failed request
    pub fn format_error(&self, err: &ConnectionError) {
        if self.mode == OutputMode::Json {
            let output = serde_json::json!({
                "success": false,
                "error": err.user_message(),
                "details": err.details(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
            return;
        }

        ColorScheme::print_error(&err.user_message());
        for detail in err.details() {
            eprintln!("  {}", ColorScheme::muted(detail));
        }
    }
}

fn to_json(result: &RecommendationResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_default()
}

/// One `crop<TAB>confidence` line per pick
pub fn raw_lines(result: &RecommendationResult) -> String {
    result
        .recommendations
        .iter()
        .map(|pick| format!("{}\t{}\n", pick.crop, pick.confidence))
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct BarLine {
    pub label: String,
    pub bar: String,
    pub confidence: String,
    pub value: f64,
}

/// Horizontal bars scaled to 100%, labels padded to the longest crop name
pub fn bar_chart(result: &RecommendationResult, width: usize) -> Vec<BarLine> {
    let label_width = result
        .recommendations
        .iter()
        .map(|pick| pick.crop.chars().count())
        .max()
        .unwrap_or(0);

    result
        .recommendations
        .iter()
        .map(|pick| {
            let filled = ((pick.confidence_value.clamp(0.0, 100.0) / 100.0) * width as f64)
                .round() as usize;
            BarLine {
                label: format!("{:<w$}", pick.crop, w = label_width),
                bar: format!("{}{}", "█".repeat(filled), "░".repeat(width - filled)),
                confidence: pick.confidence.clone(),
                value: pick.confidence_value,
            }
        })
        .collect()
}

/// Where the rainfall figure came from, in words
pub fn provenance_line(meta: &RainfallProvenance) -> String {
    match meta.value_used {
        Some(mm) => format!("Rainfall: {:.1} mm ({})", mm, meta.source),
        None => format!("Rainfall: not used ({})", meta.source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::{CropPick, ResponseStatus};

    fn pick(crop: &str, value: f64) -> CropPick {
        CropPick {
            crop: crop.to_string(),
            confidence: format!("{}%", value),
            confidence_value: value,
        }
    }

    fn result(picks: Vec<CropPick>) -> RecommendationResult {
        RecommendationResult {
            status: ResponseStatus::Success,
            recommendations: picks,
            warnings: None,
            metadata: None,
            message: None,
            errors: None,
        }
    }

    #[test]
    fn test_raw_lines() {
        let out = raw_lines(&result(vec![pick("rice", 95.0), pick("maize", 4.0)]));
        assert_eq!(out, "rice\t95%\nmaize\t4%\n");
    }

    #[test]
    fn test_raw_lines_empty() {
        assert_eq!(raw_lines(&result(vec![])), "");
    }

    #[test]
    fn test_bar_chart_scaling() {
        let lines = bar_chart(&result(vec![pick("rice", 100.0), pick("chickpea", 50.0), pick("jute", 0.0)]), 10);
        assert_eq!(lines[0].bar, "██████████");
        assert_eq!(lines[1].bar, "█████░░░░░");
        assert_eq!(lines[2].bar, "░░░░░░░░░░");
        assert_eq!(lines[0].label, "rice    ");
        assert_eq!(lines[1].label, "chickpea");
    }

    #[test]
    fn test_bar_chart_clamps_out_of_range() {
        let lines = bar_chart(&result(vec![pick("rice", 140.0), pick("jute", -5.0)]), 4);
        assert_eq!(lines[0].bar, "████");
        assert_eq!(lines[1].bar, "░░░░");
    }

    #[test]
    fn test_provenance_line() {
        let meta = RainfallProvenance {
            source: "Open-Meteo".to_string(),
            value_used: Some(202.93),
        };
        assert_eq!(provenance_line(&meta), "Rainfall: 202.9 mm (Open-Meteo)");

        let meta = RainfallProvenance {
            source: "unknown".to_string(),
            value_used: None,
        };
        assert_eq!(provenance_line(&meta), "Rainfall: not used (unknown)");
    }

    #[test]
    fn test_json_skips_absent_fields() {
        let json = to_json(&result(vec![pick("rice", 95.0)]));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["recommendations"][0]["crop"], "rice");
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn test_json_mode_selected() {
        let args = Args {
            json: true,
            raw: true,
            ..Default::default()
        };
        assert_eq!(OutputFormatter::new(&args).mode(), OutputMode::Json);
    }
}
