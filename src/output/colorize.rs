use colored::{ColoredString, Colorize};

pub struct ColorScheme;

impl ColorScheme {
    /// Success message (green)
    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    /// Muted text (bright black/gray)
    pub fn muted(text: &str) -> ColoredString {
        text.bright_black()
    }

    /// Section heading (bold cyan)
    pub fn heading(text: &str) -> ColoredString {
        text.cyan().bold()
    }

    /// Highlighted value (bold green)
    pub fn highlight(text: &str) -> ColoredString {
        text.green().bold()
    }

    /// Bold text
    pub fn bold(text: &str) -> ColoredString {
        text.bold()
    }

    /// Color for a confidence bar, from strong (green) to weak (red)
    pub fn confidence(text: &str, value: f64) -> ColoredString {
        if value >= 70.0 {
            text.green()
        } else if value >= 40.0 {
            text.yellow()
        } else {
            text.red()
        }
    }

    /// Print an error indicator
    pub fn print_error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning indicator
    pub fn print_warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info indicator
    pub fn print_info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }
}
