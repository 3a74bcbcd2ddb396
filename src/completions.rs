//! Shell completions generation

use clap::{Arg, ArgAction, Command};
use clap_complete::{generate, Shell};
use std::io;

fn value_arg(id: &'static str, short: Option<char>, long: &'static str, help: &'static str, value: &'static str) -> Arg {
    let arg = Arg::new(id).long(long).help(help).value_name(value);
    match short {
        Some(c) => arg.short(c),
        None => arg,
    }
}

fn flag(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).help(help).action(ArgAction::SetTrue)
}

/// Build a clap Command for shell completions
/// This mirrors our custom parser's flags
fn build_cli() -> Command {
    Command::new("agrisense")
        .about("Crop recommendations from soil and climate readings")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(value_arg("nitrogen", Some('N'), "nitrogen", "Nitrogen content of the soil", "N"))
        .arg(value_arg("phosphorus", Some('P'), "phosphorus", "Phosphorus content of the soil", "P"))
        .arg(value_arg("potassium", Some('K'), "potassium", "Potassium content of the soil", "K"))
        .arg(value_arg("ph", None, "ph", "Soil pH (0-14)", "PH"))
        .arg(value_arg("temperature", Some('t'), "temperature", "Air temperature in degrees Celsius", "C"))
        .arg(value_arg("humidity", Some('H'), "humidity", "Relative humidity in percent", "PCT"))
        .arg(value_arg("moisture", Some('m'), "moisture", "Soil moisture in percent", "PCT"))
        .arg(value_arg("rainfall", Some('r'), "rainfall", "Rainfall in millimeters", "MM"))
        .arg(value_arg("lat", None, "lat", "Device latitude", "DEG"))
        .arg(value_arg("lon", None, "lon", "Device longitude", "DEG"))
        .arg(value_arg("base-url", None, "base-url", "Override the service base URL", "URL"))
        .arg(value_arg("timeout", None, "timeout", "Override the request timeout", "SECS"))
        .arg(flag("no-enrich", "no-enrich", "Don't estimate rainfall"))
        .arg(flag("no-fallback", "no-fallback", "Don't retry through DNS-over-HTTPS"))
        .arg(flag("health", "health", "Check that the service and its model are up"))
        .arg(flag("json", "json", "Output in JSON format"))
        .arg(flag("raw", "raw", "Output crop<TAB>confidence lines"))
        .arg(flag("color", "color", "Enable colorized output"))
        .arg(flag("no-color", "no-color", "Disable colorized output"))
        .arg(flag("make-config", "make-config", "Export example agrisense.toml to stdout"))
        .arg(flag("help-env", "help-env", "Show all environment variables"))
        .arg(
            Arg::new("completions")
                .long("completions")
                .help("Generate shell completions")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        )
        .arg(flag("verbose", "verbose", "Show debug logs").short('v'))
        .arg(flag("version", "version", "Show version").short('V'))
        .arg(flag("help", "help", "Show help").short('h'))
}

fn parse_shell(shell: &str) -> Option<Shell> {
    match shell.to_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "powershell" | "pwsh" => Some(Shell::PowerShell),
        "elvish" => Some(Shell::Elvish),
        _ => None,
    }
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: &str) {
    let Some(shell) = parse_shell(shell) else {
        eprintln!(
            "Unknown shell: {}. Supported: bash, zsh, fish, powershell, elvish",
            shell
        );
        return;
    };

    let mut cmd = build_cli();
    generate(shell, &mut cmd, "agrisense", &mut io::stdout());
}
