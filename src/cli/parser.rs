//! Flexible argument parser for sensor readings and switches

use std::env;

use crate::validation::PartialReading;

#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Soil and climate readings, each optional until validated
    pub reading: PartialReading,

    /// Device latitude, overrides config
    pub latitude: Option<f64>,

    /// Device longitude, overrides config
    pub longitude: Option<f64>,

    /// Override configured service base URL
    pub base_url: Option<String>,

    /// Override request timeout in seconds
    pub timeout: Option<u64>,

    /// Output in JSON format
    pub json: bool,

    /// Output one `crop<TAB>confidence` line per pick
    pub raw: bool,

    /// Enable/disable colorized output
    /// None = default (enabled), Some(true) = --color, Some(false) = --no-color
    pub color: Option<bool>,

    /// Skip seasonal rainfall estimation
    pub no_enrich: bool,

    /// Skip the DNS-over-HTTPS retry
    pub no_fallback: bool,

    /// Query the service health endpoint instead of recommending
    pub health: bool,

    /// Show version
    pub version: bool,

    /// Generate shell completions
    pub completions: Option<String>,

    /// Verbose mode - debug logging and request details
    pub verbose: bool,

    /// Export example config template
    pub make_config: bool,

    /// Problems found while parsing (bad numbers, unknown flags)
    pub errors: Vec<String>,
}

impl Args {
    /// Parse the process arguments
    pub fn parse_flexible() -> Self {
        let raw_args: Vec<String> = env::args().skip(1).collect();
        Self::parse_args(raw_args)
    }

    pub(crate) fn parse_args(args: Vec<String>) -> Self {
        let mut result = Args::default();
        let mut i = 0;

        // Check environment variables
        if env::var("NO_COLOR").is_ok() {
            result.color = Some(false);
        }

        while i < args.len() {
            let arg = args[i].as_str();

            // --flag=value
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg, None),
            };

            match flag {
                // Readings
                "-N" | "--nitrogen" => {
                    result.reading.nitrogen = result.number(flag, next_value(&args, &mut i, inline))
                }
                "-P" | "--phosphorus" => {
                    result.reading.phosphorus =
                        result.number(flag, next_value(&args, &mut i, inline))
                }
                "-K" | "--potassium" => {
                    result.reading.potassium =
                        result.number(flag, next_value(&args, &mut i, inline))
                }
                "--ph" => result.reading.ph = result.number(flag, next_value(&args, &mut i, inline)),
                "-t" | "--temperature" => {
                    result.reading.temperature =
                        result.number(flag, next_value(&args, &mut i, inline))
                }
                "-H" | "--humidity" => {
                    result.reading.humidity = result.number(flag, next_value(&args, &mut i, inline))
                }
                "-m" | "--moisture" => {
                    result.reading.moisture = result.number(flag, next_value(&args, &mut i, inline))
                }
                "-r" | "--rainfall" => {
                    result.reading.rainfall = result.number(flag, next_value(&args, &mut i, inline))
                }

                // Location and endpoint
                "--lat" | "--latitude" => {
                    result.latitude = result.number(flag, next_value(&args, &mut i, inline))
                }
                "--lon" | "--longitude" => {
                    result.longitude = result.number(flag, next_value(&args, &mut i, inline))
                }
                "--base-url" => {
                    result.base_url = result.required(flag, next_value(&args, &mut i, inline))
                }
                "--timeout" => {
                    result.timeout = result
                        .required(flag, next_value(&args, &mut i, inline))
                        .and_then(|v| match v.parse() {
                            Ok(secs) => Some(secs),
                            Err(_) => {
                                result
                                    .errors
                                    .push(format!("Option '{}' expects whole seconds, got '{}'.", flag, v));
                                None
                            }
                        })
                }

                // Boolean flags
                "--json" => result.json = true,
                "--raw" => result.raw = true,
                "--no-color" => result.color = Some(false),
                "--color" => {
                    result.color = Some(inline.map(|v| v != "false" && v != "0").unwrap_or(true))
                }
                "--no-enrich" => result.no_enrich = true,
                "--no-fallback" => result.no_fallback = true,
                "--health" => result.health = true,
                "--make-config" => result.make_config = true,
                "-v" | "--verbose" => result.verbose = true,
                "--version" | "-V" => result.version = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--help-env" => {
                    print_help_env();
                    std::process::exit(0);
                }

                // Generate shell completions
                "--completions" => {
                    result.completions = result.required(flag, next_value(&args, &mut i, inline))
                }

                // Handle -N90 style short flags with attached values
                s if s.len() > 2 && is_short_value_flag(s) => {
                    let (short, value) = s.split_at(2);
                    let value = Some(value.to_string());
                    let parsed = result.number(short, value);
                    match short {
                        "-N" => result.reading.nitrogen = parsed,
                        "-P" => result.reading.phosphorus = parsed,
                        "-K" => result.reading.potassium = parsed,
                        "-t" => result.reading.temperature = parsed,
                        "-H" => result.reading.humidity = parsed,
                        "-m" => result.reading.moisture = parsed,
                        _ => result.reading.rainfall = parsed,
                    }
                }

                // Clustered boolean short flags like -vV
                s if s.starts_with('-')
                    && !s.starts_with("--")
                    && s.len() > 2
                    && s.chars().skip(1).all(|c| matches!(c, 'v' | 'V' | 'h')) =>
                {
                    for c in s.chars().skip(1) {
                        match c {
                            'v' => result.verbose = true,
                            'V' => result.version = true,
                            _ => {
                                print_help();
                                std::process::exit(0);
                            }
                        }
                    }
                }

                s if s.starts_with('-') => result.errors.push(format!("Unknown option '{}'.", s)),
                s => result.errors.push(format!("Unexpected argument '{}'.", s)),
            }

            i += 1;
        }

        result
    }

    fn required(&mut self, flag: &str, value: Option<String>) -> Option<String> {
        if value.is_none() {
            self.errors.push(format!("Option '{}' expects a value.", flag));
        }
        value
    }

    fn number(&mut self, flag: &str, value: Option<String>) -> Option<f64> {
        let value = self.required(flag, value)?;
        match value.trim().parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.errors
                    .push(format!("Option '{}' expects a number, got '{}'.", flag, value));
                None
            }
        }
    }
}

/// Value for the flag at `i`: the inline `=value` or the next argument
fn next_value(args: &[String], i: &mut usize, inline: Option<String>) -> Option<String> {
    if inline.is_some() {
        return inline;
    }
    let value = args.get(*i + 1)?.clone();
    *i += 1;
    Some(value)
}

fn is_short_value_flag(s: &str) -> bool {
    ["-N", "-P", "-K", "-t", "-H", "-m", "-r"]
        .iter()
        .any(|short| s.starts_with(short))
}

fn print_help_env() {
    println!(
        r#"agrisense - Environment Variables Reference

All configuration options can be set via environment variables with the AGRISENSE_ prefix.
These override config file values but are overridden by CLI arguments.

SERVICE:
    AGRISENSE_BASE_URL          Service base URL (default: http://localhost:5000)
    AGRISENSE_API_PATH          Recommendation path (default: /api/recommend)
    AGRISENSE_TIMEOUT           Request timeout in seconds (default: 30)
    AGRISENSE_CONNECT_TIMEOUT   Connect timeout in seconds (default: 30)
    AGRISENSE_DEPLOYMENT        production or self-signed (default: production)

NETWORK:
    AGRISENSE_RESOLVER          system or cloudflare (default: system)
    AGRISENSE_DNS_FALLBACK      Retry through DNS-over-HTTPS on failure (true/false)
    AGRISENSE_DOH_URL           DoH JSON endpoint (default: https://dns.google/resolve)

WEATHER:
    AGRISENSE_WEATHER_ENRICH    Estimate seasonal rainfall when none is given (true/false)
    AGRISENSE_ARCHIVE_URL       Open-Meteo archive endpoint

LOCATION:
    AGRISENSE_LATITUDE          Device latitude in degrees
    AGRISENSE_LONGITUDE         Device longitude in degrees

DISPLAY & LOGGING:
    NO_COLOR                    Disable colored output (standard env var)
    RUST_LOG                    Log filter (default: agrisense=warn)

EXAMPLES:
    # Talk to a self-hosted service with a self-signed certificate
    export AGRISENSE_BASE_URL=https://10.0.0.7:5000
    export AGRISENSE_DEPLOYMENT=self-signed

    # Fixed field position for rainfall estimation
    export AGRISENSE_LATITUDE=21.15
    export AGRISENSE_LONGITUDE=79.09
"#
    );
}

fn print_help() {
    println!(
        r#"agrisense - Crop recommendations from soil and climate readings

USAGE:
    agrisense [OPTIONS] -N <N> -P <P> -K <K> --ph <PH> -t <TEMP> -H <HUM> -m <MOIST>

READINGS:
    -N, --nitrogen <N>      Nitrogen content of the soil
    -P, --phosphorus <P>    Phosphorus content of the soil
    -K, --potassium <K>     Potassium content of the soil
        --ph <PH>           Soil pH (0-14)
    -t, --temperature <C>   Air temperature in degrees Celsius
    -H, --humidity <PCT>    Relative humidity in percent
    -m, --moisture <PCT>    Soil moisture in percent
    -r, --rainfall <MM>     Rainfall in millimeters (estimated when omitted)

OPTIONS:
        --lat <DEG>         Device latitude for rainfall estimation
        --lon <DEG>         Device longitude for rainfall estimation
        --base-url <URL>    Override the service base URL
        --timeout <SECS>    Override the request timeout
        --no-enrich         Don't estimate rainfall
        --no-fallback       Don't retry through DNS-over-HTTPS
        --health            Check that the service and its model are up
        --json              Output in JSON format
        --raw               Output crop<TAB>confidence lines
        --color             Enable colorized output (default)
        --no-color          Disable colorized output
        --make-config       Export example agrisense.toml to stdout
        --help-env          Show all environment variables
        --completions <SHELL>  Generate shell completions (bash, zsh, fish, powershell, elvish)
    -v, --verbose           Show debug logs
    -V, --version           Show version
    -h, --help              Show this help

Every option taking a value also accepts --option=value.

EXAMPLES:
    agrisense -N 90 -P 42 -K 43 --ph 6.5 -t 20.8 -H 82 -m 30
    agrisense -N90 -P42 -K43 --ph=6.5 -t20.8 -H82 -m30 -r 202.9
    agrisense --lat 21.15 --lon 79.09 -N 90 -P 42 -K 43 --ph 6.5 -t 20.8 -H 82 -m 30
    agrisense --health

CONFIGURATION:
    Configuration files are loaded from:
      1. ./agrisense.toml or ./.agrisense.toml (project local)
      2. ~/agrisense.toml (home directory)
      3. ~/.config/agrisense/config.toml (XDG config)

Run 'agrisense --help-env' for all environment variables.
"#
    );
}
