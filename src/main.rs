use clap::{Arg, Command};
use log::LevelFilter;
use phish_scorer::config::ScorerConfig;
use phish_scorer::detector::{DetectOptions, PhishingDetector, Verdict};
use phish_scorer::features::keyword_matcher;
use phish_scorer::message;
use phish_scorer::predictor::{CommandPredictor, ExternalPredictor, TimeoutPredictor};
use std::io::Read;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let matches = Command::new("phish-scorer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scores email text for phishing with a tunable heuristic model")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Text file to score (reads stdin when omitted or '-')"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phish-scorer.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and print a summary")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("PROBABILITY")
                .help("Override the configured threshold for this run")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("external-command")
                .long("external-command")
                .value_name("COMMAND")
                .help("External model: receives the text on stdin, prints a probability"),
        )
        .arg(
            Arg::new("external-timeout-ms")
                .long("external-timeout-ms")
                .value_name("MS")
                .help("Fall back to the heuristic if the external model is slower than this")
                .value_parser(clap::value_parser!(u64))
                .requires("external-command"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the verdict as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("explain")
                .long("explain")
                .help("Print per-feature contributions and extracted links")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json-lines")
                .long("json-lines")
                .help("Answer one JSON CHECK_EMAIL request per stdin line")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with_all(["input", "json", "explain"]),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phish-scorer.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        print_config_summary(config_path, &config);
        return;
    }

    let detector = PhishingDetector::new(config);
    let mut options = DetectOptions {
        threshold: matches.get_one::<f64>("threshold").copied(),
        use_external_model: false,
    };

    if let Some(command_line) = matches.get_one::<String>("external-command") {
        let command = match CommandPredictor::from_command_line(command_line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Invalid external command: {e}");
                process::exit(1);
            }
        };

        let predictor: Arc<dyn ExternalPredictor> =
            match matches.get_one::<u64>("external-timeout-ms") {
                Some(ms) => Arc::new(TimeoutPredictor::new(command, Duration::from_millis(*ms))),
                None => Arc::new(command),
            };
        detector.set_external_predictor(predictor);
        options.use_external_model = true;
    }

    if matches.get_flag("json-lines") {
        if let Err(e) = run_json_lines(&detector, &options).await {
            eprintln!("Error reading requests: {e}");
            process::exit(1);
        }
        return;
    }

    let text = match read_input(matches.get_one::<String>("input").map(String::as_str)) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    let verdict = detector.detect(Some(text.as_str()), &options).await;

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&verdict) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing verdict: {e}");
                process::exit(1);
            }
        }
    } else {
        print_verdict(&verdict);
    }

    if matches.get_flag("explain") {
        print_explanation(&detector, &verdict, &text);
    }
}

fn load_config(path: &str) -> anyhow::Result<ScorerConfig> {
    if std::path::Path::new(path).exists() {
        ScorerConfig::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(ScorerConfig::default())
    }
}

fn generate_default_config(path: &str) {
    let config = ScorerConfig::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn print_config_summary(path: &str, config: &ScorerConfig) {
    println!("🔍 Testing configuration: {path}");
    println!();
    println!("Default threshold: {}", config.threshold);
    if !(0.0..=1.0).contains(&config.threshold) {
        println!("⚠️  Threshold is outside [0, 1]; one label will never be produced");
    }
    println!(
        "Suspicious keywords: {} ({})",
        config.suspicious_keywords.len(),
        config.suspicious_keywords.join(", ")
    );
    println!(
        "Credential keywords: {} ({})",
        config.credential_keywords.len(),
        config.credential_keywords.join(", ")
    );
    let w = &config.weights;
    println!(
        "Weights: keyword={} credential={} url={} ip_in_url={} exclamation={} all_caps={} length={} offset={} length_cap={}",
        w.keyword, w.credential, w.url, w.ip_in_url, w.exclamation, w.all_caps, w.length, w.offset, w.length_cap
    );
    println!("✅ Configuration is valid");
}

fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    let bytes = match path {
        Some(path) if path != "-" => std::fs::read(path)?,
        _ => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn run_json_lines(detector: &PhishingDetector, defaults: &DetectOptions) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<message::CheckRequest>(&line) {
            Ok(mut request) => {
                // Command-line settings fill in whatever the request leaves out
                if request.threshold.is_none() {
                    request.threshold = defaults.threshold;
                }
                request.use_external_model |= defaults.use_external_model;
                message::handle_request(detector, &request).await
            }
            Err(_) => message::handle_line(detector, &line).await,
        };

        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}

fn print_verdict(verdict: &Verdict) {
    let icon = if verdict.is_phishing() { "🚨" } else { "✅" };
    println!("{icon} Label: {:?}", verdict.label);
    println!("Probability: {:.4}", verdict.probability);
    println!("Source: {:?}", verdict.source);
}

fn print_explanation(detector: &PhishingDetector, verdict: &Verdict, text: &str) {
    let config = detector.config();
    println!();

    let contributions = verdict.contributions(&config.weights);
    if contributions.is_empty() {
        println!("No feature breakdown (verdict came from {:?})", verdict.source);
    } else {
        println!("Feature contributions to the logit:");
        let mut logit = 0.0;
        for (name, value) in &contributions {
            println!("  {:<14} {:+.4}", name, value);
            logit += value;
        }
        println!("  {:<14} {:+.4}", "offset", -config.weights.offset);
        println!("  {:<14} {:+.4}", "total", logit - config.weights.offset);
    }

    let normalized = detector.feature_engine().normalize(text);
    let suspicious = keyword_matcher::matched_keywords(&normalized, &config.suspicious_keywords);
    let credentials = keyword_matcher::matched_keywords(&normalized, &config.credential_keywords);
    println!();
    println!("Suspicious keywords matched: {}", suspicious.join(", "));
    println!("Credential keywords matched: {}", credentials.join(", "));

    let links = detector.feature_engine().extract_links(text);
    if !links.is_empty() {
        println!();
        println!("Links:");
        for link in links {
            println!(
                "  {} (host: {}){}",
                link.url,
                link.domain.as_deref().unwrap_or("unknown"),
                if link.ip_literal { " [IP literal]" } else { "" }
            );
        }
    }
}
