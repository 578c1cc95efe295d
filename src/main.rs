use clap::Parser;
use pinpoint_core::LocateRequest;
use pinpoint_cv::strategy::StrategyKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod pipeline;

/// Locate a UI target in a screenshot
#[derive(Parser, Debug)]
#[command(name = "pinpoint")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Screenshot to search
    screenshot: PathBuf,

    /// Text to look for (template strategies use their configured image)
    target: String,

    /// Grounding configuration (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Strategy order, overriding the configuration
    #[arg(long = "strategy", short = 's', value_parser = parse_kind)]
    strategies: Vec<StrategyKind>,

    /// Recorded text detections (JSON) for the OCR strategies
    #[arg(long, short = 'd')]
    detections: Option<PathBuf>,

    /// Template image file, instead of searching template directories
    #[arg(long, short = 't')]
    template: Option<PathBuf>,

    /// Template search directory (repeatable)
    #[arg(long)]
    template_dir: Vec<PathBuf>,

    /// Template threshold override
    #[arg(long)]
    threshold: Option<f64>,

    /// Fuzzy similarity threshold override
    #[arg(long)]
    fuzzy_threshold: Option<f64>,

    #[arg(long)]
    exact: bool,

    #[arg(long)]
    case_sensitive: bool,

    /// Save a marked copy of the screenshot into this directory
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn parse_kind(s: &str) -> Result<StrategyKind, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
        format!("unknown strategy '{s}' (template, adaptive_template, ocr, fuzzy_ocr, vision)")
    })
}

impl Args {
    fn request(&self) -> LocateRequest {
        let mut request = LocateRequest::new(self.target.clone())
            .case_sensitive(self.case_sensitive)
            .exact(self.exact);
        request.threshold = self.threshold;
        request.fuzzy_threshold = self.fuzzy_threshold;
        request
    }

    fn into_options(self) -> pipeline::PipelineOptions {
        pipeline::PipelineOptions {
            request: self.request(),
            screenshot: self.screenshot,
            config: self.config,
            strategies: self.strategies,
            detections: self.detections,
            template: self.template,
            template_dirs: self.template_dir,
            annotate: self.annotate,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let json = args.json;
    let outcome = match pipeline::run(&args.into_options()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Grounding failed: {e:#}");
            return ExitCode::from(2);
        }
    };

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to encode result: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        match &outcome.result {
            Some(result) => println!(
                "Found at {} by {} (confidence: {})",
                result.point, result.strategy, result.confidence
            ),
            None => println!("Target not found"),
        }
        if let Some(path) = &outcome.annotated {
            println!("Annotated screenshot: {}", path.display());
        }
    }

    if outcome.result.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
