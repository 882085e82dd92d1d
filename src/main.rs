use std::path::Path;

use tracing_subscriber::EnvFilter;

use survey_report::{ReportConfig, Result, SurveyModel};

const CONFIG_ENV: &str = "SURVEY_REPORT_CONFIG";
const PASSWORD_ENV: &str = "SURVEY_REPORT_PASSWORD";
const DEFAULT_CONFIG: &str = "survey-report.toml";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => ReportConfig::from_file(path)?,
        Err(_) if Path::new(DEFAULT_CONFIG).is_file() => ReportConfig::from_file(DEFAULT_CONFIG)?,
        Err(_) => {
            tracing::info!("No config file, using built-in defaults");
            ReportConfig::default()
        }
    };

    let mut model = SurveyModel::new(config);
    model.login(&std::env::var(PASSWORD_ENV).unwrap_or_default())?;

    let selection = model.full_selection()?;
    let html = model.report_html(&selection)?;
    println!("{html}");
    Ok(())
}
