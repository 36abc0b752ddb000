mod bootstrap;
mod render;

use anyhow::{bail, Result};
use engage_core::settings::Settings;
use engage_data::analysis::{analyze_sessions, BucketSelection};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("engage-report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Buckets: {}",
        settings.view,
        settings.format,
        settings.buckets
    );

    let data_path = match settings.data_path.clone() {
        Some(path) => path,
        None => match bootstrap::discover_data_path() {
            Some(path) => {
                tracing::info!("Using discovered data path {}", path.display());
                path
            }
            None => bail!(
                "no data path given and none of ./sessions.csv, \
                 ./data/sessions.csv or ./data exist"
            ),
        },
    };

    let selection = BucketSelection::from_settings(&settings)?;
    let report = analyze_sessions(&data_path, &selection)?;

    let output = match settings.format.as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        _ => render::render_text(&report, &settings.view),
    };
    println!("{}", output);

    Ok(())
}
