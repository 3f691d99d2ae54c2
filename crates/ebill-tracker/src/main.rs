mod bootstrap;

use anyhow::{Context, Result};
use tracker_core::config::TrackerConfig;
use tracker_core::settings::Settings;
use tracker_core::time_utils::TimezoneHandler;
use tracker_data::appliance_store::ApplianceStore;
use tracker_data::store::ReadingStore;
use tracker_ui::app::{App, Tab};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    let data_dir = settings.resolve_data_dir();

    bootstrap::ensure_directories(&data_dir)?;
    let log_file = bootstrap::log_file_path(settings.log_file.as_ref(), &data_dir);
    bootstrap::setup_logging(&settings.log_level, &log_file)?;

    tracing::info!("E-Bill Tracker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data dir: {}, View: {}, Theme: {}, Timezone: {}",
        data_dir.display(),
        settings.view,
        settings.theme,
        settings.timezone
    );

    let config_path = TrackerConfig::path_in(&data_dir);
    let mut config = TrackerConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if let Some(rate) = settings.unit_rate {
        config = config.with_unit_rate(rate)?;
        config.save_to(&config_path)?;
        tracing::info!("unit rate set to {}", rate);
    }

    let store = ReadingStore::in_dir(&data_dir, &config);
    let appliances = ApplianceStore::in_dir(&data_dir);
    let today = TimezoneHandler::new(&settings.timezone).today();

    let app = App::new(
        &config,
        store,
        appliances,
        &settings.theme,
        settings.timezone.clone(),
        today,
        Tab::from_name(&settings.view),
    );

    // The loop exits on Ctrl+C / Ctrl+Q, or 'q' on the read-only tabs.
    app.run()?;

    tracing::info!("E-Bill Tracker exiting");
    Ok(())
}
