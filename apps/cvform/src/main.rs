use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvform::config::Config;
use cvform::draft::FileSlot;
use cvform::models::FormState;
use cvform::render::JsonFileRenderer;
use cvform::ui::TracingUi;
use cvform::upload::FilePhoto;
use cvform::validation::SystemClock;
use cvform::FormSession;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV form engine v{}", env!("CARGO_PKG_VERSION"));

    let slot = FileSlot::open(&config.draft_dir)?;
    info!("Draft slot at {}", config.draft_dir.display());
    let mut session = FormSession::start(slot, TracingUi, Arc::new(SystemClock))?;

    if let Some(input) = &config.input {
        let raw = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read form snapshot {}", input.display()))?;
        let form: FormState = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid form snapshot", input.display()))?;
        session.import(form);
    }

    if let Some(photo) = &config.photo {
        // Rejections are already reported through the UI; keep going without a photo.
        if let Err(e) = session.upload_photo(&FilePhoto::new(photo)).await {
            warn!("Photo not attached: {e}");
        }
    }

    session.set_consent(config.consent);
    session.save_draft()?;

    let progress = session.progress();
    info!("{} ({:.0}%)", progress.caption(), progress.percent);

    if !config.consent {
        info!("Consent not given (set CVFORM_CONSENT=true); draft kept, no document generated");
        return Ok(());
    }

    let mut renderer = JsonFileRenderer::new(&config.output_dir);
    session.generate(&mut renderer)?;
    Ok(())
}
