use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use folio_kit::{
    draft::Fields, Cache, ConsentGate, Debounce, FormDraft, Limiter, Settings, Throttle,
};
use tokio::time;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let settings = Settings::from_env()?;

    replay_events(&settings).await;

    let cache = Cache::new(settings.open_store()?);

    let consent = ConsentGate::new(&cache, settings.consent_key.as_str());
    if consent.needs_consent() {
        info!("cookie consent needed");
        consent.record(true);
    }

    let draft = FormDraft::new(&cache, settings.form_key.as_str());
    let mut form: Fields = ["name", "email", "message"]
        .into_iter()
        .map(|field| (field.to_string(), String::new()))
        .collect();
    let restored = draft.restore_into(&mut form);
    info!(restored, "contact form loaded");

    for (field, value) in [("name", "Ada"), ("email", "ada@example.com")] {
        form.insert(field.to_string(), value.to_string());
        draft.record(&form);
    }
    info!(saved = ?draft.saved(), "draft after typing");

    draft.clear();
    info!(saved = ?draft.saved(), "draft after submit");

    Ok(())
}

/// Feeds one second of scroll events and a resize drag through the limiters.
async fn replay_events(settings: &Settings) {
    let scrolls = Arc::new(AtomicUsize::new(0));
    let resizes = Arc::new(AtomicUsize::new(0));

    let handled = scrolls.clone();
    let on_scroll = Throttle::init(settings.scroll_throttle(), move |offset: u32| {
        handled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(offset, "scroll handled");
    });

    let handled = resizes.clone();
    let on_resize = Debounce::init(settings.resize_debounce(), move |(w, h): (u32, u32)| {
        handled.fetch_add(1, Ordering::Relaxed);
        info!(width = w, height = h, "layout recomputed");
    });

    for offset in 0..1000 {
        on_scroll.call(offset);
        time::sleep(Duration::from_millis(1)).await;
    }

    for step in 0..20 {
        on_resize.call((800 + step * 10, 600));
        time::sleep(Duration::from_millis(20)).await;
    }
    time::sleep(settings.resize_debounce() * 2).await;

    info!(
        scroll_events = 1000,
        scroll_handled = scrolls.load(Ordering::Relaxed),
        resize_events = 20,
        resize_handled = resizes.load(Ordering::Relaxed),
        "replay finished"
    );
}
