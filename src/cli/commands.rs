//! CLI Command Implementations
//!
//! Each command drives a `Session` with the headless `WavProvider`, the
//! same way an interactive front end would: load, pump provider events,
//! drag the region, then play or classify.

use std::path::Path;

use log::{info, warn};

use crate::classify::HttpClassifier;
use crate::cli::RegionArgs;
use crate::config::Settings;
use crate::engine::{format_time, AudioSource, RegionBounds, WavProvider};
use crate::error::Result;
use crate::present::ResultView;
use crate::session::{Session, SessionNotice};

/// Print clip details and the initial region.
pub fn inspect(path: &Path, settings: &Settings) -> Result<()> {
    let settings = Settings {
        autoplay_on_ready: false,
        ..settings.clone()
    };
    let Some(session) = open_session(path, &settings)? else {
        return Ok(());
    };

    if let Some(source) = session.source() {
        println!("File:     {}", source.name());
        println!("Type:     {}", source.mime_type());
        println!("Size:     {} bytes", source.len());
        println!("URL:      {}", source.url());
    }
    match (session.duration(), session.region_labels()) {
        (Some(duration), Some((start, end))) => {
            println!("Duration: {} ({:.3}s)", format_time(duration), duration);
            println!("Region:   {} - {}", start, end);
        }
        _ => println!("Duration: unknown (no region)"),
    }
    Ok(())
}

/// Play the selected region headlessly, printing each cursor update.
pub fn preview(path: &Path, region: RegionArgs, tick_ms: u64, settings: &Settings) -> Result<()> {
    let settings = Settings {
        autoplay_on_ready: true,
        ..settings.clone()
    };
    let Some(mut session) = open_session(path, &settings)? else {
        return Ok(());
    };
    select_region(&mut session, region, &settings);

    let Some(duration) = session.duration() else {
        println!("Nothing to play");
        return Ok(());
    };
    if !session.playback_state().is_playing {
        session.toggle_playback();
    }

    let tick = (tick_ms.max(1) as f64) / 1000.0;
    let max_ticks = (duration / tick).ceil() as usize + 2;
    for _ in 0..max_ticks {
        if !session.playback_state().is_playing {
            break;
        }
        if let Some(provider) = session.provider_mut() {
            provider.advance(tick);
        }
        for notice in session.pump() {
            match notice {
                SessionNotice::CursorMoved(cursor) => {
                    println!("{:>6}  x={:.1}px", cursor.label, cursor.x_px);
                }
                SessionNotice::PlaybackStopped { at } => {
                    println!("Stopped at {}", format_time(at));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Classify the selected region and print the result.
pub fn classify(
    path: &Path,
    region: RegionArgs,
    json: bool,
    settings: &Settings,
) -> Result<()> {
    let settings = Settings {
        autoplay_on_ready: false,
        ..settings.clone()
    };
    let Some(mut session) = open_session(path, &settings)? else {
        return Ok(());
    };
    select_region(&mut session, region, &settings);

    if let Some((start, end)) = session.region_labels() {
        info!("Classifying region {} - {}", start, end);
    }

    let client = HttpClassifier::from_settings(&settings);
    let Some(result) = session.submit(&client)? else {
        println!("Nothing to classify: the clip has no region");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", ResultView::from_result(result).render(settings.bar_width));
    }
    Ok(())
}

/// Load `path` into a fresh session and process the provider's ready event.
///
/// Returns `Ok(None)` for files that are not audio; they are ignored.
fn open_session(path: &Path, settings: &Settings) -> Result<Option<Session<WavProvider>>> {
    let Some(source) = AudioSource::open(path)? else {
        println!("Ignoring {}: not an audio file", path.display());
        return Ok(None);
    };

    let mut session = Session::new(settings);
    session.load_source(source, WavProvider::new())?;
    session.pump();
    Ok(Some(session))
}

/// Drag the region to the requested bounds, if any were given.
fn select_region(session: &mut Session<WavProvider>, region: RegionArgs, settings: &Settings) {
    if region.start.is_none() && region.end.is_none() {
        return;
    }
    let start = region.start.unwrap_or(0.0);
    let end = region.end.unwrap_or(start + settings.default_region_secs);

    let accepted = session
        .provider_mut()
        .map(|provider| provider.drag_region(RegionBounds::new(start, end)))
        .unwrap_or(false);
    if !accepted {
        warn!("Region {:.3}s..{:.3}s could not be applied", start, end);
        return;
    }

    for notice in session.pump() {
        if let SessionNotice::RegionCommitted(committed) = notice {
            info!(
                "Region set to {:.3}s..{:.3}s",
                committed.start(),
                committed.end()
            );
        }
    }
}
