//! ABB: a side-on chase demo
//!
//! Game content ships as a single zip package. The content provider exposes
//! it through `content://` identifiers (plain files stay reachable through
//! `file://`), and enemies are configured from key-value parameter files
//! inside the package.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use abb::content::{self, ContentConfig, ContentProvider, ContentUri};
use abb::game::runtime::{PlayState, PlayerInput};
use macroquad::prelude::*;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("ABB v{}", VERSION),
        window_width: 960,
        window_height: 540,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Load the configured enemy into `state` through the installed provider
fn spawn_configured_enemy(state: &mut PlayState, config: &ContentConfig, position: Vec2) {
    let uri = match ContentUri::parse(&config.enemy) {
        Ok(uri) => uri,
        Err(e) => {
            log::error!("Bad enemy identifier '{}': {}", config.enemy, e);
            return;
        }
    };
    let spawned = content::with_provider(|provider| {
        if !provider.exists(&uri) {
            log::warn!("Enemy resource {} is not in the content package", uri);
        }
        state.spawn_enemy(provider, &uri, position)
    });
    match spawned {
        Some(Ok(())) => {}
        Some(Err(e)) => log::error!("Failed to load enemy {}: {}", uri, e),
        None => log::error!("No content provider installed"),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ContentConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default content config: {}", e);
            ContentConfig::default()
        }
    };
    log::info!("ABB v{} starting, package {}", VERSION, config.package_path.display());

    content::install(ContentProvider::initialize(&config));
    if let Some(Some(entries)) = content::with_provider(|p| p.list(&ContentUri::content("/"))) {
        log::info!("Content package holds {} entries", entries.len());
    }

    let mut state = PlayState::new(vec2(120.0, 200.0));
    spawn_configured_enemy(&mut state, &config, vec2(600.0, 200.0));

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) {
            state.respawn_player();
            spawn_configured_enemy(&mut state, &config, vec2(600.0, 200.0));
        }
        if is_key_pressed(KeyCode::E) {
            spawn_configured_enemy(&mut state, &config, vec2(screen_width() - 80.0, 200.0));
        }

        state.update(PlayerInput::from_keyboard(), get_frame_time());
        state.draw();

        next_frame().await;
    }

    content::shutdown();
}
