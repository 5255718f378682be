use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::audio::AudioDeck;
use crate::backdrop::Backdrop;
use crate::catalog::{CatalogGateway, FileCatalog};
use crate::sync::{MediaEvent, Player, Synchronizer};
use crate::transport::{ControlCmd, spawn_transport};
use crate::tween::{SharedTimeline, Tween, TweenHandle};

mod event_loop;
mod fetch;
mod logging;
mod settings;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut settings, config_problem) = settings::load_settings();
    if let Some(path) = env::args_os().nth(1) {
        settings.catalog.path = PathBuf::from(path);
    }

    let log_path = logging::init(&settings.logging);
    if let Some(problem) = config_problem {
        warn!(%problem, "using default settings");
    }
    info!(
        catalog = %settings.catalog.path.display(),
        log = ?log_path,
        "starting beatcard"
    );

    let (media_tx, media_rx) = mpsc::channel::<MediaEvent>();
    let (catalog_tx, catalog_rx) = mpsc::channel::<fetch::CatalogResult>();
    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();

    let gateway: Arc<dyn CatalogGateway> = Arc::new(FileCatalog::new(settings.catalog.path.clone()));

    let deck = AudioDeck::new(media_tx.clone(), &settings.audio);
    let backdrop = Backdrop::new(media_tx.clone(), settings.video.ready_delay());
    let backdrop_info = backdrop.handle();
    let tween: TweenHandle = Arc::new(Mutex::new(Tween::new(
        settings.transition.duration(),
        settings.transition.delay(),
    )));

    let sync = Synchronizer::new(
        Box::new(deck.remote()),
        Box::new(backdrop),
        Box::new(SharedTimeline::new(tween.clone())),
        Box::new(fetch::Fetcher::new(gateway.clone(), media_tx)),
    );
    let mut player = Player::new(sync);

    let transport = spawn_transport(control_tx, &settings.transport);
    fetch::spawn_track_load(gateway, catalog_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let channels = event_loop::Channels {
            media: media_rx,
            catalog: catalog_rx,
            control: control_rx,
        };
        let surfaces = event_loop::Surfaces {
            tween: &tween,
            backdrop: &backdrop_info,
            transport: &transport,
        };
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut player,
            &channels,
            &surfaces,
            &mut state,
        )
    })();

    deck.shutdown();
    drop(transport);
    info!("beatcard stopped");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
