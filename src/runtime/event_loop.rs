use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::backdrop::{BackdropHandle, BackdropInfo};
use crate::config;
use crate::store::Action;
use crate::sync::{MediaEvent, Player};
use crate::transport::{ControlCmd, NowPlaying, TransportHandle};
use crate::tween::TweenHandle;
use crate::ui::{self, CardState, Scene};

use super::fetch::CatalogResult;

/// What a key press or a transport command asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Play,
    Pause,
    Next,
    Prev,
    SeekBack,
    SeekForward,
    Flip,
    CursorDown,
    CursorUp,
    Select,
    Quit,
}

impl From<ControlCmd> for Input {
    fn from(cmd: ControlCmd) -> Self {
        match cmd {
            ControlCmd::Quit => Self::Quit,
            ControlCmd::Play => Self::Play,
            ControlCmd::Pause => Self::Pause,
            ControlCmd::PlayPause => Self::Toggle,
            ControlCmd::Next => Self::Next,
            ControlCmd::Prev => Self::Prev,
        }
    }
}

pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Input::Quit),
            _ => None,
        };
    }
    let input = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Input::Toggle,
        KeyCode::Char('l') => Input::Next,
        KeyCode::Char('h') => Input::Prev,
        KeyCode::Char('H') => Input::SeekBack,
        KeyCode::Char('L') => Input::SeekForward,
        KeyCode::Char('f') => Input::Flip,
        KeyCode::Char('j') | KeyCode::Down => Input::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Input::CursorUp,
        KeyCode::Enter => Input::Select,
        KeyCode::Char('q') | KeyCode::Esc => Input::Quit,
        _ => return None,
    };
    Some(input)
}

/// Apply `input`. Returns `true` when the user asked to quit.
pub fn apply_input(player: &mut Player, card: &mut CardState, input: Input, seek_step: Duration) -> bool {
    match input {
        Input::Quit => return true,
        Input::Toggle => player.toggle(),
        Input::Play => player.play(),
        Input::Pause => player.pause(),
        Input::Next => player.next(),
        Input::Prev => player.previous(),
        Input::SeekBack => {
            let target = player.view().elapsed.saturating_sub(seek_step);
            player.seek_to(target);
        }
        Input::SeekForward => {
            let target = player.view().elapsed + seek_step;
            player.seek_to(target);
        }
        Input::Flip => {
            if !player.state().is_empty() {
                card.flip(player.state().current_index());
            }
        }
        Input::CursorDown => {
            if card.flipped {
                card.cursor_down(player.state().len());
            }
        }
        Input::CursorUp => {
            if card.flipped {
                card.cursor_up();
            }
        }
        Input::Select => {
            if let Some(index) = card.choose() {
                player.select(index);
            }
        }
    }
    false
}

/// Receiving ends of the worker channels.
pub struct Channels {
    pub media: Receiver<MediaEvent>,
    pub catalog: Receiver<CatalogResult>,
    pub control: Receiver<ControlCmd>,
}

/// Shared handles the loop reads from or publishes to.
pub struct Surfaces<'a> {
    pub tween: &'a TweenHandle,
    pub backdrop: &'a BackdropHandle,
    pub transport: &'a TransportHandle,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    pub card: CardState,
    /// Last projection handed to the transport.
    last_published: Option<(Option<NowPlaying>, bool)>,
}

/// Main terminal event loop: drains worker events into the player, drives
/// the transition clock, publishes to the transport and draws. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    player: &mut Player,
    channels: &Channels,
    surfaces: &Surfaces<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let seek_step = settings.audio.seek_step();

    loop {
        while let Ok(result) = channels.catalog.try_recv() {
            match result {
                Ok(tracks) => player.dispatch(Action::SetPlaylist(tracks)),
                Err(err) => warn!(%err, "playlist could not be loaded"),
            }
        }

        while let Ok(event) = channels.media.try_recv() {
            player.handle(event);
        }

        // The lock is released before the player runs; the timeline it
        // drives shares this tween.
        let finished = surfaces
            .tween
            .lock()
            .ok()
            .and_then(|mut t| t.tick(Instant::now()));
        if let Some(direction) = finished {
            debug!(?direction, "transition finished");
            player.handle(MediaEvent::TransitionFinished(direction));
        }

        while let Ok(cmd) = channels.control.try_recv() {
            debug!(?cmd, "transport command");
            if apply_input(player, &mut state.card, cmd.into(), seek_step) {
                info!("quit requested over transport");
                return Ok(());
            }
        }

        publish(surfaces.transport, player, &settings.transport, state);

        let backdrop = match surfaces.backdrop.lock() {
            Ok(mut info) => {
                info.advance();
                info.clone()
            }
            Err(_) => BackdropInfo::default(),
        };
        let opacity = surfaces.tween.lock().map_or(0.0, |t| t.opacity());

        let scene = Scene {
            state: player.state(),
            playback: player.view(),
            card: &state.card,
            backdrop: &backdrop,
            opacity,
            ui: &settings.ui,
            seek_step_seconds: settings.audio.seek_step_seconds,
        };
        terminal.draw(|f| ui::draw(f, &scene))?;

        if event::poll(settings.ui.tick())? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(input) = map_key(key) else {
                    continue;
                };
                if apply_input(player, &mut state.card, input, seek_step) {
                    info!("quit requested");
                    return Ok(());
                }
            }
        }
    }
}

fn publish(
    transport: &TransportHandle,
    player: &Player,
    settings: &config::TransportSettings,
    state: &mut EventLoopState,
) {
    let now = player.now_playing(settings);
    let snapshot = (now, player.state().is_playing());
    if state.last_published.as_ref() != Some(&snapshot) {
        transport.publish(snapshot.0.as_ref(), snapshot.1);
        state.last_published = Some(snapshot);
    }
}
