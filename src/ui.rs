//! Terminal rendering of the player card.
//!
//! The card has two faces: the front shows the current beat, its sample
//! credit and progress; the back lists the playlist. Behind the card, the
//! backdrop area fades in with the transition tween.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::backdrop::BackdropInfo;
use crate::config::UiSettings;
use crate::store::PlaylistState;
use crate::sync::{PlaybackView, SampleView};

pub const LOADING_TEXT: &str = "Loading media...";
pub const NO_SAMPLE_TEXT: &str = "No identifiable sample information for this beat.";

const CARD_WIDTH: u16 = 60;
const CARD_HEIGHT: u16 = 12;
const BACKDROP_BASE: (u8, u8, u8) = (72, 36, 110);

/// Which face of the card is up, and the playlist cursor on the back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CardState {
    pub flipped: bool,
    pub cursor: usize,
}

impl CardState {
    /// Turn the card over. Showing the back puts the cursor on the current
    /// track.
    pub fn flip(&mut self, current: usize) {
        self.flipped = !self.flipped;
        if self.flipped {
            self.cursor = current;
        }
    }

    pub fn cursor_down(&mut self, len: usize) {
        if len > 0 && self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// The index to select from the back face; shows the front again.
    pub fn choose(&mut self) -> Option<usize> {
        if !self.flipped {
            return None;
        }
        self.flipped = false;
        Some(self.cursor)
    }
}

/// Everything a frame needs, borrowed from the runtime.
pub struct Scene<'a> {
    pub state: &'a PlaylistState,
    pub playback: &'a PlaybackView,
    pub card: &'a CardState,
    pub backdrop: &'a BackdropInfo,
    pub opacity: f32,
    pub ui: &'a UiSettings,
    pub seek_step_seconds: u64,
}

/// Format a `Duration` as `m:ss`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn progress_label(elapsed: Duration, total: Option<Duration>) -> String {
    match total {
        Some(total) => format!("{} / {}", format_duration(elapsed), format_duration(total)),
        None => format_duration(elapsed),
    }
}

fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(total) if !total.is_zero() => {
            (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Backdrop tint for the given transition opacity. A playing backdrop
/// shimmers slowly with its frame clock.
pub fn backdrop_color(opacity: f32, frame: u64, playing: bool) -> Color {
    let pulse = if playing {
        0.85 + 0.15 * ((frame as f32) * 0.12).sin()
    } else {
        1.0
    };
    let k = (opacity.clamp(0.0, 1.0) * pulse).clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * k).round() as u8;
    Color::Rgb(
        scale(BACKDROP_BASE.0),
        scale(BACKDROP_BASE.1),
        scale(BACKDROP_BASE.2),
    )
}

/// The sample line(s) on the front face.
fn sample_lines(sample: &SampleView) -> Vec<Line<'static>> {
    match sample {
        SampleView::Pending => vec![Line::from(Span::styled(
            "Identifying sample...",
            Style::default().add_modifier(Modifier::DIM),
        ))],
        SampleView::NoSample => vec![Line::from(NO_SAMPLE_TEXT)],
        SampleView::Resolved(meta) => {
            let mut lines = Vec::new();
            match meta.credit() {
                Some(credit) => lines.push(Line::from(format!("Samples {credit}"))),
                None => lines.push(Line::from(NO_SAMPLE_TEXT)),
            }
            let dim = Style::default().add_modifier(Modifier::DIM);
            if let Some(link) = meta.external_uri.as_deref().filter(|u| !u.is_empty()) {
                lines.push(Line::from(Span::styled(format!("[link] {link}"), dim)));
            }
            if let Some(art) = &meta.album_art_uri {
                lines.push(Line::from(Span::styled(format!("[art] {art}"), dim)));
            }
            lines
        }
    }
}

fn controls_text(seek_step_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_step_seconds}s"),
        "[f] flip".to_string(),
        "[j/k] cursor".to_string(),
        "[enter] select".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width.saturating_sub(2)).max(10).min(r.width);
    let height = height.min(r.height.saturating_sub(2)).max(5).min(r.height);

    Rect {
        x: r.x + (r.width.saturating_sub(width) / 2),
        y: r.y + (r.height.saturating_sub(height) / 2),
        width,
        height,
    }
}

/// Render the whole screen.
pub fn draw(frame: &mut Frame, scene: &Scene<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(scene.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" beatcard ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let tint = backdrop_color(scene.opacity, scene.backdrop.frame, scene.backdrop.playing);
    frame.render_widget(
        Block::default().style(Style::default().bg(tint)),
        chunks[1],
    );

    let card_area = centered_rect_sized(CARD_WIDTH, CARD_HEIGHT, chunks[1]);
    frame.render_widget(Clear, card_area);
    if scene.state.is_empty() {
        draw_loading(frame, card_area);
    } else if scene.card.flipped {
        draw_back(frame, card_area, scene);
    } else {
        draw_front(frame, card_area, scene);
    }

    let footer = Paragraph::new(controls_text(scene.seek_step_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);
}

fn draw_loading(frame: &mut Frame, area: Rect) {
    let loading = Paragraph::new(LOADING_TEXT)
        .alignment(Alignment::Center)
        .block(Block::bordered().padding(Padding::top(area.height.saturating_sub(3) / 2)));
    frame.render_widget(loading, area);
}

fn draw_front(frame: &mut Frame, area: Rect, scene: &Scene<'_>) {
    let Some(track) = scene.state.current_track() else {
        return;
    };

    let status = if scene.state.is_playing() {
        "Playing"
    } else {
        "Paused"
    };
    let block = Block::bordered()
        .title(format!(
            " {}/{} ",
            scene.state.current_index() + 1,
            scene.state.len()
        ))
        .title_bottom(Line::from(format!(" {status} ")).right_aligned())
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(2),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        track.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    let sample = Paragraph::new(sample_lines(&scene.playback.sample))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(sample, rows[1]);

    let elapsed = scene.playback.elapsed;
    let total = scene.playback.duration;
    let gauge = LineGauge::default()
        .ratio(progress_ratio(elapsed, total))
        .label(progress_label(elapsed, total))
        .filled_style(Style::default().fg(Color::Magenta))
        .unfilled_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(gauge, rows[2]);
}

fn draw_back(frame: &mut Frame, area: Rect, scene: &Scene<'_>) {
    let current = scene.state.current_index();
    let items: Vec<ListItem> = scene
        .state
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if i == current { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", track.title))
        })
        .collect();

    let list = List::new(items)
        .block(Block::bordered().title(" playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(scene.card.cursor.min(scene.state.len().saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut list_state);
}
