//! Store types: `PlaylistState` and the `Action`s it reduces.

use crate::catalog::Track;

/// Actions accepted by the playlist reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the playlist and rewind to the first track.
    SetPlaylist(Vec<Track>),
    Play,
    Pause,
    /// Advance one track, wrapping to the first.
    NextTrack,
    /// Step back one track, wrapping to the last.
    PrevTrack,
    /// Jump to the given index; ignored when out of range.
    SelectTrack(usize),
    /// Mark that the current track was changed by the user.
    Seeked,
    /// Clear the seeked mark.
    Reset,
}

impl Action {
    /// Short name used in log lines (avoids dumping whole playlists).
    pub fn label(&self) -> &'static str {
        match self {
            Action::SetPlaylist(_) => "set-playlist",
            Action::Play => "play",
            Action::Pause => "pause",
            Action::NextTrack => "next-track",
            Action::PrevTrack => "prev-track",
            Action::SelectTrack(_) => "select-track",
            Action::Seeked => "seeked",
            Action::Reset => "reset",
        }
    }
}

/// Playlist position and transport intent.
///
/// `is_playing` is what the user asked for, not what the media elements are
/// doing; the synchronizer reconciles the two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistState {
    tracks: Vec<Track>,
    current_index: usize,
    is_playing: bool,
    seeked: bool,
}

fn set_flag(flag: &mut bool, value: bool) -> bool {
    let changed = *flag != value;
    *flag = value;
    changed
}

impl PlaylistState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The track at `current_index`, or `None` while the playlist is empty.
    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn seeked(&self) -> bool {
        self.seeked
    }

    /// Apply `action`. Returns whether anything changed.
    ///
    /// Actions whose precondition does not hold (e.g. `Play` on an empty
    /// playlist) are no-ops.
    pub fn reduce(&mut self, action: Action) -> bool {
        let len = self.tracks.len();
        match action {
            Action::SetPlaylist(tracks) => {
                self.tracks = tracks;
                self.current_index = 0;
                true
            }
            Action::Play => len > 0 && set_flag(&mut self.is_playing, true),
            Action::Pause => set_flag(&mut self.is_playing, false),
            Action::NextTrack => {
                if len == 0 {
                    return false;
                }
                self.move_to((self.current_index + 1) % len)
            }
            Action::PrevTrack => {
                if len == 0 {
                    return false;
                }
                self.move_to((self.current_index + len - 1) % len)
            }
            Action::SelectTrack(index) => index < len && self.move_to(index),
            Action::Seeked => set_flag(&mut self.seeked, true),
            Action::Reset => set_flag(&mut self.seeked, false),
        }
    }

    fn move_to(&mut self, index: usize) -> bool {
        let changed = self.current_index != index;
        self.current_index = index;
        changed
    }
}
