use super::*;
use crate::catalog::{SampleMetadata, SampleRef, Track, TrackId};
use crate::error::{Medium, PlayerError};
use crate::store::Action;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    AudioLoad(String),
    AudioPlay,
    AudioPause,
    AudioSeek(Duration),
    VideoLoad(String),
    VideoPlay,
    VideoPause,
    Forward,
    Reverse,
    Restart,
    Lookup(SampleRequest, String),
}

/// Calls made on the mocks, in order, and the generation of the most
/// recent load.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<Call>>,
    generation: Cell<u64>,
}

impl Recorder {
    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

type Log = Rc<Recorder>;

struct MockAudio(Log);
struct MockVideo(Log);
struct MockTimeline(Log);
struct MockLookup(Log);

impl AudioElement for MockAudio {
    fn load(&mut self, source: &str, generation: u64) {
        self.0.generation.set(generation);
        self.0.push(Call::AudioLoad(source.to_string()));
    }
    fn play(&mut self) {
        self.0.push(Call::AudioPlay);
    }
    fn pause(&mut self) {
        self.0.push(Call::AudioPause);
    }
    fn seek(&mut self, position: Duration) {
        self.0.push(Call::AudioSeek(position));
    }
}

impl VideoElement for MockVideo {
    fn load(&mut self, source: &str, generation: u64) {
        self.0.generation.set(generation);
        self.0.push(Call::VideoLoad(source.to_string()));
    }
    fn play(&mut self) {
        self.0.push(Call::VideoPlay);
    }
    fn pause(&mut self) {
        self.0.push(Call::VideoPause);
    }
}

impl Timeline for MockTimeline {
    fn play_forward(&mut self) {
        self.0.push(Call::Forward);
    }
    fn reverse(&mut self) {
        self.0.push(Call::Reverse);
    }
    fn restart(&mut self) {
        self.0.push(Call::Restart);
    }
}

impl SampleLookup for MockLookup {
    fn request(&mut self, request: SampleRequest, reference_id: &str) {
        self.0.push(Call::Lookup(request, reference_id.to_string()));
    }
}

fn track(id: &str, sample: Option<&str>) -> Track {
    Track {
        id: TrackId::new(id),
        title: id.to_uppercase(),
        audio: format!("{id}.mp3"),
        video: format!("{id}.mp4"),
        sample: SampleRef::from_raw(sample),
    }
}

fn abc() -> Vec<Track> {
    vec![track("a", None), track("b", None), track("c", None)]
}

fn new_player() -> (Player, Log) {
    let log = Log::default();
    let sync = Synchronizer::new(
        Box::new(MockAudio(log.clone())),
        Box::new(MockVideo(log.clone())),
        Box::new(MockTimeline(log.clone())),
        Box::new(MockLookup(log.clone())),
    );
    (Player::new(sync), log)
}

/// Player with `tracks` loaded, the first video ready and the initial
/// reverse/pause sequence settled. The call log is cleared.
fn ready_player(tracks: Vec<Track>) -> (Player, Log) {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(tracks));
    player.handle(ready(&log));
    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    log.calls.borrow_mut().clear();
    (player, log)
}

fn take(log: &Log) -> Vec<Call> {
    std::mem::take(&mut *log.calls.borrow_mut())
}

/// Events as reported by the most recently loaded sources.
fn ready(log: &Log) -> MediaEvent {
    MediaEvent::VideoReady {
        generation: log.generation.get(),
    }
}

fn started(log: &Log) -> MediaEvent {
    MediaEvent::VideoStarted {
        generation: log.generation.get(),
    }
}

fn ended(log: &Log) -> MediaEvent {
    MediaEvent::AudioEnded {
        generation: log.generation.get(),
    }
}

fn progress(log: &Log, position: Duration, duration: Option<Duration>) -> MediaEvent {
    MediaEvent::AudioProgress {
        generation: log.generation.get(),
        position,
        duration,
    }
}

fn lookups(calls: &[Call]) -> Vec<SampleRequest> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Lookup(req, _) => Some(req.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn loading_a_playlist_loads_first_track_paused() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(abc()));

    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("a.mp3".into()),
            Call::VideoLoad("a.mp4".into()),
            Call::AudioPause,
        ]
    );

    // First readiness while paused: reverse, then pause the autoplaying video.
    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::Reverse]);
    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    assert_eq!(take(&log), vec![Call::VideoPause]);
}

#[test]
fn play_starts_video_before_transition_forward() {
    let (mut player, log) = ready_player(abc());

    player.play();
    assert_eq!(take(&log), vec![Call::AudioPlay, Call::VideoPlay]);

    player.handle(started(&log));
    assert_eq!(take(&log), vec![Call::Forward]);
}

#[test]
fn pause_reverses_transition_before_pausing_video() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.handle(started(&log));
    take(&log);

    player.pause();
    assert_eq!(take(&log), vec![Call::AudioPause, Call::Reverse]);

    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    assert_eq!(take(&log), vec![Call::VideoPause]);
}

#[test]
fn pause_before_video_start_supersedes_forward() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.pause();
    take(&log);

    player.handle(started(&log));
    assert!(take(&log).is_empty());

    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    assert_eq!(take(&log), vec![Call::VideoPause]);
}

#[test]
fn forward_finish_does_not_pause_video() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.handle(started(&log));
    take(&log);

    player.handle(MediaEvent::TransitionFinished(Direction::Forward));
    assert!(take(&log).is_empty());
}

#[test]
fn visuals_wait_for_video_readiness() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(abc()));
    take(&log);

    player.play();
    assert_eq!(take(&log), vec![Call::AudioPlay]);

    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::VideoPlay]);

    // A repeated readiness signal is not a change.
    player.handle(ready(&log));
    assert!(take(&log).is_empty());
}

#[test]
fn rejected_video_start_leaves_transition_idle() {
    let (mut player, log) = ready_player(abc());
    player.play();
    take(&log);

    player.handle(MediaEvent::VideoRejected {
        generation: log.generation.get(),
        error: PlayerError::rejected(Medium::Video, "autoplay blocked"),
    });
    player.handle(started(&log));
    assert!(take(&log).is_empty());
    assert!(player.state().is_playing());
}

#[test]
fn rejected_audio_keeps_intent_and_accepts_more_actions() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.handle(MediaEvent::AudioRejected(PlayerError::rejected(
        Medium::Audio,
        "no output device",
    )));
    assert!(player.state().is_playing());

    take(&log);
    player.pause();
    assert_eq!(take(&log), vec![Call::AudioPause, Call::Reverse]);
}

#[test]
fn seeked_is_never_left_set_after_a_reaction() {
    let (mut player, log) = ready_player(abc());

    let steps: [fn(&mut Player, &Log); 11] = [
        |p, _| p.next(),
        |p, _| p.play(),
        |p, _| p.next(),
        |p, log| p.handle(ready(log)),
        |p, _| p.previous(),
        |p, _| p.pause(),
        |p, _| p.select(2),
        |p, _| p.select(2),
        |p, log| p.handle(ended(log)),
        |p, _| p.dispatch(Action::Seeked),
        |p, log| p.handle(ready(log)),
    ];
    for step in steps {
        step(&mut player, &log);
        assert!(!player.state().seeked());
    }
}

#[test]
fn seeked_on_empty_playlist_is_cleared() {
    let (mut player, _log) = new_player();
    player.dispatch(Action::Seeked);
    assert!(!player.state().seeked());
}

#[test]
fn next_while_playing_restarts_transition_on_readiness() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.handle(started(&log));
    take(&log);

    player.next();
    assert_eq!(player.state().current_index(), 1);
    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("b.mp3".into()),
            Call::VideoLoad("b.mp4".into()),
            Call::AudioPlay,
        ]
    );

    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::Restart]);
}

#[test]
fn next_while_paused_reverses_then_pauses_new_video() {
    let (mut player, log) = ready_player(abc());

    player.next();
    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("b.mp3".into()),
            Call::VideoLoad("b.mp4".into()),
            Call::AudioPause,
        ]
    );

    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::Reverse]);
    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    assert_eq!(take(&log), vec![Call::VideoPause]);
}

#[test]
fn seek_latched_while_paused_is_consumed_once() {
    let (mut player, log) = ready_player(abc());
    player.next();
    player.handle(ready(&log));
    player.handle(MediaEvent::TransitionFinished(Direction::Reverse));
    take(&log);

    // The seek was spent on the paused readiness; plain play sequencing now.
    player.play();
    assert_eq!(take(&log), vec![Call::AudioPlay, Call::VideoPlay]);
}

#[test]
fn prev_from_first_track_selects_last() {
    let (mut player, log) = ready_player(abc());
    player.previous();
    assert_eq!(player.state().current_index(), 2);
    assert!(take(&log).contains(&Call::AudioLoad("c.mp3".into())));
}

#[test]
fn selecting_current_track_does_not_reload() {
    let (mut player, log) = ready_player(abc());
    player.select(1);
    player.handle(ready(&log));
    take(&log);

    player.select(1);
    assert!(take(&log).is_empty());
    assert_eq!(player.state().current_index(), 1);
    assert!(player.state().is_playing());
}

#[test]
fn selecting_current_track_while_paused_only_resumes() {
    let (mut player, log) = ready_player(abc());
    player.select(0);
    assert_eq!(take(&log), vec![Call::AudioPlay, Call::VideoPlay]);
}

#[test]
fn out_of_range_selection_is_ignored() {
    let (mut player, log) = ready_player(abc());
    player.select(3);
    assert!(take(&log).is_empty());
    assert_eq!(player.state().current_index(), 0);
    assert!(!player.state().is_playing());
}

#[test]
fn audio_end_advances_and_keeps_playing() {
    let (mut player, log) = ready_player(abc());
    player.select(2);
    player.handle(ready(&log));
    take(&log);

    player.handle(ended(&log));
    assert_eq!(player.state().current_index(), 0);
    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("a.mp3".into()),
            Call::VideoLoad("a.mp4".into()),
            Call::AudioPlay,
        ]
    );
}

#[test]
fn audio_end_on_single_track_rewinds_it() {
    let (mut player, log) = ready_player(vec![track("solo", None)]);
    player.play();
    take(&log);

    player.handle(ended(&log));
    assert_eq!(player.state().current_index(), 0);
    assert_eq!(take(&log), vec![Call::AudioSeek(Duration::ZERO), Call::AudioPlay]);
}

#[test]
fn progress_updates_only_touch_the_view() {
    let (mut player, log) = ready_player(abc());
    let before = player.state().clone();

    player.handle(progress(
        &log,
        Duration::from_secs(42),
        Some(Duration::from_secs(180)),
    ));

    assert_eq!(player.view().elapsed, Duration::from_secs(42));
    assert_eq!(player.view().duration, Some(Duration::from_secs(180)));
    assert_eq!(player.state(), &before);
}

#[test]
fn seek_to_moves_audio_and_clamps_to_duration() {
    let (mut player, log) = ready_player(abc());
    player.handle(progress(
        &log,
        Duration::from_secs(1),
        Some(Duration::from_secs(90)),
    ));

    player.seek_to(Duration::from_secs(30));
    assert_eq!(player.view().elapsed, Duration::from_secs(30));

    player.seek_to(Duration::from_secs(500));
    assert_eq!(player.view().elapsed, Duration::from_secs(90));

    assert_eq!(
        take(&log),
        vec![
            Call::AudioSeek(Duration::from_secs(30)),
            Call::AudioSeek(Duration::from_secs(90)),
        ]
    );
}

#[test]
fn track_change_resets_view() {
    let (mut player, log) = ready_player(abc());
    player.handle(progress(
        &log,
        Duration::from_secs(12),
        Some(Duration::from_secs(60)),
    ));
    player.next();
    assert_eq!(player.view(), &PlaybackView::default());
}

#[test]
fn readiness_of_a_replaced_video_does_not_spend_the_seek() {
    let (mut player, log) = ready_player(abc());
    player.play();
    player.handle(started(&log));
    let stale = ready(&log);
    take(&log);

    player.next();
    take(&log);

    player.handle(stale);
    assert!(take(&log).is_empty());

    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::Restart]);
}

#[test]
fn start_of_a_replaced_video_does_not_start_the_transition() {
    let (mut player, log) = ready_player(abc());
    player.play();
    let stale = started(&log);
    player.pause();
    player.next();
    player.handle(ready(&log));
    player.play();
    take(&log);

    player.handle(stale);
    assert!(take(&log).is_empty());

    player.handle(started(&log));
    assert_eq!(take(&log), vec![Call::Forward]);
}

#[test]
fn end_of_a_replaced_track_does_not_skip() {
    let (mut player, log) = ready_player(abc());
    player.play();
    let stale = ended(&log);

    player.next();
    take(&log);

    player.handle(stale);
    assert_eq!(player.state().current_index(), 1);
    assert!(take(&log).is_empty());

    player.handle(ended(&log));
    assert_eq!(player.state().current_index(), 2);
}

#[test]
fn progress_of_a_replaced_track_leaves_the_view() {
    let (mut player, log) = ready_player(abc());
    let stale = progress(&log, Duration::from_secs(75), Some(Duration::from_secs(120)));

    player.next();
    player.handle(stale);
    assert_eq!(player.view(), &PlaybackView::default());
}

#[test]
fn rejection_of_a_replaced_video_keeps_the_pending_start() {
    let (mut player, log) = ready_player(abc());
    let generation = log.generation.get();
    player.next();
    player.handle(ready(&log));
    player.play();
    take(&log);

    player.handle(MediaEvent::VideoRejected {
        generation,
        error: PlayerError::rejected(Medium::Video, "old source"),
    });
    player.handle(started(&log));
    assert_eq!(take(&log), vec![Call::Forward]);
}

#[test]
fn backdrop_readiness_from_a_replaced_source_is_ignored() {
    use crate::backdrop::Backdrop;
    use std::sync::mpsc;

    let wait = Duration::from_secs(2);
    let remote = |id: &str| Track {
        video: format!("https://cdn.example.com/{id}.mp4"),
        ..track(id, None)
    };

    let log = Log::default();
    let (tx, rx) = mpsc::channel();
    let sync = Synchronizer::new(
        Box::new(MockAudio(log.clone())),
        Box::new(Backdrop::new(tx, Duration::ZERO)),
        Box::new(MockTimeline(log.clone())),
        Box::new(MockLookup(log.clone())),
    );
    let mut player = Player::new(sync);

    player.dispatch(Action::SetPlaylist(vec![remote("a"), remote("b")]));
    player.play();
    let first = rx.recv_timeout(wait).unwrap();
    assert_eq!(first, MediaEvent::VideoReady { generation: 1 });

    // B is loaded before A's readiness is delivered.
    player.next();
    take(&log);
    player.handle(first);
    assert!(take(&log).is_empty());

    let second = rx.recv_timeout(wait).unwrap();
    assert_eq!(second, MediaEvent::VideoReady { generation: 2 });
    player.handle(second);
    assert_eq!(take(&log), vec![Call::Restart]);
}

#[test]
fn sample_lookup_is_issued_per_track_change() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(vec![
        track("a", Some("sa")),
        track("b", None),
        track("c", Some("sc")),
    ]));
    let calls = take(&log);
    assert!(calls.contains(&Call::Lookup(
        SampleRequest {
            track_id: TrackId::new("a"),
            generation: 1,
        },
        "sa".into()
    )));
    assert_eq!(player.view().sample, SampleView::Pending);

    player.next();
    assert!(lookups(&take(&log)).is_empty());
    assert_eq!(player.view().sample, SampleView::NoSample);
}

#[test]
fn stale_sample_result_never_overwrites_current_track() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(vec![
        track("a", Some("sa")),
        track("b", Some("sb")),
    ]));
    let first = lookups(&take(&log)).remove(0);

    player.next();
    let second = lookups(&take(&log)).remove(0);
    assert_eq!(second.track_id, TrackId::new("b"));

    let meta_a = SampleMetadata {
        name: "From A".into(),
        ..Default::default()
    };
    let meta_b = SampleMetadata {
        name: "From B".into(),
        ..Default::default()
    };

    player.handle(MediaEvent::SampleResolved {
        request: first.clone(),
        result: Ok(meta_a.clone()),
    });
    assert_eq!(player.view().sample, SampleView::Pending);

    player.handle(MediaEvent::SampleResolved {
        request: second,
        result: Ok(meta_b.clone()),
    });
    assert_eq!(player.view().sample, SampleView::Resolved(meta_b.clone()));

    // Late arrival after the current one resolved.
    player.handle(MediaEvent::SampleResolved {
        request: first,
        result: Ok(meta_a),
    });
    assert_eq!(player.view().sample, SampleView::Resolved(meta_b));
}

#[test]
fn returning_to_a_track_ignores_its_earlier_lookup() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(vec![
        track("a", Some("sa")),
        track("b", Some("sb")),
    ]));
    let first_a = lookups(&take(&log)).remove(0);
    player.next();
    player.previous();
    let requests = lookups(&take(&log));
    let second_a = requests.last().cloned().unwrap();
    assert_eq!(second_a.track_id, first_a.track_id);
    assert_ne!(second_a.generation, first_a.generation);

    player.handle(MediaEvent::SampleResolved {
        request: first_a,
        result: Ok(SampleMetadata::default()),
    });
    assert_eq!(player.view().sample, SampleView::Pending);
}

#[test]
fn failed_sample_lookup_degrades_to_no_sample() {
    let (mut player, log) = new_player();
    player.dispatch(Action::SetPlaylist(vec![track("a", Some("sa"))]));
    let request = lookups(&take(&log)).remove(0);

    player.handle(MediaEvent::SampleResolved {
        request,
        result: Err(PlayerError::SampleLookupFailed {
            reference: "sa".into(),
            reason: "offline".into(),
        }),
    });
    assert_eq!(player.view().sample, SampleView::NoSample);

    player.play();
    assert!(player.state().is_playing());
}

#[test]
fn three_track_session_end_to_end() {
    let (mut player, log) = ready_player(abc());

    // play: audio A, video, then transition forward.
    player.play();
    assert_eq!(take(&log), vec![Call::AudioPlay, Call::VideoPlay]);
    player.handle(started(&log));
    assert_eq!(take(&log), vec![Call::Forward]);

    // A ends: B loads and starts because intent is still playing.
    player.handle(ended(&log));
    assert_eq!(player.state().current_index(), 1);
    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("b.mp3".into()),
            Call::VideoLoad("b.mp4".into()),
            Call::AudioPlay,
        ]
    );
    player.handle(ready(&log));
    player.handle(started(&log));
    assert_eq!(take(&log), vec![Call::VideoPlay, Call::Forward]);

    // Select C while playing: seek latched, consumed on readiness, transition
    // restarts without another video play-start.
    player.select(2);
    assert!(!player.state().seeked());
    assert_eq!(player.state().current_index(), 2);
    assert_eq!(
        take(&log),
        vec![
            Call::AudioLoad("c.mp3".into()),
            Call::VideoLoad("c.mp4".into()),
            Call::AudioPlay,
        ]
    );
    player.handle(ready(&log));
    assert_eq!(take(&log), vec![Call::Restart]);

    // Selecting C again while playing C changes nothing.
    player.select(2);
    assert!(take(&log).is_empty());
}
