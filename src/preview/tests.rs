use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use super::*;
use crate::collection::{CollectionStore, SettingsOverride, TrackDraft};

#[derive(Default, Clone)]
struct Probe {
    calls: Rc<RefCell<Vec<String>>>,
    finished: Rc<Cell<bool>>,
}

struct RecordingOutput(Probe);

impl PreviewOutput for RecordingOutput {
    fn load(&mut self, path: &Path) -> Result<(), PreviewError> {
        self.0.finished.set(false);
        self.0
            .calls
            .borrow_mut()
            .push(format!("load {}", path.display()));
        Ok(())
    }
    fn play(&mut self) {
        self.0.calls.borrow_mut().push("play".into());
    }
    fn pause(&mut self) {
        self.0.calls.borrow_mut().push("pause".into());
    }
    fn stop(&mut self) {
        self.0.calls.borrow_mut().push("stop".into());
    }
    fn seek(&mut self, seconds: f64) -> Result<(), PreviewError> {
        self.0.calls.borrow_mut().push(format!("seek {seconds}"));
        Ok(())
    }
    fn set_volume(&mut self, volume: f32) {
        self.0.calls.borrow_mut().push(format!("volume {volume}"));
    }
    fn finished(&self) -> bool {
        self.0.finished.get()
    }
}

struct Fixture {
    store: CollectionStore,
    ids: Vec<ItemId>,
    player: PreviewPlayer,
    probe: Probe,
    workspace: WorkspaceId,
}

fn fixture() -> Fixture {
    let mut store = CollectionStore::new("Set", 10);
    let ids = store.add_tracks(
        ["a", "b", "c"]
            .iter()
            .map(|name| TrackDraft::from_path(format!("/m/{name}.wav")))
            .collect(),
        None,
    );
    let probe = Probe::default();
    let player = PreviewPlayer::new(Box::new(RecordingOutput(probe.clone())), 0.8);
    Fixture {
        store,
        ids,
        player,
        probe,
        workspace: WorkspaceId::from("main"),
    }
}

impl Fixture {
    fn play(&mut self, index: usize) {
        self.player
            .play_track(&self.workspace, self.store.state(), &self.ids[index])
            .unwrap();
    }

    fn end(&mut self, defaults: &PlaybackDefaults, now: Instant) {
        self.player
            .handle_event(PlayerEvent::Ended, self.store.state(), defaults, now);
    }

    fn last_load(&self) -> Option<String> {
        self.probe
            .calls
            .borrow()
            .iter()
            .rev()
            .find(|call| call.starts_with("load"))
            .cloned()
    }
}

fn defaults(action: ActionAfterTrack) -> PlaybackDefaults {
    PlaybackDefaults {
        action_after_track: action,
        pause_between_tracks: 0.0,
    }
}

#[test]
fn play_track_loads_and_starts_output() {
    let mut fx = fixture();
    fx.play(1);
    assert_eq!(fx.player.status(), PlaybackStatus::Playing);
    assert_eq!(fx.player.current(), Some(&fx.ids[1]));
    assert_eq!(fx.last_load().as_deref(), Some("load /m/b.wav"));
    let err = fx
        .player
        .play_track(&fx.workspace, fx.store.state(), &ItemId::from_string("nope"))
        .unwrap_err();
    assert!(matches!(err, PreviewError::UnknownTrack(_)));
}

#[test]
fn toggle_pause_flips_between_playing_and_paused() {
    let mut fx = fixture();
    assert_eq!(fx.player.toggle_pause(), PlaybackStatus::Idle);
    fx.play(0);
    assert_eq!(fx.player.toggle_pause(), PlaybackStatus::Paused);
    assert_eq!(fx.player.toggle_pause(), PlaybackStatus::Playing);
}

#[test]
fn next_advances_and_stops_at_end() {
    let mut fx = fixture();
    let now = Instant::now();
    fx.play(1);
    fx.end(&defaults(ActionAfterTrack::Next), now);
    assert_eq!(fx.player.current(), Some(&fx.ids[2]));
    fx.end(&defaults(ActionAfterTrack::Next), now);
    assert_eq!(fx.player.status(), PlaybackStatus::Idle);
    assert!(fx.player.current().is_none());
}

#[test]
fn loop_wraps_and_repeat_replays() {
    let mut fx = fixture();
    let now = Instant::now();
    fx.play(2);
    fx.end(&defaults(ActionAfterTrack::Loop), now);
    assert_eq!(fx.player.current(), Some(&fx.ids[0]));

    fx.end(&defaults(ActionAfterTrack::Repeat), now);
    assert_eq!(fx.player.current(), Some(&fx.ids[0]));
    assert_eq!(fx.last_load().as_deref(), Some("load /m/a.wav"));

    fx.end(&defaults(ActionAfterTrack::Stop), now);
    assert_eq!(fx.player.status(), PlaybackStatus::Idle);
}

#[test]
fn group_pause_delays_next_track_until_tick() {
    let mut fx = fixture();
    fx.store.toggle_track_selection(&fx.ids[0]);
    let group = fx.store.group_selected("Intro").unwrap();
    fx.store.set_group_settings(
        &group,
        SettingsOverride::action(ActionAfterTrack::Next).with_pause(2.0),
    );
    let start = Instant::now();
    let global = defaults(ActionAfterTrack::Stop);
    fx.play(0);
    fx.end(&global, start);

    assert_eq!(fx.player.status(), PlaybackStatus::Waiting);
    let (due, next) = fx.player.pending().unwrap();
    assert_eq!(next, &fx.ids[1]);
    assert_eq!(due, start + Duration::from_secs(2));

    assert!(!fx.player.tick(fx.store.state(), &global, start + Duration::from_secs(1)));
    assert!(fx.player.tick(fx.store.state(), &global, start + Duration::from_secs(2)));
    assert_eq!(fx.player.current(), Some(&fx.ids[1]));
    assert_eq!(fx.player.status(), PlaybackStatus::Playing);
}

#[test]
fn removed_track_stops_on_next_event() {
    let mut fx = fixture();
    fx.play(0);
    let removed = fx.ids[0].clone();
    fx.store.remove_track(&removed);
    fx.player.handle_event(
        PlayerEvent::Position(1.0),
        fx.store.state(),
        &PlaybackDefaults::default(),
        Instant::now(),
    );
    assert_eq!(fx.player.status(), PlaybackStatus::Idle);
    assert!(fx.player.current().is_none());
}

#[test]
fn finished_output_advances_on_tick() {
    let mut fx = fixture();
    fx.play(0);
    fx.probe.finished.set(true);
    let started = fx.player.tick(
        fx.store.state(),
        &defaults(ActionAfterTrack::Next),
        Instant::now(),
    );
    assert!(started);
    assert_eq!(fx.player.current(), Some(&fx.ids[1]));
}

#[test]
fn volume_is_clamped_and_seek_needs_a_track() {
    let mut fx = fixture();
    assert_eq!(fx.player.volume(), 0.8);
    fx.player.set_volume(4.0);
    assert_eq!(fx.player.volume(), 1.0);
    fx.player.set_volume(-1.0);
    assert_eq!(fx.player.volume(), 0.0);
    assert!(matches!(fx.player.seek(3.0), Err(PreviewError::NothingLoaded)));
    fx.play(0);
    fx.player.seek(-5.0).unwrap();
    assert_eq!(fx.player.position(), 0.0);
}

#[test]
fn output_errors_reset_the_player() {
    let mut fx = fixture();
    fx.play(0);
    fx.player.handle_event(
        PlayerEvent::Error("device lost".into()),
        fx.store.state(),
        &PlaybackDefaults::default(),
        Instant::now(),
    );
    assert_eq!(fx.player.status(), PlaybackStatus::Idle);
    assert_eq!(fx.player.last_error(), Some("device lost"));
}
