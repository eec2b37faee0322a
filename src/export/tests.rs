use std::io::ErrorKind;
use std::time::Duration;

use super::*;
use crate::collection::CollectionStore;
use crate::test_support::FakeHost;

fn collection(paths: &[&str]) -> CollectionStore {
    let mut store = CollectionStore::new("Gig", 10);
    store.add_tracks(
        paths.iter().map(|path| TrackDraft::from_path(*path)).collect(),
        None,
    );
    store
}

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1))
}

#[test]
fn strategy_names_parse_case_insensitively() {
    assert_eq!("Flat".parse::<ExportStrategy>().unwrap(), ExportStrategy::Flat);
    assert_eq!(
        " playlist ".parse::<ExportStrategy>().unwrap(),
        ExportStrategy::Playlist
    );
    assert!(matches!(
        "zip".parse::<ExportStrategy>(),
        Err(ExportError::UnsupportedStrategy(name)) if name == "zip"
    ));
}

#[test]
fn flat_plan_suffixes_colliding_names() {
    let store = collection(&["/a/kick.wav", "/b/kick.wav", "/c/KICK.wav", "/d/snare.wav"]);
    let names: Vec<String> = plan(store.state(), Path::new("/out"), ExportStrategy::Flat)
        .into_iter()
        .map(|copy| copy.destination.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["kick.wav", "kick (2).wav", "KICK (3).wav", "snare.wav"]);
}

#[test]
fn numbered_plan_prefixes_in_order() {
    let store = collection(&["/a/one.wav", "/a/two.mp3"]);
    let planned = plan(store.state(), Path::new("/out"), ExportStrategy::Numbered);
    assert_eq!(planned[0].destination, PathBuf::from("/out/01 - one.wav"));
    assert_eq!(planned[1].destination, PathBuf::from("/out/02 - two.mp3"));
    assert_eq!(planned[1].draft.name, "two");
}

#[test]
fn transient_failures_are_retried() {
    let host = FakeHost::new().failing_copy("/a/one.wav", 2, ErrorKind::Interrupted);
    let attempts = copy_with_retry(
        &host,
        Path::new("/a/one.wav"),
        Path::new("/out/one.wav"),
        &fast_policy(3),
    )
    .unwrap();
    assert_eq!(attempts, 3);
    assert_eq!(host.copied().len(), 1);
}

#[test]
fn exhausted_and_permanent_failures_are_reported_per_track() {
    let host = FakeHost::new()
        .failing_copy("/a/busy.wav", 5, ErrorKind::Interrupted)
        .failing_copy("/a/gone.wav", 1, ErrorKind::NotFound);
    let store = collection(&["/a/busy.wav", "/a/ok.wav", "/a/gone.wav"]);
    let report = export_collection(
        &host,
        store.state(),
        Path::new("/out"),
        "flat",
        &fast_policy(3),
    )
    .unwrap();
    assert_eq!(report.copied, vec![PathBuf::from("/out/ok.wav")]);
    let failed: Vec<&Path> = report.failed.iter().map(|f| f.source.as_path()).collect();
    assert_eq!(failed, [Path::new("/a/busy.wav"), Path::new("/a/gone.wav")]);
    assert!(!report.is_complete());
}

#[test]
fn playlist_strategy_writes_manifest_of_copies() {
    let host = FakeHost::new().failing_copy("/a/two.wav", 1, ErrorKind::PermissionDenied);
    let store = collection(&["/a/one.wav", "/a/two.wav"]);
    let report = export_collection(
        &host,
        store.state(),
        Path::new("/out"),
        "playlist",
        &fast_policy(2),
    )
    .unwrap();
    assert_eq!(report.playlist, Some(PathBuf::from("/out/playlist.json")));
    let saved = host.saved.lock().unwrap();
    let (path, playlist) = &saved[0];
    assert_eq!(path, &PathBuf::from("/out/playlist.json"));
    assert_eq!(playlist.name, "Gig");
    assert_eq!(playlist.tracks.len(), 1);
    assert_eq!(playlist.tracks[0].path, PathBuf::from("/out/01 - one.wav"));
}

#[test]
fn manifest_write_failure_keeps_copy_results() {
    let host = FakeHost::new().failing_save("/out/playlist.json");
    let store = collection(&["/a/one.wav", "/a/two.wav"]);
    let report = export_collection(
        &host,
        store.state(),
        Path::new("/out"),
        "playlist",
        &fast_policy(1),
    )
    .unwrap();
    assert_eq!(
        report.copied,
        vec![
            PathBuf::from("/out/01 - one.wav"),
            PathBuf::from("/out/02 - two.wav")
        ]
    );
    assert_eq!(report.playlist, None);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].source, PathBuf::from("/out/playlist.json"));
    assert!(!report.is_complete());
}

#[test]
fn unknown_strategy_copies_nothing() {
    let host = FakeHost::new();
    let store = collection(&["/a/one.wav"]);
    let err = export_collection(&host, store.state(), Path::new("/out"), "zip", &fast_policy(1))
        .unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedStrategy(_)));
    assert!(host.copied().is_empty());
}

#[test]
fn traversal_destination_is_rejected() {
    let host = FakeHost::new();
    let store = collection(&["/a/one.wav"]);
    let err = export_collection(
        &host,
        store.state(),
        Path::new("/out/../etc"),
        "flat",
        &fast_policy(1),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Destination(HostError::PathTraversal(_))));
}

#[test]
fn backoff_doubles_each_attempt() {
    let policy = RetryPolicy::new(4, Duration::from_millis(100));
    assert_eq!(policy.delay_after(1), Duration::from_millis(100));
    assert_eq!(policy.delay_after(2), Duration::from_millis(200));
    assert_eq!(policy.delay_after(3), Duration::from_millis(400));
}
