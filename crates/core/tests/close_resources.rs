//! Tests for close semantics and tracked resources

mod common;

use common::*;
use lodestar_api::{LoaderError, LocationKind, LocationStorage, Resource};
use lodestar_core::{Loader, Location};
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

/// In-memory location whose release always fails.
struct StubbornStorage {
    root: Url,
    releases: AtomicUsize,
}

impl StubbornStorage {
    fn new(root: &str) -> Arc<Self> {
        Arc::new(Self {
            root: Url::parse(root).unwrap(),
            releases: AtomicUsize::new(0),
        })
    }
}

impl LocationStorage for StubbornStorage {
    fn root(&self) -> &Url {
        &self.root
    }

    fn kind(&self) -> LocationKind {
        LocationKind::Archive
    }

    fn probe(&self, path: &str) -> io::Result<Option<Resource>> {
        Ok((path == "mem/Unit").then(|| Resource::new(path, b"mem".to_vec(), self.root.clone())))
    }

    fn open_stream(&self, _path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
        Ok(None)
    }

    fn release(&self) -> io::Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::other(format!("{} refused to close", self.root)))
    }
}

#[test]
fn test_definitions_survive_close() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("ivonet.jar");
    write_jar(&jar, &[("ivonet/IvoNet", b"ivo"), ("ivonet/Other", b"other")]);

    let loader = Loader::builder()
        .location(Location::archive(&jar).unwrap())
        .build()
        .unwrap();
    let before = loader.load_definition("ivonet.IvoNet").unwrap();

    loader.close().unwrap();
    assert!(loader.is_closed());

    assert_eq!(before.bytes(), b"ivo");
    assert!(Arc::ptr_eq(
        &before,
        &loader.load_definition("ivonet.IvoNet").unwrap()
    ));
    assert!(matches!(
        loader.load_definition("ivonet.Other"),
        Err(LoaderError::ClosedLoader)
    ));
}

#[test]
fn test_second_close_is_noop() {
    let stubborn = StubbornStorage::new("mem://stubborn/");
    let loader = Loader::builder()
        .location(Location::custom(stubborn.clone()))
        .build()
        .unwrap();

    assert!(loader.close().is_err());
    assert!(loader.close().is_ok());
    assert_eq!(stubborn.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_reports_every_failure() {
    let first = StubbornStorage::new("mem://first/");
    let second = StubbornStorage::new("mem://second/");
    let loader = Loader::builder()
        .location(Location::custom(first.clone()))
        .location(Location::custom(second.clone()))
        .build()
        .unwrap();

    let err = loader.close().unwrap_err();
    assert_eq!(err.len(), 2);
    assert_eq!(err.primary.to_string(), "mem://first/ refused to close");
    assert_eq!(err.suppressed[0].to_string(), "mem://second/ refused to close");
    assert!(err.to_string().contains("1 suppressed"));
    assert_eq!(second.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_closed_child_does_not_delegate() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a/B", b"b");

    let parent = Loader::builder()
        .location(Location::directory(temp.path()).unwrap())
        .build()
        .unwrap();
    let child = Loader::builder().parent(parent.clone()).build().unwrap();

    child.close().unwrap();
    assert!(matches!(child.load_definition("a.B"), Err(LoaderError::ClosedLoader)));
    assert!(parent.load_definition("a.B").is_ok());
}

#[test]
fn test_closed_parent_falls_back_to_child() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("parent"), "a/Cached", b"p");
    write_file(&temp.path().join("parent"), "a/Fresh", b"p");
    write_file(&temp.path().join("child"), "a/Fresh", b"c");

    let parent = Loader::builder()
        .location(Location::directory(temp.path().join("parent")).unwrap())
        .build()
        .unwrap();
    let cached = parent.load_definition("a.Cached").unwrap();
    let child = Loader::builder()
        .parent(parent.clone())
        .location(Location::directory(temp.path().join("child")).unwrap())
        .build()
        .unwrap();

    parent.close().unwrap();

    // Cached in the parent: still served from there.
    assert!(Arc::ptr_eq(&child.load_definition("a.Cached").unwrap(), &cached));
    // Not cached: the closed parent is skipped.
    let fresh = child.load_definition("a.Fresh").unwrap();
    assert_eq!(fresh.loader(), child.id());
    assert_eq!(fresh.bytes(), b"c");
}

#[test]
fn test_streams_fail_after_close() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config/app.properties", b"name=ivonet\n");

    let loader = Loader::builder()
        .location(Location::directory(temp.path()).unwrap())
        .build()
        .unwrap();

    let mut stream = loader.open_resource("config/app.properties").unwrap().unwrap();
    assert_eq!(stream.origin(), &loader.urls()[0]);
    let mut head = [0u8; 4];
    stream.read_exact(&mut head).unwrap();
    assert_eq!(&head, b"name");

    loader.close().unwrap();
    assert!(stream.is_closed());
    let err = stream.read(&mut head).unwrap_err();
    assert!(err.to_string().contains("stream closed by loader"));

    assert!(loader.open_resource("config/app.properties").unwrap().is_none());
}

#[test]
fn test_archive_streams_are_tracked() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("res.jar");
    write_jar(&jar, &[("notes.txt", b"hello")]);

    let loader = Loader::builder()
        .location(Location::archive(&jar).unwrap())
        .build()
        .unwrap();

    let mut kept = loader.open_resource("notes.txt").unwrap().unwrap();
    let dropped = loader.open_resource("notes.txt").unwrap().unwrap();
    drop(dropped);

    let mut text = String::new();
    kept.read_to_string(&mut text).unwrap();
    assert_eq!(text, "hello");

    loader.close().unwrap();
    assert!(kept.read(&mut [0u8; 1]).is_err());
}

#[test]
fn test_find_resources_parent_first() {
    let temp = TempDir::new().unwrap();
    let parent_root = temp.path().join("parent");
    let child_root = temp.path().join("child");
    write_file(&parent_root, "META-INF/services/plugin", b"p");
    write_file(&child_root, "META-INF/services/plugin", b"c");

    let parent = Loader::builder()
        .location(Location::directory(&parent_root).unwrap())
        .build()
        .unwrap();
    let child = Loader::builder()
        .parent(parent.clone())
        .location(Location::directory(&child_root).unwrap())
        .build()
        .unwrap();

    let parent_url = Url::from_directory_path(&parent_root).unwrap();
    let child_url = Url::from_directory_path(&child_root).unwrap();

    assert_eq!(
        child.find_resource("META-INF/services/plugin").unwrap(),
        Some(parent_url.clone())
    );
    assert_eq!(
        child.find_resources("META-INF/services/plugin").unwrap(),
        vec![parent_url, child_url.clone()]
    );
    assert_eq!(child.find_resource("missing").unwrap(), None);

    parent.close().unwrap();
    assert_eq!(
        child.find_resources("META-INF/services/plugin").unwrap(),
        vec![child_url]
    );
}

#[test]
fn test_remote_origin_consults_policy() {
    let deny_remote = |req: &lodestar_api::PolicyRequest| {
        !matches!(req, lodestar_api::PolicyRequest::ReachOrigin { .. })
    };
    let guarded = Loader::builder()
        .policy(Arc::new(deny_remote))
        .location(Location::custom(StubbornStorage::new("mem://remote/")))
        .build()
        .unwrap();
    assert!(matches!(
        guarded.load_definition("mem.Unit"),
        Err(LoaderError::PolicyDenied { .. })
    ));

    let open = Loader::builder()
        .location(Location::custom(StubbornStorage::new("mem://remote/")))
        .build()
        .unwrap();
    let def = open.load_definition("mem.Unit").unwrap();
    assert_eq!(def.code_source().location.as_str(), "mem://remote/");
}

#[test]
fn test_stream_served_by_parent_closes_with_child() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "notes.txt", b"hello");

    let parent = Loader::builder()
        .location(Location::directory(temp.path()).unwrap())
        .build()
        .unwrap();
    let child = Loader::builder().parent(parent.clone()).build().unwrap();

    let mut stream = child.open_resource("notes.txt").unwrap().unwrap();
    assert_eq!(stream.origin(), &parent.urls()[0]);
    let mut head = [0u8; 2];
    stream.read_exact(&mut head).unwrap();

    child.close().unwrap();
    assert!(stream.is_closed());
    assert!(stream.read(&mut head).is_err());

    // The parent itself is still open and keeps serving.
    let mut fresh = parent.open_resource("notes.txt").unwrap().unwrap();
    let mut text = String::new();
    fresh.read_to_string(&mut text).unwrap();
    assert_eq!(text, "hello");
}

#[test]
fn test_closed_child_answers_nothing() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "notes.txt", b"hello");
    write_file(temp.path(), "a/B", b"b");

    let parent = Loader::builder()
        .location(Location::directory(temp.path()).unwrap())
        .build()
        .unwrap();
    let child = Loader::builder().parent(parent.clone()).build().unwrap();
    child.close().unwrap();

    assert!(matches!(child.load_definition("a.B"), Err(LoaderError::ClosedLoader)));
    assert_eq!(child.find_resource("notes.txt").unwrap(), None);
    assert!(child.find_resources("notes.txt").unwrap().is_empty());
    assert!(child.open_resource("notes.txt").unwrap().is_none());
    assert!(parent.find_resource("notes.txt").unwrap().is_some());
}

#[test]
fn test_close_does_not_wait_for_in_flight_materialization() {
    let (parked_tx, parked_rx) = mpsc::channel::<()>();
    let (resume_tx, resume_rx) = mpsc::channel::<()>();
    let parked_tx = Mutex::new(parked_tx);
    let resume_rx = Mutex::new(resume_rx);
    let stall_on_reach = move |req: &lodestar_api::PolicyRequest| {
        if matches!(req, lodestar_api::PolicyRequest::ReachOrigin { .. }) {
            parked_tx.lock().unwrap().send(()).unwrap();
            resume_rx.lock().unwrap().recv().unwrap();
        }
        true
    };
    let loader = Loader::builder()
        .policy(Arc::new(stall_on_reach))
        .location(Location::custom(StubbornStorage::new("mem://slow/")))
        .build()
        .unwrap();

    std::thread::scope(|s| {
        let pending = s.spawn(|| loader.load_definition("mem.Unit"));

        parked_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        // "mem.Unit" is mid-materialization here.
        assert!(loader.loaded_names().is_empty());
        assert!(loader.close().is_err());
        assert!(loader.is_closed());
        resume_tx.send(()).unwrap();

        let def = pending.join().unwrap().unwrap();
        assert_eq!(def.name(), "mem.Unit");
    });

    assert!(loader.loaded_names().contains("mem.Unit"));
}
