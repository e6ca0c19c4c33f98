use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

use crate::assets::icons::{IconImage, IconLoad};
use crate::encode::sink::InMemorySink;
use crate::layout::config::DiagramConfig;
use crate::test_support::RecordingSurface;

struct CountingProvider {
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new(failing: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|s| (*s).to_owned()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl IconProvider for CountingProvider {
    fn load(&self, key: &str, _source: &str) -> IconLoad {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|k| k == key) {
            IconLoad::Failed("unreachable".to_owned())
        } else {
            IconLoad::Loaded(IconImage::solid(1, 1, [0, 0, 0, 255]))
        }
    }
}

fn diagram() -> Diagram {
    let icons: serde_json::Map<String, serde_json::Value> = (0..10)
        .map(|i| (format!("i{i}"), serde_json::json!(format!("icons/i{i}.png"))))
        .collect();
    let cfg: DiagramConfig = serde_json::from_value(serde_json::json!({
        "surface": { "width": 200, "height": 100 },
        "seed": 9,
        "font": "fonts/missing.ttf",
        "icons": icons,
        "nodes": [
            { "id": "a", "x": 10, "y": 10, "width": 60, "height": 60,
              "label": "A", "icons": ["i0", "i1"] },
            { "id": "b", "x": 130, "y": 10, "width": 60, "height": 60,
              "label": "B", "icon": "i3" }
        ],
        "connections": [ { "from": "a", "to": "b" }, { "from": "b", "to": "a" } ],
        "particles": { "particles_per_connection": 3 }
    }))
    .unwrap();
    Diagram::from_config(cfg).unwrap()
}

fn start(provider: &CountingProvider, cancel: CancelToken) -> Option<AnimationSession<RecordingSurface>> {
    AnimationSession::start(
        diagram(),
        provider,
        RecordingSurface::new(200, 100),
        SessionOpts::default(),
        cancel,
    )
    .unwrap()
}

#[test]
fn start_waits_for_all_icons_and_builds_pool_once() {
    let provider = CountingProvider::new(&["i3", "i8"]);
    let mut session = start(&provider, CancelToken::new()).unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 10);
    assert_eq!(session.icon_counts(), (10, 2));
    assert_eq!(session.icons().len(), 8);
    assert_eq!(session.particles().len(), 6);

    for _ in 0..3 {
        session.render_frame().unwrap().unwrap();
    }
    assert_eq!(session.particles().len(), 6);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 10);
    assert_eq!(session.frame_index(), FrameIndex(3));
}

#[test]
fn pool_is_phase_offset_per_connection() {
    let provider = CountingProvider::new(&[]);
    let session = start(&provider, CancelToken::new()).unwrap();

    let phases: Vec<(usize, f64)> = session
        .particles()
        .iter()
        .map(|p| (p.connection(), p.progress))
        .collect();
    let third = 1.0 / 3.0;
    let two_thirds = 2.0 / 3.0;
    assert_eq!(
        phases,
        vec![
            (0, 0.0),
            (0, third),
            (0, two_thirds),
            (1, 0.0),
            (1, third),
            (1, two_thirds),
        ]
    );
}

#[test]
fn cancelled_before_start_yields_no_session() {
    let provider = CountingProvider::new(&[]);
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(start(&provider, cancel).is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

struct CancellingProvider {
    cancel: CancelToken,
}

impl IconProvider for CancellingProvider {
    fn load(&self, _key: &str, _source: &str) -> IconLoad {
        self.cancel.cancel();
        IconLoad::Loaded(IconImage::solid(1, 1, [0, 0, 0, 255]))
    }
}

#[test]
fn cancelled_during_icon_load_yields_no_session() {
    let cancel = CancelToken::new();
    let provider = CancellingProvider {
        cancel: cancel.clone(),
    };
    let session = AnimationSession::start(
        diagram(),
        &provider,
        RecordingSurface::new(200, 100),
        SessionOpts::default(),
        cancel,
    )
    .unwrap();
    assert!(session.is_none());
}

#[test]
fn no_frames_after_cancellation() {
    let provider = CountingProvider::new(&[]);
    let mut session = start(&provider, CancelToken::new()).unwrap();
    assert!(session.render_frame().unwrap().is_some());

    session.cancel_token().cancel();
    assert!(session.render_frame().unwrap().is_none());

    let mut sink = InMemorySink::new();
    let stats = session
        .run(
            &mut sink,
            LoopOpts {
                frames: None,
                pacing: Pacing::Unpaced,
            },
        )
        .unwrap();
    assert_eq!(stats.frames, 0);
    assert!(stats.cancelled);
    assert!(sink.frames().is_empty());
    assert!(sink.ended());
    assert_eq!(session.frame_index(), FrameIndex(1));
}

#[test]
fn run_stops_at_frame_limit_with_increasing_indices() {
    let provider = CountingProvider::new(&[]);
    let mut session = start(&provider, CancelToken::new()).unwrap();
    let mut sink = InMemorySink::new();

    let stats = session
        .run(
            &mut sink,
            LoopOpts {
                frames: Some(4),
                pacing: Pacing::Unpaced,
            },
        )
        .unwrap();

    assert_eq!(stats.frames, 4);
    assert!(!stats.cancelled);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3]);
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (200, 100));
}

#[test]
fn realtime_pacing_still_honors_limit() {
    let provider = CountingProvider::new(&[]);
    let mut session = start(&provider, CancelToken::new()).unwrap();
    let mut sink = InMemorySink::new();

    let stats = session
        .run(
            &mut sink,
            LoopOpts {
                frames: Some(2),
                pacing: Pacing::Realtime(Fps::new(1000, 1).unwrap()),
            },
        )
        .unwrap();
    assert_eq!(stats.frames, 2);
    assert_eq!(sink.frames().len(), 2);
}

#[test]
fn same_seed_same_particles() {
    let provider = CountingProvider::new(&[]);
    let a = start(&provider, CancelToken::new()).unwrap();
    let b = start(&provider, CancelToken::new()).unwrap();
    assert_eq!(a.particles(), b.particles());

    let c = AnimationSession::start(
        diagram(),
        &provider,
        RecordingSurface::new(200, 100),
        SessionOpts { seed: Some(10) },
        CancelToken::new(),
    )
    .unwrap()
    .unwrap();
    assert_ne!(a.particles(), c.particles());
}

#[test]
fn advance_moves_particles_without_drawing() {
    let provider = CountingProvider::new(&[]);
    let mut session = start(&provider, CancelToken::new()).unwrap();
    let before: Vec<f64> = session.particles().iter().map(|p| p.progress).collect();

    session.advance(5);

    assert_eq!(session.frame_index(), FrameIndex(5));
    assert!(session.surface().ops().is_empty());
    for (p, start) in session.particles().iter().zip(before) {
        let mut expected = start;
        for _ in 0..5 {
            expected = crate::particle::next_progress(expected, p.speed());
        }
        assert_eq!(p.progress, expected);
    }
}

#[test]
fn empty_surface_is_rejected() {
    let provider = CountingProvider::new(&[]);
    let res = AnimationSession::start(
        diagram(),
        &provider,
        RecordingSurface::new(0, 100),
        SessionOpts::default(),
        CancelToken::new(),
    );
    assert!(res.is_err());
}
