use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

struct FlakyProvider {
    failing: Vec<&'static str>,
    calls: AtomicUsize,
}

impl IconProvider for FlakyProvider {
    fn load(&self, key: &str, _source: &str) -> IconLoad {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&key) {
            IconLoad::Failed("404".to_owned())
        } else {
            IconLoad::Loaded(IconImage::solid(2, 2, [255, 255, 255, 255]))
        }
    }
}

fn ten_sources() -> BTreeMap<String, String> {
    (0..10)
        .map(|i| (format!("icon{i}"), format!("icons/icon{i}.png")))
        .collect()
}

#[test]
fn barrier_waits_for_every_request_including_failures() {
    let provider = FlakyProvider {
        failing: vec!["icon3", "icon7"],
        calls: AtomicUsize::new(0),
    };
    let report = load_icons(&provider, &ten_sources(), &CancelToken::new()).unwrap();

    assert_eq!(report.settled, 10);
    assert_eq!(report.failed, 2);
    assert_eq!(report.cache.len(), 8);
    assert!(report.cache.get("icon3").is_none());
    assert!(report.cache.get("icon0").is_some());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 10);
}

#[test]
fn cancelled_barrier_yields_nothing() {
    let provider = FlakyProvider {
        failing: vec![],
        calls: AtomicUsize::new(0),
    };
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(load_icons(&provider, &ten_sources(), &cancel).is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

struct CancellingProvider {
    cancel: CancelToken,
    calls: AtomicUsize,
}

impl IconProvider for CancellingProvider {
    fn load(&self, _key: &str, _source: &str) -> IconLoad {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cancel.cancel();
        IconLoad::Loaded(IconImage::solid(2, 2, [255, 255, 255, 255]))
    }
}

#[test]
fn cancel_while_requests_are_in_flight_discards_results() {
    let cancel = CancelToken::new();
    let provider = CancellingProvider {
        cancel: cancel.clone(),
        calls: AtomicUsize::new(0),
    };
    assert!(load_icons(&provider, &ten_sources(), &cancel).is_none());
    assert!(provider.calls.load(Ordering::SeqCst) >= 1);
}

#[test]
fn empty_request_set_settles_immediately() {
    let provider = FlakyProvider {
        failing: vec![],
        calls: AtomicUsize::new(0),
    };
    let report = load_icons(&provider, &BTreeMap::new(), &CancelToken::new()).unwrap();
    assert_eq!(report.settled, 0);
    assert!(report.cache.is_empty());
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn fs_provider_reads_png_and_reports_missing_files() {
    let dir = std::path::PathBuf::from("target").join("fs_icon_provider");
    std::fs::create_dir_all(dir.join("icons")).unwrap();

    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 255, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("icons").join("ok.png"), buf).unwrap();

    let provider = FsIconProvider::new(&dir);
    match provider.load("ok", "icons/ok.png") {
        IconLoad::Loaded(img) => {
            assert_eq!((img.width, img.height), (3, 2));
        }
        IconLoad::Failed(reason) => panic!("unexpected failure: {reason}"),
    }
    assert!(matches!(
        provider.load("missing", "icons/missing.png"),
        IconLoad::Failed(_)
    ));
    assert!(matches!(
        provider.load("escape", "../secret.png"),
        IconLoad::Failed(_)
    ));
}

#[test]
fn solid_icon_fills_every_pixel() {
    let img = IconImage::solid(3, 2, [10, 20, 30, 255]);
    assert_eq!(img.rgba8_premul.len(), 3 * 2 * 4);
    assert!(img.rgba8_premul.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}
