use super::*;

fn frame(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, [1, 2, 3, 255])).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, [4, 5, 6, 255])).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg(2, 2)));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
    assert!(sink.ended());
}

#[test]
fn png_names_are_zero_padded() {
    assert_eq!(PngSequenceSink::file_name(FrameIndex(7)), "frame_00007.png");
    assert_eq!(PngSequenceSink::file_name(FrameIndex(12345)), "frame_12345.png");
}

#[test]
fn png_sequence_writes_decodable_files() {
    let dir = PathBuf::from("target").join("png_sequence_sink");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(3, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(3, 2, [128, 0, 0, 128])).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 1);

    let img = image::open(dir.join("frame_00000.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
}

#[test]
fn png_sequence_rejects_mismatched_frames() {
    let mut sink = PngSequenceSink::new(PathBuf::from("target").join("png_sequence_mismatch"));
    sink.begin(cfg(3, 2)).unwrap();
    let err = sink
        .push_frame(FrameIndex(0), &frame(2, 2, [0, 0, 0, 0]))
        .unwrap_err();
    assert!(err.to_string().starts_with("render error:"));
}

#[test]
fn png_sequence_requires_begin() {
    let mut sink = PngSequenceSink::new(PathBuf::from("target").join("png_sequence_unbegun"));
    assert!(sink.push_frame(FrameIndex(0), &frame(1, 1, [0, 0, 0, 0])).is_err());
}
