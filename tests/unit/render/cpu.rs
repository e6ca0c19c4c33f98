use super::*;

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);

#[test]
fn new_rejects_bad_scale_and_oversized_grids() {
    assert!(CpuSurface::new(canvas(100, 100), 0.0).is_err());
    assert!(CpuSurface::new(canvas(100, 100), f64::NAN).is_err());
    assert!(CpuSurface::new(canvas(10_000, 10), 2.0).is_err());
    assert!(CpuSurface::new(canvas(0, 10), 1.0).is_err());
}

#[test]
fn scale_multiplies_device_grid() {
    let s = CpuSurface::new(canvas(64, 32), 2.0).unwrap();
    assert_eq!(s.device_size(), (128, 64));
    assert_eq!(s.transform(), Affine::scale(2.0));
}

#[test]
fn fresh_frame_is_transparent() {
    let mut s = CpuSurface::new(canvas(16, 16), 1.0).unwrap();
    s.begin_frame();
    let frame = s.finish_frame().unwrap();
    assert_eq!((frame.width, frame.height), (16, 16));
    assert!(frame.premultiplied);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn fill_rect_in_logical_space_covers_scaled_pixels() {
    let mut s = CpuSurface::new(canvas(20, 20), 2.0).unwrap();
    s.begin_frame();
    s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), RED);
    let frame = s.finish_frame().unwrap();

    assert_eq!(frame.pixel(15, 15), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(25, 25), Some([0, 0, 0, 0]));
}

#[test]
fn identity_fill_covers_whole_device_grid() {
    let mut s = CpuSurface::new(canvas(20, 20), 2.0).unwrap();
    s.begin_frame();
    let (w, h) = s.device_size();
    s.set_transform(Affine::IDENTITY);
    s.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)), RED);
    let frame = s.finish_frame().unwrap();

    assert_eq!(frame.pixel(39, 39), Some([255, 0, 0, 255]));
}

#[test]
fn dashed_stroke_leaves_gaps() {
    let mut s = CpuSurface::new(canvas(100, 20), 1.0).unwrap();
    s.begin_frame();
    let mut line = BezPath::new();
    line.move_to((0.0, 10.0));
    line.line_to((100.0, 10.0));
    let stroke = StrokeStyle {
        width: 4.0,
        dash: vec![8.0, 4.0],
        round_join: false,
    };
    s.stroke_path(&line, &stroke, RED);
    let frame = s.finish_frame().unwrap();

    assert_eq!(frame.pixel(4, 10).map(|p| p[3]), Some(255));
    assert_eq!(frame.pixel(10, 10).map(|p| p[3]), Some(0));
    assert_eq!(frame.pixel(16, 10).map(|p| p[3]), Some(255));
}

#[test]
fn dash_ends_are_butt_capped() {
    let mut s = CpuSurface::new(canvas(40, 20), 1.0).unwrap();
    s.begin_frame();
    let mut line = BezPath::new();
    line.move_to((0.0, 10.0));
    line.line_to((40.0, 10.0));
    let stroke = StrokeStyle {
        width: 2.0,
        dash: vec![8.0, 4.0],
        round_join: false,
    };
    s.stroke_path(&line, &stroke, RED);
    let frame = s.finish_frame().unwrap();

    let alpha: Vec<u8> = (0..24).map(|x| frame.pixel(x, 10).map_or(0, |p| p[3])).collect();
    assert_eq!(&alpha[0..8], &[255; 8]);
    assert_eq!(&alpha[8..12], &[0; 4]);
    assert_eq!(&alpha[12..20], &[255; 8]);
    assert_eq!(&alpha[20..24], &[0; 4]);
}

#[test]
fn glow_spreads_beyond_the_shape_only_while_set() {
    let mut s = CpuSurface::new(canvas(60, 30), 1.0).unwrap();
    s.begin_frame();
    s.set_shadow(Some(Shadow::glow(RED, 5.0)));
    s.fill_circle(Point::new(15.0, 15.0), 5.0, RED);
    s.set_shadow(None);
    s.fill_circle(Point::new(45.0, 15.0), 5.0, RED);
    let frame = s.finish_frame().unwrap();

    let halo = |x: u32| frame.pixel(x, 15).map(|p| p[3]).unwrap_or(0);
    assert!(halo(22) > 0, "glow should reach past the radius");
    assert_eq!(halo(52), 0);
    assert_eq!(halo(15), 255);
}

#[test]
fn images_scale_into_destination() {
    let mut s = CpuSurface::new(canvas(40, 40), 1.0).unwrap();
    s.begin_frame();
    let icon = IconImage::solid(2, 2, [0, 0, 255, 255]);
    s.draw_image("blue", &icon, Rect::new(10.0, 10.0, 30.0, 30.0));
    let frame = s.finish_frame().unwrap();

    assert_eq!(frame.pixel(20, 20), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(35, 35), Some([0, 0, 0, 0]));
}

#[test]
fn text_without_font_is_skipped() {
    let mut s = CpuSurface::new(canvas(40, 40), 1.0).unwrap();
    s.begin_frame();
    let style = TextStyle {
        size: 16.0,
        color: RED,
        align: TextAlign::Center,
    };
    assert!(!s.has_font());
    assert_eq!(s.measure_text("hello", &style), 0.0);
    s.fill_text("hello", Point::new(20.0, 20.0), &style);
    let frame = s.finish_frame().unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn load_font_rejects_garbage() {
    let mut s = CpuSurface::new(canvas(40, 40), 1.0).unwrap();
    assert!(s.load_font(b"not a font".to_vec()).is_err());
    assert!(!s.has_font());
}

#[test]
fn begin_frame_resets_transform_and_shadow() {
    let mut s = CpuSurface::new(canvas(10, 10), 3.0).unwrap();
    s.set_transform(Affine::IDENTITY);
    s.set_shadow(Some(Shadow::glow(RED, 2.0)));
    s.begin_frame();
    assert_eq!(s.transform(), Affine::scale(3.0));
    assert_eq!(s.shadow(), None);
}

const TUFFY: &[u8] = include_bytes!("../../fixtures/Tuffy.ttf");

fn ink_columns(frame: &FrameRGBA, keep: impl Fn([u8; 4]) -> bool) -> Option<(u32, u32)> {
    let mut span: Option<(u32, u32)> = None;
    for y in 0..frame.height {
        for x in 0..frame.width {
            if frame.pixel(x, y).is_some_and(&keep) {
                span = Some(match span {
                    None => (x, x),
                    Some((lo, hi)) => (lo.min(x), hi.max(x)),
                });
            }
        }
    }
    span
}

#[test]
fn centered_text_draws_glyphs_around_the_anchor() {
    let mut s = CpuSurface::new(canvas(200, 60), 1.0).unwrap();
    s.load_font(TUFFY.to_vec()).unwrap();
    assert!(s.has_font());

    let style = TextStyle {
        size: 16.0,
        color: RED,
        align: TextAlign::Center,
    };
    let width = s.measure_text("Deploy", &style);
    assert!(width > 20.0 && width < 100.0, "width {width}");

    s.begin_frame();
    s.fill_text("Deploy", Point::new(100.0, 30.0), &style);
    let frame = s.finish_frame().unwrap();

    let (lo, hi) = ink_columns(&frame, |p| p[3] > 0).expect("glyphs were drawn");
    let mid = f64::from(lo + hi) / 2.0;
    assert!((mid - 100.0).abs() <= 4.0, "ink spans {lo}..={hi}");
    assert!(f64::from(hi - lo) <= width + 2.0);
}

#[test]
fn text_shadow_is_an_offset_copy() {
    const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    let mut s = CpuSurface::new(canvas(200, 60), 1.0).unwrap();
    s.load_font(TUFFY.to_vec()).unwrap();
    let style = TextStyle {
        size: 16.0,
        color: RED,
        align: TextAlign::Center,
    };

    s.begin_frame();
    s.set_shadow(Some(Shadow::drop(BLUE, 4.0, Vec2::new(0.0, 20.0))));
    s.fill_text("Deploy", Point::new(100.0, 18.0), &style);
    let frame = s.finish_frame().unwrap();

    let shadow_rows: Vec<u32> = (0..frame.height)
        .filter(|&y| (0..frame.width).any(|x| frame.pixel(x, y).is_some_and(|p| p[2] > 0 && p[0] == 0)))
        .collect();
    assert!(!shadow_rows.is_empty(), "shadow pass drew nothing");
    assert!(shadow_rows.iter().all(|&y| y > 18));
    assert!(ink_columns(&frame, |p| p[0] > 0).is_some());
}
