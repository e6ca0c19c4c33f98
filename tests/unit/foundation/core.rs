use super::*;

#[test]
fn fps_validation() {
    assert!(Fps::new(60, 1).is_ok());
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(60, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
}

#[test]
fn canvas_validation_rejects_empty_and_huge() {
    assert!(Canvas { width: 1350, height: 700 }.validate().is_ok());
    assert!(Canvas { width: 0, height: 700 }.validate().is_err());
    assert!(
        Canvas {
            width: MAX_SURFACE_DIM + 1,
            height: 10
        }
        .validate()
        .is_err()
    );
}
