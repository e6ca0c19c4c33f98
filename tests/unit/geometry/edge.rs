use super::*;

fn r(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

#[test]
fn horizontal_neighbours_attach_to_facing_sides() {
    let source = r(55.0, 90.0, 210.0, 140.0);
    let github = r(335.0, 90.0, 180.0, 140.0);
    assert_eq!(edge_point(source, github), Point::new(265.0, 160.0));
    assert_eq!(edge_point(github, source), Point::new(335.0, 160.0));
}

#[test]
fn vertical_neighbours_attach_to_top_and_bottom() {
    let top = r(0.0, 0.0, 100.0, 50.0);
    let bottom = r(0.0, 300.0, 100.0, 50.0);
    assert_eq!(edge_point(top, bottom), Point::new(50.0, 50.0));
    assert_eq!(edge_point(bottom, top), Point::new(50.0, 300.0));
}

#[test]
fn ties_prefer_the_vertical_axis() {
    let a = r(0.0, 0.0, 10.0, 10.0);
    let diag = r(100.0, 100.0, 10.0, 10.0);
    assert_eq!(edge_point(a, diag), Point::new(5.0, 10.0));
    // Coincident centers fall through to the top side.
    assert_eq!(edge_point(a, a), Point::new(5.0, 0.0));
}

#[test]
fn generic_edge_points_lie_on_the_boundary() {
    let rects = [
        r(55.0, 90.0, 210.0, 140.0),
        r(1085.0, 90.0, 210.0, 140.0),
        r(55.0, 470.0, 210.0, 140.0),
        r(600.0, 300.0, 40.0, 40.0),
        r(-20.0, 650.0, 80.0, 30.0),
    ];
    for a in rects {
        for b in rects {
            let p = edge_point(a, b);
            assert!(on_boundary(a, p), "{p:?} not on {a:?}");
        }
    }
}

#[test]
fn anchors_resolve_to_fixed_offsets() {
    let registry = r(1100.0, 50.0, 180.0, 120.0);
    let webhook = r(50.0, 430.0, 180.0, 120.0);

    let start = Anchor::new(Side::Bottom, -50.0).resolve(registry);
    let end = Anchor::new(Side::Top, 50.0).resolve(webhook);
    assert_eq!(start, Point::new(1230.0, 170.0));
    assert_eq!(end, Point::new(100.0, 430.0));

    assert_eq!(
        Anchor::new(Side::Left, 10.0).resolve(registry),
        Point::new(1100.0, 60.0)
    );
    assert_eq!(
        Anchor::new(Side::Right, -10.0).resolve(registry),
        Point::new(1280.0, 160.0)
    );
}

#[test]
fn boundary_check_rejects_interior_points() {
    let a = r(0.0, 0.0, 10.0, 10.0);
    assert!(!on_boundary(a, Point::new(5.0, 5.0)));
    assert!(on_boundary(a, Point::new(10.0, 3.0)));
    assert!(!on_boundary(a, Point::new(10.0, 30.0)));
}
