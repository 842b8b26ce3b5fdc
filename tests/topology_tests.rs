use knitmesh::{KnitError, LinkClass, LinkId, Topology};
use test_case::test_case;

#[test]
fn two_by_one_grid_counts() {
    let topo = Topology::build(2, 1).expect("valid dimensions");
    assert_eq!(topo.vertex_count(), 6);
    assert_eq!(topo.face_count(), 2);
    // 2*(1+1) + 1*(2+1)
    assert_eq!(topo.link_count(LinkClass::Stretch), 7);
    // 2*2*1
    assert_eq!(topo.link_count(LinkClass::Shear), 4);
    // (2-1)*(1+1) + (1-1)*(2+1)
    assert_eq!(topo.link_count(LinkClass::Strut), 2);
}

#[test_case(1, 1 ; "single cell")]
#[test_case(1, 5 ; "single wale")]
#[test_case(5, 1 ; "single course")]
#[test_case(3, 3 ; "square")]
#[test_case(30, 30 ; "default size")]
#[test_case(7, 4 ; "wide")]
fn counts_follow_formulas(w: usize, h: usize) {
    let topo = Topology::build(w, h).expect("valid dimensions");
    assert_eq!(topo.vertex_count(), (w + 1) * (h + 1));
    assert_eq!(topo.face_count(), w * h);
    assert_eq!(topo.link_count(LinkClass::Stretch), w * (h + 1) + h * (w + 1));
    assert_eq!(topo.link_count(LinkClass::Shear), 2 * w * h);
    assert_eq!(
        topo.link_count(LinkClass::Strut),
        (w - 1) * (h + 1) + (h - 1) * (w + 1),
        "strut count for {w}x{h}"
    );
}

#[test]
fn single_wale_has_no_horizontal_struts() {
    let topo = Topology::build(1, 3).expect("valid dimensions");
    for link in topo.links(LinkClass::Strut) {
        let (sx, _) = topo.coords(link.source);
        let (tx, _) = topo.coords(link.target);
        assert_eq!(sx, tx, "strut {link:?} should run along the wale");
    }
}

#[test_case(0, 3 ; "zero width")]
#[test_case(3, 0 ; "zero height")]
#[test_case(0, 0 ; "empty")]
fn zero_dimension_rejected(w: usize, h: usize) {
    assert_eq!(Topology::build(w, h), Err(KnitError::InvalidDimension { width: w, height: h }));
}

#[test]
fn build_is_idempotent() {
    let a = Topology::build(6, 4).expect("valid dimensions");
    let b = Topology::build(6, 4).expect("valid dimensions");
    assert_eq!(a, b);
}

#[test]
fn faces_wind_around_their_cell() {
    let topo = Topology::build(3, 2).expect("valid dimensions");
    for face in topo.faces() {
        let x = face.id % 3;
        let y = face.id / 3;
        assert_eq!(
            face.vertices,
            [topo.index(x, y), topo.index(x + 1, y), topo.index(x + 1, y + 1), topo.index(x, y + 1)]
        );
    }
}

#[test]
fn shear_links_name_their_face() {
    let topo = Topology::build(3, 2).expect("valid dimensions");
    for link in topo.links(LinkClass::Shear) {
        let face = topo.face(link.face.expect("shear links carry a face")).expect("face exists");
        assert!(face.vertices.contains(&link.source));
        assert!(face.vertices.contains(&link.target));
    }
    assert!(topo.links(LinkClass::Stretch).iter().all(|l| l.face.is_none()));
}

#[test]
fn link_lookup_checks_bounds() {
    let topo = Topology::build(2, 1).expect("valid dimensions");
    assert!(topo.link(LinkId::new(LinkClass::Strut, 1)).is_ok());
    assert_eq!(
        topo.link(LinkId::new(LinkClass::Strut, 2)),
        Err(KnitError::LinkOutOfBounds { class: LinkClass::Strut, index: 2, count: 2 })
    );
    assert_eq!(topo.check_vertex(6), Err(KnitError::VertexOutOfBounds { index: 6, count: 6 }));
}
