//! Face-local to cell-local dof mapping checked against the geometric
//! location of the basis support points.

use dg_advect::FaceDofMap;
use dg_advect::basis::{LagrangeBasis2D, face_reference_point};

#[test]
fn test_p1_face_sets() {
    let map = FaceDofMap::new(1);
    let sets: Vec<Vec<usize>> = (0..4).map(|f| map.face_dofs(f).collect()).collect();
    assert_eq!(sets, vec![vec![0, 2], vec![1, 3], vec![0, 1], vec![2, 3]]);
}

#[test]
fn test_face_dofs_lie_on_their_face_in_order() {
    for order in 1..=5 {
        let basis = LagrangeBasis2D::new(order);
        let map = FaceDofMap::new(order);
        let nodes = basis.nodes_1d();

        for face in 0..4 {
            for k in 0..map.dofs_per_face() {
                // k-th face dof sits at the k-th node along the positive axis
                let expected = face_reference_point(face, nodes[k]);
                let actual = basis.support_point(map.cell_dof(face, k));
                assert!(
                    (expected.0 - actual.0).abs() < 1e-14 && (expected.1 - actual.1).abs() < 1e-14,
                    "p={} face {} k={}: {:?} vs {:?}",
                    order,
                    face,
                    k,
                    expected,
                    actual
                );
            }
        }
    }
}

#[test]
fn test_round_trip_through_geometric_location() {
    let on_face = |face: usize, (r, s): (f64, f64)| match face {
        0 => (r + 1.0).abs() < 1e-14,
        1 => (r - 1.0).abs() < 1e-14,
        2 => (s + 1.0).abs() < 1e-14,
        _ => (s - 1.0).abs() < 1e-14,
    };

    for order in 1..=4 {
        let basis = LagrangeBasis2D::new(order);
        let map = FaceDofMap::new(order);

        for cell_local in 0..map.dofs_per_cell() {
            let point = basis.support_point(cell_local);
            let geometric: Vec<usize> = (0..4).filter(|&f| on_face(f, point)).collect();
            assert_eq!(map.faces_of(cell_local), geometric, "p={} dof {}", order, cell_local);

            for &face in &geometric {
                let k = map.face_local_index(face, cell_local).unwrap();
                assert_eq!(map.cell_dof(face, k), cell_local);
            }
        }
    }
}
