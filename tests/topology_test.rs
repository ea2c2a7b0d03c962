//! Topology validation: broken adjacency and untagged boundaries are
//! rejected before any operator is built or any step is taken.

use dg_advect::error::{AssemblyError, TopologyError};
use dg_advect::mesh::{ElementFace, FaceLink};
use dg_advect::{
    BoundaryTable, BoundaryTag, DofHandler, FaceTable, LocalOperatorBuilder, Mesh2D, UniformWind,
    UpdateKernel,
};

fn tagged_mesh(n: usize) -> Mesh2D {
    let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n);
    mesh.set_boundary_ids();
    mesh
}

#[test]
fn test_valid_mesh_accepted() {
    let mesh = tagged_mesh(4);
    assert!(mesh.validate_topology().is_ok());
    let table = FaceTable::new(&mesh).unwrap();
    assert_eq!(table.n_slots(), 2 * 4 * 3 + 4 * 4);
}

#[test]
fn test_missing_reciprocal_rejected_everywhere() {
    let mut mesh = tagged_mesh(3);
    // Cell 0's x-max face points at cell 1, but cell 1 now points at cell 4
    mesh.set_face_link(1, 0, FaceLink::Interior(ElementFace::new(4, 1)));

    let err = mesh.validate_topology().unwrap_err();
    assert!(matches!(err, TopologyError::MissingReciprocal { .. }), "{err}");
    assert!(FaceTable::new(&mesh).is_err());

    let assembly = LocalOperatorBuilder::new(1).assemble(&mesh, &UniformWind::new(1.0, 0.0));
    assert!(matches!(
        assembly,
        Err(AssemblyError::Topology(TopologyError::MissingReciprocal { .. }))
    ));
}

#[test]
fn test_untagged_boundary_rejected() {
    let mut mesh = tagged_mesh(2);
    mesh.set_face_link(3, 3, FaceLink::Boundary(None));
    assert_eq!(
        mesh.validate_topology(),
        Err(TopologyError::UntaggedBoundary { cell: 3, face: 3 })
    );
}

#[test]
fn test_out_of_range_neighbor_rejected() {
    let mut mesh = tagged_mesh(2);
    mesh.set_face_link(0, 1, FaceLink::Interior(ElementFace::new(17, 0)));
    assert!(matches!(
        mesh.validate_topology(),
        Err(TopologyError::NeighborOutOfRange { n_cells: 4, .. })
    ));
}

#[test]
fn test_kernel_rejects_broken_mesh_after_assembly() {
    // Operators built on a good mesh cannot be run on a broken one
    let good = tagged_mesh(2);
    let wind = UniformWind::new(0.0, 1.0);
    let store = LocalOperatorBuilder::new(1).assemble(&good, &wind).unwrap();
    let dofs = DofHandler::new(&good, 1);
    let boundary = BoundaryTable::default();

    let mut broken = good.clone();
    broken.set_face_link(0, 0, FaceLink::Boundary(None));
    assert!(UpdateKernel::new(&broken, &dofs, &store, &boundary).is_err());
    assert!(UpdateKernel::new(&good, &dofs, &store, &boundary).is_ok());
}

#[test]
fn test_boundary_tags_on_unit_square() {
    let mesh = tagged_mesh(4);
    let mut counts = [0usize; 3];
    for cell in 0..mesh.n_elements {
        for face in 0..4 {
            if let Some(tag) = mesh.boundary_tag(cell, face) {
                counts[tag.id()] += 1;
            }
        }
    }
    // x = 0 side, y = 0 side, then the rest
    assert_eq!(counts, [4, 4, 8]);
    assert_eq!(mesh.boundary_tag(0, 0), Some(BoundaryTag::Inflow));
    assert_eq!(mesh.boundary_tag(0, 2), Some(BoundaryTag::Bottom));
    assert_eq!(mesh.boundary_tag(15, 1), Some(BoundaryTag::Outflow));
}
