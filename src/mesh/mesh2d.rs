//! Uniform Cartesian mesh of axis-aligned quadrilaterals.
//!
//! Cells are numbered row by row, x fastest: cell (i, j) has index j * nx + i.
//!
//! Face convention:
//! - Face 0: x-min side, outward normal (-1, 0)
//! - Face 1: x-max side, outward normal (+1, 0)
//! - Face 2: y-min side, outward normal (0, -1)
//! - Face 3: y-max side, outward normal (0, +1)
//!
//! Every face runs along the positive coordinate axis, so two cells sharing
//! a face traverse it in the same direction.

use super::boundary_tags::BoundaryTag;
use crate::error::TopologyError;

/// Number of faces per cell.
pub const FACES_PER_CELL: usize = 4;

/// Outward unit normal for each face.
pub const FACE_NORMALS: [(f64, f64); 4] = [
    (-1.0, 0.0), // Face 0: x-min
    (1.0, 0.0),  // Face 1: x-max
    (0.0, -1.0), // Face 2: y-min
    (0.0, 1.0),  // Face 3: y-max
];

/// Reference to an element and one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementFace {
    /// Element index
    pub element: usize,
    /// Face index (0-3)
    pub face: usize,
}

impl ElementFace {
    pub fn new(element: usize, face: usize) -> Self {
        Self { element, face }
    }
}

/// What lies across a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceLink {
    /// Shared with another cell; `face` is the id of the same face as seen
    /// from the neighbor.
    Interior(ElementFace),
    /// On the domain boundary. `None` until boundary ids are assigned.
    Boundary(Option<BoundaryTag>),
}

impl FaceLink {
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, FaceLink::Boundary(_))
    }
}

/// Axis-aligned geometry of one cell.
///
/// Maps the reference square [-1, 1]² onto [x0, x0 + hx] × [y0, y0 + hy].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    pub x0: f64,
    pub y0: f64,
    pub hx: f64,
    pub hy: f64,
}

impl CellGeometry {
    /// Reference (r, s) to physical (x, y).
    #[inline]
    pub fn map(&self, r: f64, s: f64) -> (f64, f64) {
        (
            self.x0 + 0.5 * (r + 1.0) * self.hx,
            self.y0 + 0.5 * (s + 1.0) * self.hy,
        )
    }

    /// Determinant of the reference-to-physical Jacobian.
    #[inline]
    pub fn jacobian_det(&self) -> f64 {
        0.25 * self.hx * self.hy
    }

    /// (dr/dx, ds/dy); the off-diagonal entries vanish.
    #[inline]
    pub fn inverse_jacobian(&self) -> (f64, f64) {
        (2.0 / self.hx, 2.0 / self.hy)
    }

    /// Physical length of a face.
    #[inline]
    pub fn face_length(&self, face: usize) -> f64 {
        if face < 2 { self.hy } else { self.hx }
    }

    /// Physical center of a face.
    pub fn face_center(&self, face: usize) -> (f64, f64) {
        match face {
            0 => self.map(-1.0, 0.0),
            1 => self.map(1.0, 0.0),
            2 => self.map(0.0, -1.0),
            _ => self.map(0.0, 1.0),
        }
    }

    /// Physical center of the cell.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        self.map(0.0, 0.0)
    }
}

/// Uniform mesh of [x0, x1] × [y0, y1] with nx × ny cells.
#[derive(Clone, Debug)]
pub struct Mesh2D {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,

    /// Cells in x-direction
    pub nx: usize,
    /// Cells in y-direction
    pub ny: usize,

    /// Cell width
    pub dx: f64,
    /// Cell height
    pub dy: f64,

    /// Number of elements
    pub n_elements: usize,

    /// faces[k][f] = what lies across face f of cell k
    faces: Vec<[FaceLink; 4]>,
}

impl Mesh2D {
    /// Create a uniform rectangular mesh of [x0, x1] × [y0, y1].
    ///
    /// Boundary faces start untagged; call [`Mesh2D::set_boundary_ids`] or
    /// [`Mesh2D::set_boundary_tag`] before handing the mesh to the solver.
    ///
    /// # Panics
    /// Panics if a direction has no cells or the domain is empty.
    pub fn uniform_rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        assert!(
            nx > 0 && ny > 0,
            "Need at least one element in each direction"
        );
        assert!(x1 > x0 && y1 > y0, "Invalid domain bounds");

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;
        let n_elements = nx * ny;

        let elem_idx = |i: usize, j: usize| -> usize { j * nx + i };

        let mut faces = Vec::with_capacity(n_elements);
        for j in 0..ny {
            for i in 0..nx {
                let link = |cond: bool, ni: usize, nj: usize, nface: usize| {
                    if cond {
                        FaceLink::Interior(ElementFace::new(elem_idx(ni, nj), nface))
                    } else {
                        FaceLink::Boundary(None)
                    }
                };
                faces.push([
                    link(i > 0, i.wrapping_sub(1), j, 1),
                    link(i + 1 < nx, i + 1, j, 0),
                    link(j > 0, i, j.wrapping_sub(1), 3),
                    link(j + 1 < ny, i, j + 1, 2),
                ]);
            }
        }

        Self {
            x0,
            x1,
            y0,
            y1,
            nx,
            ny,
            dx,
            dy,
            n_elements,
            faces,
        }
    }

    /// The unit square refined `n_refinements` times: 2ⁿ × 2ⁿ cells.
    pub fn unit_square_refined(n_refinements: u32) -> Self {
        let n = 1usize << n_refinements;
        Self::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n)
    }

    /// Geometry of element k.
    #[inline]
    pub fn cell_geometry(&self, k: usize) -> CellGeometry {
        let i = k % self.nx;
        let j = k / self.nx;
        CellGeometry {
            x0: self.x0 + i as f64 * self.dx,
            y0: self.y0 + j as f64 * self.dy,
            hx: self.dx,
            hy: self.dy,
        }
    }

    /// Map reference coordinates (r, s) in [-1, 1]² to physical coordinates.
    pub fn reference_to_physical(&self, k: usize, r: f64, s: f64) -> (f64, f64) {
        self.cell_geometry(k).map(r, s)
    }

    /// What lies across face `face` of element `element`.
    #[inline]
    pub fn face_link(&self, element: usize, face: usize) -> FaceLink {
        self.faces[element][face]
    }

    /// Neighbor across a face, or None on the boundary.
    #[inline]
    pub fn neighbor(&self, element: usize, face: usize) -> Option<ElementFace> {
        match self.faces[element][face] {
            FaceLink::Interior(nb) => Some(nb),
            FaceLink::Boundary(_) => None,
        }
    }

    /// Face id, on the neighbor's side, of the face shared with `element`.
    pub fn neighbor_of_neighbor(&self, element: usize, face: usize) -> Option<usize> {
        self.neighbor(element, face).map(|nb| nb.face)
    }

    /// Check if a face is on the domain boundary.
    #[inline]
    pub fn is_boundary_face(&self, element: usize, face: usize) -> bool {
        self.faces[element][face].is_boundary()
    }

    /// Boundary tag of a face (None for interior or untagged faces).
    pub fn boundary_tag(&self, element: usize, face: usize) -> Option<BoundaryTag> {
        match self.faces[element][face] {
            FaceLink::Boundary(tag) => tag,
            FaceLink::Interior(_) => None,
        }
    }

    /// Tag a boundary face. Interior faces are left untouched.
    pub fn set_boundary_tag(&mut self, element: usize, face: usize, tag: BoundaryTag) {
        if let FaceLink::Boundary(slot) = &mut self.faces[element][face] {
            *slot = Some(tag);
        }
    }

    /// Overwrite the link of a face.
    ///
    /// Lets callers describe adjacency the uniform constructor does not
    /// produce; [`Mesh2D::validate_topology`] checks the result.
    pub fn set_face_link(&mut self, element: usize, face: usize, link: FaceLink) {
        self.faces[element][face] = link;
    }

    /// Tag every boundary face by the position of its center.
    ///
    /// See [`BoundaryTag::classify`] for the rule.
    pub fn set_boundary_ids(&mut self) {
        for k in 0..self.n_elements {
            let geom = self.cell_geometry(k);
            for face in 0..FACES_PER_CELL {
                if self.is_boundary_face(k, face) {
                    let tag = BoundaryTag::classify(geom.face_center(face));
                    self.set_boundary_tag(k, face, tag);
                }
            }
        }
    }

    /// Number of faces on the domain boundary.
    pub fn n_boundary_faces(&self) -> usize {
        self.faces
            .iter()
            .flat_map(|f| f.iter())
            .filter(|l| l.is_boundary())
            .count()
    }

    /// Number of interior faces, each counted once.
    pub fn n_interior_faces(&self) -> usize {
        (self.n_elements * FACES_PER_CELL - self.n_boundary_faces()) / 2
    }

    /// Check that every interior link is reciprocal and every boundary face
    /// is tagged.
    pub fn validate_topology(&self) -> Result<(), TopologyError> {
        for (cell, links) in self.faces.iter().enumerate() {
            for (face, link) in links.iter().enumerate() {
                match *link {
                    FaceLink::Boundary(None) => {
                        return Err(TopologyError::UntaggedBoundary { cell, face });
                    }
                    FaceLink::Boundary(Some(_)) => {}
                    FaceLink::Interior(nb) => {
                        if nb.element >= self.n_elements || nb.face >= FACES_PER_CELL {
                            return Err(TopologyError::NeighborOutOfRange {
                                cell,
                                face,
                                neighbor: nb.element,
                                neighbor_face: nb.face,
                                n_cells: self.n_elements,
                            });
                        }
                        if nb.element == cell {
                            return Err(TopologyError::SelfNeighbor { cell, face });
                        }
                        let back = self.faces[nb.element][nb.face];
                        if back != FaceLink::Interior(ElementFace::new(cell, face)) {
                            return Err(TopologyError::MissingReciprocal {
                                cell,
                                face,
                                neighbor: nb.element,
                                neighbor_face: nb.face,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Smallest cell edge length.
    pub fn h_min(&self) -> f64 {
        self.dx.min(self.dy)
    }

    /// Largest cell edge length.
    pub fn h_max(&self) -> f64 {
        self.dx.max(self.dy)
    }
}
