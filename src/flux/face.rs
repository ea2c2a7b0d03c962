//! Face flux evaluation for the update kernel.
//!
//! Every interior face is visited once, by its owner: the adjacent cell with
//! the lower index. Each owned face and each boundary face gets a slot; the
//! flux vector of a slot has one entry per face dof, in face-local order, and
//! is oriented along the owner's outward normal.

use super::upwind_flux;
use crate::boundary::BoundaryTable;
use crate::error::TopologyError;
use crate::mesh::{BoundaryTag, DofHandler, ElementFace, FACES_PER_CELL, FaceLink, Mesh2D};
use crate::operators::OperatorStore;

/// How a cell relates to one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceRole {
    /// This cell has the lower index; the flux is computed from here.
    Owner { neighbor: ElementFace, slot: usize },
    /// The cell across the face owns it.
    Neighbor { owner: ElementFace, slot: usize },
    /// Domain boundary.
    Boundary { tag: BoundaryTag, slot: usize },
}

impl FaceRole {
    /// Flux slot of the face.
    #[inline]
    pub fn slot(&self) -> usize {
        match *self {
            FaceRole::Owner { slot, .. }
            | FaceRole::Neighbor { slot, .. }
            | FaceRole::Boundary { slot, .. } => slot,
        }
    }

    /// +1 if the slot's flux is along this cell's outward normal, -1 otherwise.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            FaceRole::Neighbor { .. } => -1.0,
            _ => 1.0,
        }
    }
}

/// The face behind a flux slot, seen from the side that computes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FluxSlot {
    Interior {
        owner: ElementFace,
        neighbor: ElementFace,
    },
    Boundary {
        owner: ElementFace,
        tag: BoundaryTag,
    },
}

impl FluxSlot {
    /// Cell and face that compute the slot.
    #[inline]
    pub fn owner(&self) -> ElementFace {
        match *self {
            FluxSlot::Interior { owner, .. } | FluxSlot::Boundary { owner, .. } => owner,
        }
    }
}

/// Resolved face roles for a validated mesh.
#[derive(Clone, Debug)]
pub struct FaceTable {
    roles: Vec<[FaceRole; 4]>,
    slots: Vec<FluxSlot>,
}

impl FaceTable {
    /// Resolve owner/neighbor/boundary roles.
    ///
    /// Fails if any link is not reciprocal or any boundary face is untagged.
    pub fn new(mesh: &Mesh2D) -> Result<Self, TopologyError> {
        mesh.validate_topology()?;

        let n = mesh.n_elements;
        let mut slot_of: Vec<[usize; 4]> = vec![[usize::MAX; 4]; n];
        let mut slots = Vec::new();

        // Slots are numbered in owner visitation order
        for cell in 0..n {
            for face in 0..FACES_PER_CELL {
                let owner = ElementFace::new(cell, face);
                let slot = match mesh.face_link(cell, face) {
                    FaceLink::Interior(neighbor) if neighbor.element > cell => {
                        FluxSlot::Interior { owner, neighbor }
                    }
                    FaceLink::Interior(_) => continue,
                    FaceLink::Boundary(Some(tag)) => FluxSlot::Boundary { owner, tag },
                    FaceLink::Boundary(None) => {
                        return Err(TopologyError::UntaggedBoundary { cell, face });
                    }
                };
                slot_of[cell][face] = slots.len();
                slots.push(slot);
            }
        }

        let mut roles = Vec::with_capacity(n);
        for cell in 0..n {
            let mut row = [FaceRole::Boundary {
                tag: BoundaryTag::Outflow,
                slot: 0,
            }; 4];
            for (face, role) in row.iter_mut().enumerate() {
                *role = match mesh.face_link(cell, face) {
                    FaceLink::Interior(nb) if nb.element > cell => FaceRole::Owner {
                        neighbor: nb,
                        slot: slot_of[cell][face],
                    },
                    FaceLink::Interior(nb) => FaceRole::Neighbor {
                        owner: nb,
                        slot: slot_of[nb.element][nb.face],
                    },
                    FaceLink::Boundary(Some(tag)) => FaceRole::Boundary {
                        tag,
                        slot: slot_of[cell][face],
                    },
                    FaceLink::Boundary(None) => {
                        return Err(TopologyError::UntaggedBoundary { cell, face });
                    }
                };
            }
            roles.push(row);
        }

        Ok(Self { roles, slots })
    }

    #[inline]
    pub fn role(&self, cell: usize, face: usize) -> FaceRole {
        self.roles[cell][face]
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.roles.len()
    }

    /// Number of flux slots (owned interior faces plus boundary faces).
    #[inline]
    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn slot(&self, slot: usize) -> FluxSlot {
        self.slots[slot]
    }

    /// Cell and face that compute `slot`.
    #[inline]
    pub fn slot_owner(&self, slot: usize) -> ElementFace {
        self.slots[slot].owner()
    }
}

/// Computes upwind flux vectors from the frozen old solution.
#[derive(Clone, Copy)]
pub struct FaceFluxEvaluator<'a> {
    pub store: &'a OperatorStore,
    pub dofs: &'a DofHandler,
    pub boundary: &'a BoundaryTable,
}

impl<'a> FaceFluxEvaluator<'a> {
    pub fn new(store: &'a OperatorStore, dofs: &'a DofHandler, boundary: &'a BoundaryTable) -> Self {
        Self {
            store,
            dofs,
            boundary,
        }
    }

    /// Flux across face `face` of owner `cell`, shared with `neighbor`.
    pub fn interior_flux(
        &self,
        old: &[f64],
        cell: usize,
        face: usize,
        neighbor: ElementFace,
        out: &mut [f64],
    ) {
        let map = self.store.face_map();
        let a_n = &self.store.cell(cell).normal_velocity[face];
        let owner_dofs = self.dofs.cell_dof_indices(cell);
        let neighbor_dofs = self.dofs.cell_dof_indices(neighbor.element);

        for (k, flux) in out.iter_mut().enumerate() {
            let u_owner = old[owner_dofs[map.cell_dof(face, k)]];
            let u_neighbor = old[neighbor_dofs[map.cell_dof(neighbor.face, k)]];
            *flux = upwind_flux(u_owner, u_neighbor, a_n[k]);
        }
    }

    /// Flux across boundary face `face` of `cell`, against the ghost value.
    pub fn boundary_flux(
        &self,
        old: &[f64],
        cell: usize,
        face: usize,
        tag: BoundaryTag,
        out: &mut [f64],
    ) {
        let map = self.store.face_map();
        let a_n = &self.store.cell(cell).normal_velocity[face];
        let owner_dofs = self.dofs.cell_dof_indices(cell);
        let rule = self.boundary.rule(tag);

        for (k, flux) in out.iter_mut().enumerate() {
            let u_owner = old[owner_dofs[map.cell_dof(face, k)]];
            *flux = upwind_flux(u_owner, rule.ghost_value(u_owner), a_n[k]);
        }
    }

    /// Flux of `slot`, computed from its owning side.
    pub fn slot_flux(&self, old: &[f64], table: &FaceTable, slot: usize, out: &mut [f64]) {
        match table.slot(slot) {
            FluxSlot::Interior { owner, neighbor } => {
                self.interior_flux(old, owner.element, owner.face, neighbor, out)
            }
            FluxSlot::Boundary { owner, tag } => {
                self.boundary_flux(old, owner.element, owner.face, tag, out)
            }
        }
    }
}
