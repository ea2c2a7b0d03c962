//! Face-local to cell-local dof mapping for tensor-product cells.
//!
//! With the x-fastest node order k = i + (p+1) j, the p+1 dofs of a face are
//! an arithmetic progression:
//!
//! | face | side  | first dof   | stride |
//! |------|-------|-------------|--------|
//! | 0    | x-min | 0           | p + 1  |
//! | 1    | x-max | p           | p + 1  |
//! | 2    | y-min | 0           | 1      |
//! | 3    | y-max | (p + 1) p   | 1      |
//!
//! Face-local position k runs along the positive axis on every face, so two
//! cells sharing a face read the same physical node at the same k.

/// Maps (face, face-local index) to a cell-local dof index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceDofMap {
    order: usize,
    first_dof: [usize; 4],
    stride: [usize; 4],
}

impl FaceDofMap {
    pub fn new(order: usize) -> Self {
        let n_1d = order + 1;
        Self {
            order,
            first_dof: [0, order, 0, n_1d * order],
            stride: [n_1d, n_1d, 1, 1],
        }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn dofs_per_face(&self) -> usize {
        self.order + 1
    }

    #[inline]
    pub fn dofs_per_cell(&self) -> usize {
        (self.order + 1) * (self.order + 1)
    }

    /// Cell-local dof at position `k` of face `face`.
    #[inline]
    pub fn cell_dof(&self, face: usize, k: usize) -> usize {
        debug_assert!(face < 4 && k <= self.order);
        self.first_dof[face] + k * self.stride[face]
    }

    /// Cell-local dofs of `face`, in face-local order.
    pub fn face_dofs(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.dofs_per_face()).map(move |k| self.cell_dof(face, k))
    }

    /// Every face a cell-local dof lies on (corner dofs lie on two).
    pub fn faces_of(&self, cell_local: usize) -> Vec<usize> {
        let n_1d = self.order + 1;
        let (i, j) = (cell_local % n_1d, cell_local / n_1d);
        let mut faces = Vec::with_capacity(2);
        if i == 0 {
            faces.push(0);
        }
        if i == self.order {
            faces.push(1);
        }
        if j == 0 {
            faces.push(2);
        }
        if j == self.order {
            faces.push(3);
        }
        faces
    }

    /// Inverse of [`FaceDofMap::cell_dof`] on one face.
    pub fn face_local_index(&self, face: usize, cell_local: usize) -> Option<usize> {
        let offset = cell_local.checked_sub(self.first_dof[face])?;
        let k = offset / self.stride[face];
        (offset % self.stride[face] == 0 && k <= self.order).then_some(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_one_face_sets() {
        let map = FaceDofMap::new(1);
        let sets: Vec<Vec<usize>> = (0..4).map(|f| map.face_dofs(f).collect()).collect();
        assert_eq!(sets[0], vec![0, 2]);
        assert_eq!(sets[1], vec![1, 3]);
        assert_eq!(sets[2], vec![0, 1]);
        assert_eq!(sets[3], vec![2, 3]);
    }

    #[test]
    fn test_order_two_face_sets() {
        let map = FaceDofMap::new(2);
        assert_eq!(map.face_dofs(0).collect::<Vec<_>>(), vec![0, 3, 6]);
        assert_eq!(map.face_dofs(1).collect::<Vec<_>>(), vec![2, 5, 8]);
        assert_eq!(map.face_dofs(2).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(map.face_dofs(3).collect::<Vec<_>>(), vec![6, 7, 8]);
    }

    #[test]
    fn test_face_local_index_inverts_cell_dof() {
        for order in 1..=4 {
            let map = FaceDofMap::new(order);
            for face in 0..4 {
                for k in 0..map.dofs_per_face() {
                    let dof = map.cell_dof(face, k);
                    assert_eq!(map.face_local_index(face, dof), Some(k));
                    assert!(map.faces_of(dof).contains(&face));
                }
            }
        }
    }

    #[test]
    fn test_interior_dofs_on_no_face() {
        let map = FaceDofMap::new(2);
        assert!(map.faces_of(4).is_empty());
        assert_eq!(map.face_local_index(0, 4), None);
        assert_eq!(map.faces_of(0), vec![0, 2]);
        assert_eq!(map.faces_of(8), vec![1, 3]);
    }

    #[test]
    fn test_each_face_hits_distinct_dofs() {
        for order in 1..=5 {
            let map = FaceDofMap::new(order);
            for face in 0..4 {
                let mut dofs: Vec<usize> = map.face_dofs(face).collect();
                dofs.sort_unstable();
                dofs.dedup();
                assert_eq!(dofs.len(), order + 1);
                assert!(dofs.iter().all(|&d| d < map.dofs_per_cell()));
            }
        }
    }
}
