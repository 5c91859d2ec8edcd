//! Per-face boundary conditions on the ghost layer.

use crate::error::GridError;
use crate::field::ScalarField3;

/// Face names in descriptor order: `(axis, side)` pairs with the side
/// varying fastest.
pub const FACE_NAMES: [&str; 6] = ["-x", "+x", "-y", "+y", "-z", "+z"];

/// Boundary kind tag, as it appears before validation pairs it with an
/// optional scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Impose a fixed ghost temperature.
    Dirichlet,
    /// Add a fixed increment to the ghost each application. This encodes
    /// a gradient boundary as a per-step offset, not a flux density.
    Neumann,
    /// Mirror the first interior cell into the ghost (zero normal
    /// gradient).
    Adiabatic,
}

/// A validated per-face condition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceCondition {
    /// Ghost is set to the value.
    Dirichlet(f64),
    /// Ghost is incremented by the value.
    Neumann(f64),
    /// Ghost mirrors its inward neighbor.
    Adiabatic,
}

/// The six face conditions of one subdomain, in [`FACE_NAMES`] order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundarySet {
    faces: [FaceCondition; 6],
}

impl BoundarySet {
    /// Validate six `(kind, value)` descriptors into a boundary set.
    ///
    /// # Errors
    ///
    /// Returns `Err` for any Dirichlet or Neumann descriptor whose value
    /// is absent. A value supplied with Adiabatic is ignored.
    pub fn new(descriptors: [(BoundaryKind, Option<f64>); 6]) -> Result<Self, GridError> {
        let mut faces = [FaceCondition::Adiabatic; 6];
        for (f, (kind, value)) in descriptors.into_iter().enumerate() {
            faces[f] = match (kind, value) {
                (BoundaryKind::Dirichlet, Some(v)) => FaceCondition::Dirichlet(v),
                (BoundaryKind::Neumann, Some(v)) => FaceCondition::Neumann(v),
                (BoundaryKind::Adiabatic, _) => FaceCondition::Adiabatic,
                (BoundaryKind::Dirichlet, None) => {
                    return Err(GridError::MissingBoundaryValue {
                        face: FACE_NAMES[f],
                        kind: "Dirichlet",
                    })
                }
                (BoundaryKind::Neumann, None) => {
                    return Err(GridError::MissingBoundaryValue {
                        face: FACE_NAMES[f],
                        kind: "Neumann",
                    })
                }
            };
        }
        Ok(Self { faces })
    }

    /// All six faces adiabatic.
    pub fn adiabatic() -> Self {
        Self {
            faces: [FaceCondition::Adiabatic; 6],
        }
    }

    /// The same Dirichlet temperature on all six faces.
    pub fn uniform_dirichlet(value: f64) -> Self {
        Self {
            faces: [FaceCondition::Dirichlet(value); 6],
        }
    }

    /// Condition of face `f` in [`FACE_NAMES`] order.
    pub fn face(&self, f: usize) -> FaceCondition {
        self.faces[f]
    }

    /// Apply the conditions of the listed faces to `field`'s ghost
    /// layer.
    ///
    /// Each face writes only its own ghost slab (the ghost layer
    /// restricted to the transverse interior), so application order is
    /// unobservable. Interior cells are never modified. Callers pass
    /// the subset of faces that sit on the global boundary; ghost slabs
    /// on rank-interface faces are owned by the halo exchange instead.
    pub fn apply(&self, field: &mut ScalarField3, faces: impl IntoIterator<Item = usize>) {
        let dims = field.dims();
        for f in faces {
            let axis = f / 2;
            let plus = f % 2 == 1;
            // Ghost layer index and the interior cell an adiabatic face
            // mirrors (one step along the inward normal).
            let (ghost, inward) = if plus {
                (dims[axis] - 1, dims[axis] - 2)
            } else {
                (0, 1)
            };
            let cond = self.faces[f];
            let (ta, tb) = ((axis + 1) % 3, (axis + 2) % 3);
            for b in 1..dims[tb] - 1 {
                for a in 1..dims[ta] - 1 {
                    let mut idx = [0usize; 3];
                    idx[axis] = ghost;
                    idx[ta] = a;
                    idx[tb] = b;
                    let [i, j, k] = idx;
                    match cond {
                        FaceCondition::Dirichlet(v) => *field.at_mut(i, j, k) = v,
                        FaceCondition::Neumann(v) => *field.at_mut(i, j, k) += v,
                        FaceCondition::Adiabatic => {
                            idx[axis] = inward;
                            let [mi, mj, mk] = idx;
                            let mirrored = field.at(mi, mj, mk);
                            *field.at_mut(i, j, k) = mirrored;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_faces() -> std::ops::Range<usize> {
        0..6
    }

    #[test]
    fn dirichlet_without_value_fails() {
        let mut desc = [(BoundaryKind::Adiabatic, None); 6];
        desc[3] = (BoundaryKind::Dirichlet, None);
        let err = BoundarySet::new(desc).unwrap_err();
        assert!(err.to_string().contains("+y"));
    }

    #[test]
    fn neumann_without_value_fails() {
        let mut desc = [(BoundaryKind::Adiabatic, None); 6];
        desc[0] = (BoundaryKind::Neumann, None);
        assert!(BoundarySet::new(desc).is_err());
    }

    #[test]
    fn dirichlet_sets_ghosts() {
        let mut field = ScalarField3::with_ghosts([3, 3, 3], 0.0);
        let bc = BoundarySet::uniform_dirichlet(100.0);
        bc.apply(&mut field, all_faces());
        assert_eq!(field.at(0, 2, 2), 100.0);
        assert_eq!(field.at(4, 2, 2), 100.0);
        assert_eq!(field.at(2, 0, 2), 100.0);
        assert_eq!(field.at(2, 2, 4), 100.0);
        // Interior untouched.
        assert_eq!(field.at(2, 2, 2), 0.0);
    }

    #[test]
    fn adiabatic_mirrors_inward_neighbor() {
        let mut field = ScalarField3::with_ghosts([3, 3, 3], 0.0);
        *field.at_mut(1, 2, 2) = 7.0;
        *field.at_mut(3, 2, 2) = 9.0;
        let bc = BoundarySet::adiabatic();
        bc.apply(&mut field, all_faces());
        assert_eq!(field.at(0, 2, 2), 7.0);
        assert_eq!(field.at(4, 2, 2), 9.0);
    }

    #[test]
    fn neumann_accumulates_per_application() {
        let mut field = ScalarField3::with_ghosts([2, 2, 2], 1.0);
        let mut desc = [(BoundaryKind::Adiabatic, None); 6];
        desc[0] = (BoundaryKind::Neumann, Some(0.5));
        let bc = BoundarySet::new(desc).unwrap();
        bc.apply(&mut field, [0]);
        bc.apply(&mut field, [0]);
        assert_eq!(field.at(0, 1, 1), 2.0);
    }

    #[test]
    fn faces_write_disjoint_slabs() {
        // Opposing Dirichlet values must not bleed across faces.
        let mut field = ScalarField3::with_ghosts([3, 3, 3], 0.0);
        let mut desc = [(BoundaryKind::Adiabatic, None); 6];
        desc[0] = (BoundaryKind::Dirichlet, Some(1.0));
        desc[1] = (BoundaryKind::Dirichlet, Some(2.0));
        let bc = BoundarySet::new(desc).unwrap();
        bc.apply(&mut field, [0, 1]);
        for k in 1..4 {
            for j in 1..4 {
                assert_eq!(field.at(0, j, k), 1.0);
                assert_eq!(field.at(4, j, k), 2.0);
            }
        }
    }

    #[test]
    fn subset_of_faces_leaves_others_alone() {
        let mut field = ScalarField3::with_ghosts([2, 2, 2], 0.0);
        let bc = BoundarySet::uniform_dirichlet(5.0);
        bc.apply(&mut field, [2]); // -y only
        assert_eq!(field.at(1, 0, 1), 5.0);
        assert_eq!(field.at(0, 1, 1), 0.0);
        assert_eq!(field.at(1, 3, 1), 0.0);
    }
}
