//! The consumed function-space capability.
//!
//! A (possibly mixed) field space is presented as an explicit tree of
//! subspace nodes rather than a dispatch hierarchy: interior nodes list
//! their sub-spaces in declaration order, leaves carry the locally owned
//! dofs of their collapsed dof set.

/// One node of the subspace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceLayout {
    children: Vec<SpaceLayout>,
    /// Locally owned global dof indices; meaningful on leaves only.
    dofs: Vec<usize>,
}

impl SpaceLayout {
    /// Leaf subspace with its locally owned dofs.
    pub fn leaf(dofs: Vec<usize>) -> Self {
        SpaceLayout {
            children: Vec::new(),
            dofs,
        }
    }

    /// Interior node with sub-spaces in declaration order.
    pub fn mixed(children: Vec<SpaceLayout>) -> Self {
        SpaceLayout {
            children,
            dofs: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[SpaceLayout] {
        &self.children
    }

    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    /// Number of leaf subspaces, i.e. value components.
    pub fn num_leaves(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(SpaceLayout::num_leaves).sum()
        }
    }
}

/// A destination discretization whose dofs are partitioned across ranks.
pub trait FunctionSpace {
    /// Spatial dimension of dof coordinates.
    fn geometry_dim(&self) -> usize;

    /// Contiguous global dof range owned by this rank: inclusive start,
    /// exclusive end.
    fn ownership_range(&self) -> (usize, usize);

    /// Physical coordinates of the local dofs in local dof order,
    /// flattened to `geometry_dim()` values per dof.
    fn dof_coordinates(&self) -> Vec<f64>;

    /// Subspace tree with each leaf's locally owned dofs.
    fn layout(&self) -> SpaceLayout;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_counts() {
        let scalar = SpaceLayout::leaf(vec![0, 1, 2]);
        assert!(scalar.is_leaf());
        assert_eq!(scalar.num_leaves(), 1);

        // W = scalar * vector(3), nested like its declaration
        let w = SpaceLayout::mixed(vec![
            SpaceLayout::leaf(vec![0, 4]),
            SpaceLayout::mixed(vec![
                SpaceLayout::leaf(vec![1, 5]),
                SpaceLayout::leaf(vec![2, 6]),
                SpaceLayout::leaf(vec![3, 7]),
            ]),
        ]);
        assert!(!w.is_leaf());
        assert_eq!(w.num_leaves(), 4);
        assert_eq!(w.children().len(), 2);
    }
}
