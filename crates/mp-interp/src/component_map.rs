//! Dof-to-component assignment for mixed spaces.

use std::collections::HashMap;

use crate::space::SpaceLayout;

/// Total mapping from every locally owned global dof index to the index of
/// the leaf subspace it belongs to.
pub type DofComponentMap = HashMap<usize, usize>;

/// Walk the subspace tree depth-first, assigning the next component index
/// to every dof of each leaf. Children are visited in declaration order so
/// component indices line up with the positional indexing consumers use.
pub fn extract_dof_component_map(layout: &SpaceLayout) -> DofComponentMap {
    let mut map = DofComponentMap::new();
    let mut next_component = 0usize;
    descend(layout, &mut next_component, &mut map);
    map
}

fn descend(node: &SpaceLayout, next_component: &mut usize, map: &mut DofComponentMap) {
    if node.is_leaf() {
        for &dof in node.dofs() {
            map.insert(dof, *next_component);
        }
        *next_component += 1;
    } else {
        for child in node.children() {
            descend(child, next_component, map);
        }
    }
}
