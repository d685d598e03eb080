//! Non-matching-mesh interpolation.
//!
//! The destination dofs are filled one owning rank at a time: rank i's dof
//! coordinates are broadcast, every rank probes the source field at those
//! points, and the aggregation protocol merges the values back onto rank i.
//! The ephemeral probe collection is dropped before the next rank's round,
//! so at most one rank's point set is resident anywhere at a time. That is
//! the communication/memory trade-off this routine exists for.

use mp_common::{Error, Result};
use mp_comm::ProcessGroup;
use mp_probe::{gather_on_root, FieldEval, ProbeCollection, Selector};
use tracing::debug;

use crate::component_map::extract_dof_component_map;
use crate::space::FunctionSpace;

/// Fill the destination space's local dof buffer by point-evaluating
/// `source` at every destination dof coordinate.
///
/// All ranks of the group must call this together; the returned buffer
/// holds one value per locally owned destination dof, in local dof order.
/// A destination dof whose coordinate lies outside the source domain is an
/// error on the owning rank (`IncompleteCoverage`), not a silent zero.
pub fn interpolate_nonmatching<F, S, G>(source: &F, dest: &S, group: &G) -> Result<Vec<f64>>
where
    F: FieldEval,
    S: FunctionSpace,
    G: ProcessGroup,
{
    let gdim = dest.geometry_dim();
    if source.geometry_dim() != gdim {
        return Err(Error::GeometryMismatch {
            source: source.geometry_dim(),
            dest: gdim,
        });
    }

    let layout = dest.layout();
    let (start, end) = dest.ownership_range();
    let ndofs = end - start;
    let coords = dest.dof_coordinates();
    if coords.len() != ndofs * gdim {
        return Err(Error::MalformedPoints {
            len: coords.len(),
            gdim,
        });
    }

    // One source component per leaf subspace; a flat destination takes the
    // single source component directly.
    let flat = source.value_size() == 1;
    if layout.is_leaf() && !flat {
        return Err(Error::ValueSizeMismatch {
            value_size: source.value_size(),
        });
    }
    if !layout.is_leaf() && !flat && layout.num_leaves() != source.value_size() {
        return Err(Error::ValueSizeMismatch {
            value_size: source.value_size(),
        });
    }
    let component_map = if layout.is_leaf() {
        None
    } else {
        Some(extract_dof_component_map(&layout))
    };

    let mut dd = vec![0.0; ndofs];
    for owner in 0..group.size() {
        // all ranks see owner's target points, one rank's set at a time
        let mut xb = coords.clone();
        group.broadcast_f64(owner, &mut xb)?;

        let mut probes = ProbeCollection::new(&xb, source)?;
        probes.eval(source);
        let merged = gather_on_root(&probes, Selector::Snapshot(0), owner, group)?;
        drop(probes);

        if owner == group.rank() {
            let data = merged
                .ok_or_else(|| Error::GroupClosed("no merged result on owning rank".into()))?;
            debug!(rank = owner, dofs = ndofs, "filling local dof buffer");
            match &component_map {
                Some(map) if !flat => {
                    for (j, slot) in dd.iter_mut().enumerate() {
                        let dof = start + j;
                        let comp = *map.get(&dof).ok_or(Error::UnmappedDof { dof })?;
                        *slot = data[[j, comp]];
                    }
                }
                _ => {
                    // single-component result arrives squeezed to 1-D
                    for (j, slot) in dd.iter_mut().enumerate() {
                        *slot = data[[j]];
                    }
                }
            }
        }
    }
    Ok(dd)
}
