//! Smooth normal synthesis for outline rendering
//!
//! Vertices are grouped by position quantized to a per-axis epsilon grid.
//! Welding is grid-based, not a distance test: two positions closer than
//! epsilon but on opposite sides of a cell boundary stay in separate groups.
//! Each group's normals are summed, renormalized and written to every
//! member's `smooth_normal`. The shading `normal` is left untouched, so
//! running this twice gives the same result.

use glam::Vec3;
use hashbrown::HashMap;

use crate::vertex::Vertex;

/// Quantized position used as the weld key
type WeldKey = [i64; 3];

#[inline]
fn weld_key(position: [f32; 3], epsilon: f32) -> WeldKey {
    position.map(|c| (c / epsilon).round() as i64)
}

/// Write welded smooth normals into `vertices`
///
/// Returns the number of distinct position groups.
pub fn synthesize_smooth_normals(vertices: &mut [Vertex], epsilon: f32) -> usize {
    let epsilon = if epsilon > 0.0 { epsilon } else { f32::EPSILON };

    let mut groups: HashMap<WeldKey, usize> = HashMap::with_capacity(vertices.len());
    let mut sums: Vec<Vec3> = Vec::new();
    let mut membership = Vec::with_capacity(vertices.len());

    // Pass 1: accumulate normal sums per group
    for v in vertices.iter() {
        let group = *groups.entry(weld_key(v.position, epsilon)).or_insert_with(|| {
            sums.push(Vec3::ZERO);
            sums.len() - 1
        });
        sums[group] += Vec3::from_array(v.normal);
        membership.push(group);
    }

    // Pass 2: renormalize and write back; degenerate sums keep their own normal
    for (v, group) in vertices.iter_mut().zip(membership) {
        let own = Vec3::from_array(v.normal);
        let smooth = sums[group].try_normalize().unwrap_or(own);
        v.smooth_normal = smooth.to_array();
    }

    tracing::debug!(
        "Smooth normals: {} vertices welded into {} groups",
        vertices.len(),
        sums.len()
    );

    sums.len()
}

/// Copy shading normals into the smooth slot (synthesis disabled)
pub fn copy_normals(vertices: &mut [Vertex]) {
    for v in vertices {
        v.smooth_normal = v.normal;
    }
}
