use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{GenerationSettings, TriangleMesh};

/// Footprints smaller than this cannot be scaled meaningfully.
const MIN_FOOTPRINT: f32 = 1e-6;

/// Configuration for fitting a secondary base object under the vase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Base footprint radius relative to the vase's bottom radius.
    pub radius_factor: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self { radius_factor: 1.1 }
    }
}

/// Where and how large the base mesh ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePlacement {
    /// Horizontal radius the base is scaled to.
    pub target_radius: f32,
}

impl BasePlacement {
    pub fn for_settings(settings: &GenerationSettings, config: &BaseConfig) -> Self {
        Self {
            target_radius: settings.base_radius * config.radius_factor,
        }
    }
}

/// Stacks `primary` on top of `base` and returns both as one mesh.
///
/// The base is scaled uniformly until its horizontal footprint matches
/// `placement.target_radius`, centred on the vertical axis and dropped so its
/// lowest point sits at `y = 0`. The primary mesh is lifted so its lowest
/// point rests on the base's top plane. Buffers are concatenated with the
/// primary first; normals are carried over from the inputs.
///
/// The two parts only touch: no vertices are shared or welded along the
/// joint, so the result is not watertight there.
///
/// Without a usable base the primary mesh is returned unchanged.
pub fn merge_with_base(
    primary: &TriangleMesh,
    base: Option<&TriangleMesh>,
    placement: BasePlacement,
) -> TriangleMesh {
    let Some(base) = base.filter(|base| !base.is_empty()) else {
        return primary.clone();
    };
    let (Some(base_bounds), Some(primary_bounds)) = (base.bounds(), primary.bounds()) else {
        return primary.clone();
    };

    let footprint = base_bounds.footprint_radius();
    let scale = if footprint > MIN_FOOTPRINT && placement.target_radius > 0.0 {
        placement.target_radius / footprint
    } else {
        1.0
    };

    let center = base_bounds.center();
    let base_offset = Vec3::new(-center.x, -base_bounds.min.y, -center.z) * scale;
    let fitted_base = base.scaled(scale).translated(base_offset);
    let base_top = base_bounds.size().y * scale;

    let lift = base_top - primary_bounds.min.y;
    tracing::debug!(scale, base_top, lift, "placing vase on base");

    primary
        .translated(Vec3::new(0.0, lift, 0.0))
        .concat(&fitted_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(width: f32, height: f32) -> TriangleMesh {
        let h = width * 0.5;
        TriangleMesh::indexed(
            vec![
                Vec3::new(-h + 3.0, -2.0, -h),
                Vec3::new(h + 3.0, -2.0, -h),
                Vec3::new(h + 3.0, -2.0 + height, h),
                Vec3::new(-h + 3.0, -2.0 + height, h),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn column() -> TriangleMesh {
        TriangleMesh::indexed(
            vec![
                Vec3::new(-1.0, -5.0, 0.0),
                Vec3::new(1.0, -5.0, 0.0),
                Vec3::new(0.0, 5.0, 1.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn missing_base_returns_primary() {
        let primary = column();
        let placement = BasePlacement { target_radius: 5.5 };

        assert_eq!(merge_with_base(&primary, None, placement), primary);
        assert_eq!(
            merge_with_base(&primary, Some(&TriangleMesh::default()), placement),
            primary
        );
    }

    #[test]
    fn fits_base_and_stacks_primary_on_top() {
        let primary = column();
        let base = slab(4.0, 1.0);
        let placement = BasePlacement { target_radius: 6.0 };
        let merged = merge_with_base(&primary, Some(&base), placement);

        assert_eq!(merged.vertex_count(), 7);
        let (vase, fitted) = merged.positions().split_at(3);

        // Footprint radius 2 scaled to 6: factor 3, so the slab is 3 tall.
        let min_y = fitted.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = fitted.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        assert!(min_y.abs() < 1e-5);
        assert!((max_y - 3.0).abs() < 1e-5);
        let max_x = fitted.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        assert!((max_x - 6.0).abs() < 1e-5);

        let vase_min = vase.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        assert!((vase_min - 3.0).abs() < 1e-5);
    }

    #[test]
    fn offsets_base_indices_by_primary_vertex_count() {
        let merged = merge_with_base(
            &column(),
            Some(&slab(2.0, 2.0)),
            BasePlacement { target_radius: 1.0 },
        );
        let indices = merged.indices().unwrap();
        assert_eq!(indices, &[[0, 1, 2], [3, 4, 5], [3, 5, 6]]);
    }

    #[test]
    fn placement_follows_bottom_radius() {
        let settings = GenerationSettings {
            base_radius: 4.0,
            ..Default::default()
        };
        let placement = BasePlacement::for_settings(&settings, &BaseConfig::default());
        assert!((placement.target_radius - 4.4).abs() < 1e-6);
    }
}
