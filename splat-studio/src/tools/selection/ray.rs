use bevy::prelude::*;

/// Ray against a box given in the local space of `xf`. Returns the distance
/// along `dir` in world units when `dir` is normalised.
pub fn ray_hits_obb(
    origin: Vec3,
    dir: Vec3,
    xf: &GlobalTransform,
    center: Vec3,
    half_extents: Vec3,
) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    ray_aabb_hit_t(o_local, d_local, center - half_extents, center + half_extents)
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray_direction.recip();

    let t1 = (min - ray_origin) * inv;
    let t2 = (max - ray_origin) * inv;

    // Parallel axes give NaN when the origin sits on a slab face; treat as inside.
    let near = t1.min(t2);
    let far = t1.max(t2);
    let tmin = [near.x, near.y, near.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let tmax = [far.x, far.y, far.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::INFINITY, f32::min);

    if tmin > tmax || tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

/// Distance from a screen point to the segment `a..b`, in pixels.
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_unit_box_in_front() {
        let t = ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn misses_box_behind_or_beside() {
        assert!(ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::splat(-1.0), Vec3::ONE).is_none());
        assert!(ray_aabb_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::ONE).is_none());
    }

    #[test]
    fn origin_inside_returns_exit_distance() {
        let t = ray_aabb_hit_t(Vec3::ZERO, Vec3::X, Vec3::splat(-1.0), Vec3::ONE);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn obb_respects_transform_and_center() {
        let xf = GlobalTransform::from(Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let hit = ray_hits_obb(
            Vec3::new(10.0, 2.0, 10.0),
            Vec3::NEG_Z,
            &xf,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::splat(0.5),
        );
        // Box spans z in [-1, 1] world after the 2x scale.
        assert!((hit.unwrap() - 9.0).abs() < 1e-4);

        let miss = ray_hits_obb(Vec3::new(10.0, -2.0, 10.0), Vec3::NEG_Z, &xf, Vec3::Y, Vec3::splat(0.5));
        assert!(miss.is_none());
    }

    #[test]
    fn segment_distance() {
        let d = distance_to_segment(Vec2::new(5.0, 3.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(d, 3.0);
        let d = distance_to_segment(Vec2::new(-4.0, 3.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(d, 5.0);
    }
}
