/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Planar coordinates of a fix on a spherical Earth.
///
/// Only differences between nearby points are meaningful; this is a local
/// approximation, not a conformal projection.
pub fn to_planar(latitude_deg: f64, longitude_deg: f64) -> (f64, f64) {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    let x = EARTH_RADIUS_M * lat.cos() * lon.cos();
    let y = EARTH_RADIUS_M * lat.cos() * lon.sin();
    (x, y)
}

/// Great-circle distance in meters using the spherical law of cosines.
pub fn great_circle_distance(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let delta_lon = (lon2_deg - lon1_deg).to_radians();

    let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta_lon.cos();
    // rounding can push identical points just above 1.0
    EARTH_RADIUS_M * cosine.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identical_points_are_practically_coincident() {
        assert!(great_circle_distance(47.6, 15.8, 47.6, 15.8) < 1.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = great_circle_distance(47.0, 15.0, 48.0, 15.0);
        assert_relative_eq!(d, 111_194.9, epsilon = 1.0);
    }

    #[test]
    fn planar_projection_of_origin_lies_on_x_axis() {
        let (x, y) = to_planar(0.0, 0.0);
        assert_relative_eq!(x, EARTH_RADIUS_M);
        assert_relative_eq!(y, 0.0);
    }
}
