use crate::math::geo::great_circle_distance;

/// Name reported when no launch site lies within [`MAX_SITE_DISTANCE_M`].
pub const UNKNOWN_SITE: &str = "Unknown";

/// Launch sites further away than this are never matched.
pub const MAX_SITE_DISTANCE_M: f64 = 10_000.0;

/// Named launch site in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchSite {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Known launch sites, in lookup order.
pub static LAUNCH_SITES: &[LaunchSite] = &[
    LaunchSite {
        name: "Sonnwendstein",
        latitude: 47.622361,
        longitude: 15.8575,
    },
    LaunchSite {
        name: "Hohe Wand",
        latitude: 47.829167,
        longitude: 16.041111,
    },
];

/// Nearest site from `sites` closer than [`MAX_SITE_DISTANCE_M`]; first entry wins ties.
pub fn nearest_in<'a>(sites: &'a [LaunchSite], latitude: f64, longitude: f64) -> Option<&'a LaunchSite> {
    let mut best: Option<&LaunchSite> = None;
    let mut best_distance = MAX_SITE_DISTANCE_M;
    for site in sites {
        let distance = great_circle_distance(latitude, longitude, site.latitude, site.longitude);
        if distance < best_distance {
            best_distance = distance;
            best = Some(site);
        }
    }
    best
}

/// Classifies a coordinate against the built-in gazetteer.
pub fn nearest_launch_site(latitude: f64, longitude: f64) -> &'static str {
    nearest_in(LAUNCH_SITES, latitude, longitude)
        .map(|site| site.name)
        .unwrap_or(UNKNOWN_SITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_near_site_is_named() {
        assert_eq!(nearest_launch_site(47.6225, 15.8570), "Sonnwendstein");
        assert_eq!(nearest_launch_site(47.80, 16.00), "Hohe Wand");
    }

    #[test]
    fn distant_coordinate_is_unknown() {
        assert_eq!(nearest_launch_site(46.0, 11.0), UNKNOWN_SITE);
        // roughly 11 km north of Sonnwendstein
        assert_eq!(nearest_launch_site(47.72, 15.8575), UNKNOWN_SITE);
    }

    #[test]
    fn equidistant_sites_resolve_to_first_entry() {
        let sites = [
            LaunchSite {
                name: "West",
                latitude: 47.0,
                longitude: 14.875,
            },
            LaunchSite {
                name: "East",
                latitude: 47.0,
                longitude: 15.125,
            },
        ];
        assert_eq!(nearest_in(&sites, 47.0, 15.0).map(|s| s.name), Some("West"));
    }
}
