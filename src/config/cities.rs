use crate::domain::Location;

/// Name, latitude, longitude, elevation (m), country
type CityRow = (&'static str, f64, f64, f64, &'static str);

const CITIES: &[CityRow] = &[
    ("Los Gatos", 37.2358, -121.9624, 125.0, "US"),
    ("San Jose", 37.3382, -121.8863, 26.0, "US"),
    ("San Francisco", 37.7749, -122.4194, 16.0, "US"),
    ("Los Angeles", 34.0522, -118.2437, 89.0, "US"),
    ("Chicago", 41.8781, -87.6298, 181.0, "US"),
    ("New York", 40.7128, -74.0060, 10.0, "US"),
    ("Boston", 42.3601, -71.0589, 14.0, "US"),
    ("Honolulu", 21.3069, -157.8583, 6.0, "US"),
    ("London", 51.5072, -0.1276, 11.0, "GB"),
    ("Paris", 48.8566, 2.3522, 35.0, "FR"),
    ("Berlin", 52.5200, 13.4050, 34.0, "DE"),
    ("Rome", 41.9028, 12.4964, 21.0, "IT"),
    ("Cairo", 30.0444, 31.2357, 23.0, "EG"),
    ("Mumbai", 19.0760, 72.8777, 14.0, "IN"),
    ("Tokyo", 35.6762, 139.6503, 40.0, "JP"),
    ("Sydney", -33.8688, 151.2093, 58.0, "AU"),
];

/// Built-in site by case-insensitive name
pub fn lookup(name: &str) -> Option<Location> {
    let name = name.trim();
    CITIES
        .iter()
        .find(|(city, ..)| city.eq_ignore_ascii_case(name))
        .map(|&(city, latitude, longitude, elevation_m, country)| Location {
            name: city.to_string(),
            latitude,
            longitude,
            elevation_m,
            country: Some(country.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case_and_padding() {
        let city = lookup("  los gatos ").unwrap();
        assert_eq!(city.name, "Los Gatos");
        assert!((city.latitude - 37.2358).abs() < 1e-9);
        assert_eq!(city.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup("Atlantis").is_none());
    }

    #[test]
    fn test_table_coordinates_in_range() {
        for (name, lat, lon, ..) in CITIES {
            assert!((-90.0..=90.0).contains(lat), "{name}");
            assert!((-180.0..=180.0).contains(lon), "{name}");
        }
    }
}
