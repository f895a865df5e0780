//! Base-32 geohash encoding and prefix range bounds.
//!
//! A geohash recursively bisects the longitude and latitude ranges,
//! interleaving one bit per step starting with longitude, and packs five
//! bits per output character. Shared prefixes denote spatial proximity,
//! which makes the encoded strings usable as sorted index keys: a radius
//! search becomes a lexicographic range scan over `[lower, upper]`,
//! post-filtered by exact distance.

use crate::{GeoError, GeoPoint};

/// The base-32 geohash alphabet (digits and lowercase letters, excluding
/// `a`, `i`, `l`, `o`).
pub const GEOHASH_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision at which report geohashes are stored. Write paths must derive
/// the stored `geohash` field with `encode(location, STORAGE_PRECISION)`.
pub const STORAGE_PRECISION: usize = 7;

/// Encodes a point as a geohash of exactly `precision` characters.
///
/// Each bisection step keeps the upper half of the current range only when
/// the coordinate strictly exceeds the midpoint, so points lying exactly on
/// a cell boundary encode into the lower cell.
#[must_use]
pub fn encode(point: GeoPoint, precision: usize) -> String {
    let (mut lat_min, mut lat_max) = (-90.0_f64, 90.0_f64);
    let (mut lon_min, mut lon_max) = (-180.0_f64, 180.0_f64);

    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bit = 0_u32;
    let mut ch = 0_usize;

    while hash.len() < precision {
        if even_bit {
            let mid = (lon_min + lon_max) / 2.0;
            if point.longitude() > mid {
                ch |= 1 << (4 - bit);
                lon_min = mid;
            } else {
                lon_max = mid;
            }
        } else {
            let mid = (lat_min + lat_max) / 2.0;
            if point.latitude() > mid {
                ch |= 1 << (4 - bit);
                lat_min = mid;
            } else {
                lat_max = mid;
            }
        }

        even_bit = !even_bit;

        if bit < 4 {
            bit += 1;
        } else {
            hash.push(GEOHASH_ALPHABET[ch] as char);
            bit = 0;
            ch = 0;
        }
    }

    hash
}

/// The latitude/longitude cell a geohash denotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeohashCell {
    /// Southern cell edge in degrees.
    pub lat_min: f64,
    /// Northern cell edge in degrees.
    pub lat_max: f64,
    /// Western cell edge in degrees.
    pub lon_min: f64,
    /// Eastern cell edge in degrees.
    pub lon_max: f64,
}

impl GeohashCell {
    /// The cell's center point.
    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        GeoPoint::new_unchecked(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Whether a point lies within the cell (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.latitude())
            && (self.lon_min..=self.lon_max).contains(&point.longitude())
    }
}

/// Decodes a geohash back into its bounding cell.
///
/// # Errors
///
/// Returns [`GeoError::InvalidGeohash`] if the string contains a character
/// outside the base-32 alphabet.
pub fn decode(geohash: &str) -> Result<GeohashCell, GeoError> {
    let (mut lat_min, mut lat_max) = (-90.0_f64, 90.0_f64);
    let (mut lon_min, mut lon_max) = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for character in geohash.chars() {
        let index = GEOHASH_ALPHABET
            .iter()
            .position(|&b| char::from(b) == character)
            .ok_or(GeoError::InvalidGeohash { character })?;

        for bit in (0..5).rev() {
            let set = (index >> bit) & 1 == 1;
            if even_bit {
                let mid = (lon_min + lon_max) / 2.0;
                if set {
                    lon_min = mid;
                } else {
                    lon_max = mid;
                }
            } else {
                let mid = (lat_min + lat_max) / 2.0;
                if set {
                    lat_min = mid;
                } else {
                    lat_max = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    Ok(GeohashCell {
        lat_min,
        lat_max,
        lon_min,
        lon_max,
    })
}

/// A lexicographic geohash range approximating a radius search window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeohashRange {
    /// Inclusive lower bound of the scan.
    pub lower: String,
    /// Inclusive upper bound of the scan.
    pub upper: String,
    /// Precision tier the bounds were computed at.
    pub precision: usize,
}

/// Precision tier for a search radius. Coarser prefixes cast a wider net
/// for larger radii, at the cost of more false positives for the exact
/// distance filter to remove.
fn precision_for_radius(radius_km: f64) -> usize {
    if radius_km > 100.0 {
        4
    } else if radius_km > 20.0 {
        5
    } else if radius_km > 5.0 {
        6
    } else {
        7
    }
}

/// Computes the prefix scan window for a radius search around `point`.
///
/// `lower` is the center's geohash at the selected precision; `upper`
/// substitutes the final character with its alphabet successor (`'z'` when
/// already last). This is an approximation of "next prefix", not a
/// geometrically exact boundary: the window over-includes, and a report can
/// also lie inside the radius but outside the window near cell edges. True
/// containment is guaranteed only by the exact distance filter applied to
/// the scan results, never by the window alone.
#[must_use]
pub fn bounds_for_radius(point: GeoPoint, radius_km: f64) -> GeohashRange {
    let precision = precision_for_radius(radius_km);
    let lower = encode(point, precision);

    let last = *lower.as_bytes().last().unwrap_or(&b'0');
    let index = GEOHASH_ALPHABET
        .iter()
        .position(|&b| b == last)
        .unwrap_or(GEOHASH_ALPHABET.len() - 1);
    let successor = if index < GEOHASH_ALPHABET.len() - 1 {
        GEOHASH_ALPHABET[index + 1]
    } else {
        b'z'
    };

    let mut upper = lower.clone();
    upper.pop();
    upper.push(char::from(successor));

    GeohashRange {
        lower,
        upper,
        precision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn encodes_known_vectors() {
        assert_eq!(encode(point(40.0, -74.0), 7), "dr57s1f");
        assert_eq!(encode(point(40.0, -74.0), 4), "dr57");
        assert_eq!(encode(point(51.4779, 0.0), 7), "gcpuzgr");
        assert_eq!(encode(point(57.649_11, 10.407_44), 11), "u4pruydqqvj");
    }

    #[test]
    fn encode_is_deterministic_and_exact_length() {
        let p = point(37.7749, -122.4194);
        for precision in 1..=12 {
            let a = encode(p, precision);
            let b = encode(p, precision);
            assert_eq!(a, b);
            assert_eq!(a.len(), precision);
        }
    }

    #[test]
    fn midpoints_fall_into_the_lower_cell() {
        // 0,0 sits exactly on every bisection midpoint; the strict `>`
        // comparison keeps it in the lower half at each step.
        assert_eq!(encode(point(0.0, 0.0), 5), "7zzzz");
    }

    #[test]
    fn decode_cell_contains_original_point() {
        let samples = [
            point(40.0, -74.0),
            point(-33.8688, 151.2093),
            point(64.1466, -21.9426),
            point(0.0001, 0.0001),
            point(-89.9, 179.9),
        ];
        for p in samples {
            for precision in 1..=9 {
                let cell = decode(&encode(p, precision)).unwrap();
                assert!(cell.contains(p), "{p:?} not in cell at precision {precision}");
            }
        }
    }

    #[test]
    fn decode_center_reencodes_to_same_hash() {
        let hash = encode(point(48.8566, 2.3522), 8);
        let cell = decode(&hash).unwrap();
        assert_eq!(encode(cell.center(), 8), hash);
    }

    #[test]
    fn decode_rejects_invalid_characters() {
        assert!(matches!(
            decode("dr5a"),
            Err(GeoError::InvalidGeohash { character: 'a' })
        ));
        assert!(decode("DR57").is_err());
    }

    #[test]
    fn precision_tiers_by_radius() {
        let p = point(40.0, -74.0);
        assert_eq!(bounds_for_radius(p, 150.0).precision, 4);
        assert_eq!(bounds_for_radius(p, 50.0).precision, 5);
        assert_eq!(bounds_for_radius(p, 10.0).precision, 6);
        assert_eq!(bounds_for_radius(p, 2.0).precision, 7);
    }

    #[test]
    fn threshold_radii_use_the_finer_tier() {
        // Comparisons are strict, so a radius exactly at a threshold falls
        // through to the next tier down.
        let p = point(40.0, -74.0);
        assert_eq!(bounds_for_radius(p, 100.0).precision, 5);
        assert_eq!(bounds_for_radius(p, 20.0).precision, 6);
        assert_eq!(bounds_for_radius(p, 5.0).precision, 7);
    }

    #[test]
    fn precision_is_monotonically_non_increasing_in_radius() {
        let p = point(40.0, -74.0);
        let radii = [0.5, 3.0, 5.0, 8.0, 20.0, 40.0, 100.0, 250.0];
        let mut previous = usize::MAX;
        for radius in radii {
            let precision = bounds_for_radius(p, radius).precision;
            assert!(precision <= previous, "precision grew at radius {radius}");
            previous = precision;
        }
    }

    #[test]
    fn upper_bound_substitutes_alphabet_successor() {
        let range = bounds_for_radius(point(40.0, -74.0), 10.0);
        assert_eq!(range.lower, "dr57s1");
        assert_eq!(range.upper, "dr57s2");
        assert!(range.lower < range.upper);
    }

    #[test]
    fn upper_bound_saturates_at_z() {
        // (0,0) encodes to all-z tail at precision 5, so the substituted
        // final character stays 'z' and the window degenerates to one key.
        let range = bounds_for_radius(point(0.0, 0.0), 50.0);
        assert_eq!(range.lower, "7zzzz");
        assert_eq!(range.upper, "7zzzz");
    }

    #[test]
    fn stored_geohashes_sort_within_the_window() {
        // A report inside the center cell keys into the scan window; one in
        // a neighboring cell two kilometers away does not. The window is a
        // prefix approximation, and the exact distance filter is what makes
        // the search correct.
        let center = point(40.0, -74.0);
        let range = bounds_for_radius(center, 10.0);

        let in_cell = encode(point(40.0002, -74.0002), STORAGE_PRECISION);
        assert!(range.lower <= in_cell && in_cell <= range.upper);

        let neighbor = encode(point(40.018, -74.0), STORAGE_PRECISION);
        assert!(neighbor < range.lower || neighbor > range.upper);
    }
}
