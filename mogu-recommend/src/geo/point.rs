use once_cell::sync::Lazy;
use regex::Regex;

use mogu_shared::{AppError, AppResult, ErrorCode};

use super::Coordinate;

static POINT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^POINT\(([\d.-]+) ([\d.-]+)\)$").expect("point pattern compiles"));

/// Parse a WKT `POINT(<lon> <lat>)` string. Longitude comes first.
pub fn parse_point(spot: &str) -> AppResult<Coordinate> {
    let malformed = || {
        AppError::with_details(
            ErrorCode::MalformedSpot,
            format!("malformed spot '{spot}', expected POINT(<lon> <lat>)"),
            serde_json::json!({ "spot": spot }),
        )
    };

    let caps = POINT_PATTERN.captures(spot).ok_or_else(malformed)?;
    let longitude: f64 = caps[1].parse().map_err(|_| malformed())?;
    let latitude: f64 = caps[2].parse().map_err(|_| malformed())?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(malformed());
    }

    Ok(Coordinate::new(latitude, longitude))
}

pub fn format_point(coord: Coordinate) -> String {
    format!("POINT({:.6} {:.6})", coord.longitude, coord.latitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lon_first() {
        let c = parse_point("POINT(126.977000 37.575000)").unwrap();
        assert_eq!(c.longitude, 126.977);
        assert_eq!(c.latitude, 37.575);
    }

    #[test]
    fn accepts_negative_coordinates() {
        let c = parse_point("POINT(-0.1276 51.5072)").unwrap();
        assert_eq!(c.longitude, -0.1276);
    }

    #[test]
    fn format_writes_six_decimals() {
        let spot = format_point(Coordinate::new(37.5, 127.0));
        assert_eq!(spot, "POINT(127.000000 37.500000)");
        assert_eq!(parse_point(&spot).unwrap(), Coordinate::new(37.5, 127.0));
    }

    #[test]
    fn malformed_strings_are_fatal() {
        for bad in [
            "",
            "POINT(126.9)",
            "POINT(126.9,37.5)",
            "point(126.9 37.5)",
            "POINT(1.2.3 37.5)",
            "POINT(126.9 37.5) trailing",
            "POINT(37.5 126.9)",
        ] {
            let err = parse_point(bad).unwrap_err();
            assert_eq!(err.code(), "E2001", "input {bad:?}");
        }
    }
}
