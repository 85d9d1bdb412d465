use rand::Rng;
use rand_distr::{Distribution, Normal};

use mogu_shared::{AppError, AppResult, ErrorCode, User};

use super::Coordinate;

/// Reference coordinates for the Seoul districts users live in.
pub const NEIGHBORHOODS: [(&str, Coordinate); 25] = [
    ("종로구 (광화문)", Coordinate::new(37.575, 126.977)),
    ("중구 (명동)", Coordinate::new(37.563, 126.983)),
    ("용산구 (이태원)", Coordinate::new(37.534, 126.994)),
    ("성동구 (성수동)", Coordinate::new(37.544, 127.056)),
    ("광진구 (건대입구)", Coordinate::new(37.540, 127.069)),
    ("동대문구 (청량리)", Coordinate::new(37.580, 127.047)),
    ("중랑구 (상봉동)", Coordinate::new(37.596, 127.093)),
    ("성북구 (성신여대입구)", Coordinate::new(37.591, 127.016)),
    ("강북구 (수유동)", Coordinate::new(37.638, 127.026)),
    ("도봉구 (창동)", Coordinate::new(37.653, 127.047)),
    ("노원구 (중계동 은행사거리)", Coordinate::new(37.649, 127.072)),
    ("은평구 (연신내)", Coordinate::new(37.619, 126.921)),
    ("서대문구 (신촌)", Coordinate::new(37.559, 126.942)),
    ("마포구 (홍대입구)", Coordinate::new(37.556, 126.923)),
    ("양천구 (목동)", Coordinate::new(37.527, 126.866)),
    ("강서구 (마곡)", Coordinate::new(37.560, 126.826)),
    ("구로구 (신도림)", Coordinate::new(37.509, 126.891)),
    ("금천구 (가산디지털단지)", Coordinate::new(37.481, 126.895)),
    ("영등포구 (여의도)", Coordinate::new(37.525, 126.925)),
    ("동작구 (노량진)", Coordinate::new(37.513, 126.942)),
    ("관악구 (서울대입구)", Coordinate::new(37.478, 126.951)),
    ("서초구 (강남역)", Coordinate::new(37.498, 127.028)),
    ("강남구 (삼성역)", Coordinate::new(37.509, 127.063)),
    ("송파구 (잠실)", Coordinate::new(37.514, 127.104)),
    ("강동구 (천호동)", Coordinate::new(37.538, 127.124)),
];

pub fn neighborhood_names() -> impl Iterator<Item = &'static str> {
    NEIGHBORHOODS.iter().map(|(name, _)| *name)
}

pub fn reference_point(neighborhood: &str) -> AppResult<Coordinate> {
    NEIGHBORHOODS
        .iter()
        .find(|(name, _)| *name == neighborhood)
        .map(|(_, coord)| *coord)
        .ok_or_else(|| {
            AppError::with_details(
                ErrorCode::UnknownNeighborhood,
                format!("unknown neighborhood '{neighborhood}'"),
                serde_json::json!({ "neighborhood": neighborhood }),
            )
        })
}

/// Places users near their neighborhood's reference point with independent
/// Gaussian jitter per axis, so users sharing a neighborhood still get
/// distinct coordinates.
#[derive(Debug, Clone)]
pub struct Geocoder {
    jitter: Normal<f64>,
}

impl Geocoder {
    pub fn new(sigma_deg: f64) -> AppResult<Self> {
        let invalid = |reason: String| {
            AppError::with_details(
                ErrorCode::InvalidJitter,
                format!("invalid jitter sigma {sigma_deg}: {reason}"),
                serde_json::json!({ "sigma_deg": sigma_deg.to_string() }),
            )
        };
        // Normal::new accepts a negative std_dev and mirrors the draws.
        if !(sigma_deg >= 0.0 && sigma_deg.is_finite()) {
            return Err(invalid("must be finite and non-negative".into()));
        }
        let jitter = Normal::new(0.0, sigma_deg).map_err(|e| invalid(e.to_string()))?;
        Ok(Self { jitter })
    }

    pub fn locate<R: Rng + ?Sized>(&self, neighborhood: &str, rng: &mut R) -> AppResult<Coordinate> {
        let base = reference_point(neighborhood)?;
        let d_lat = self.jitter.sample(rng);
        let d_lon = self.jitter.sample(rng);
        Ok(Coordinate::new(base.latitude + d_lat, base.longitude + d_lon))
    }

    /// One draw per user, in slice order.
    pub fn locate_users<R: Rng + ?Sized>(&self, users: &[User], rng: &mut R) -> AppResult<Vec<Coordinate>> {
        users
            .iter()
            .map(|user| self.locate(&user.neighborhood, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reference_lookup() {
        let c = reference_point("송파구 (잠실)").unwrap();
        assert_eq!(c, Coordinate::new(37.514, 127.104));
        assert_eq!(neighborhood_names().count(), 25);
    }

    #[test]
    fn unknown_neighborhood_is_an_error() {
        let err = reference_point("부산 해운대").unwrap_err();
        assert_eq!(err.code(), "E2002");
    }

    #[test]
    fn jitter_stays_near_reference() {
        let geocoder = Geocoder::new(0.005).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let base = reference_point("중구 (명동)").unwrap();
        for _ in 0..200 {
            let c = geocoder.locate("중구 (명동)", &mut rng).unwrap();
            // 6 sigma
            assert!((c.latitude - base.latitude).abs() < 0.03);
            assert!((c.longitude - base.longitude).abs() < 0.03);
        }
    }

    #[test]
    fn same_neighborhood_gets_distinct_points() {
        let geocoder = Geocoder::new(0.005).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = geocoder.locate("마포구 (홍대입구)", &mut rng).unwrap();
        let b = geocoder.locate("마포구 (홍대입구)", &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn zero_sigma_returns_reference() {
        let geocoder = Geocoder::new(0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let c = geocoder.locate("강서구 (마곡)", &mut rng).unwrap();
        assert_eq!(c, reference_point("강서구 (마곡)").unwrap());
    }

    #[test]
    fn negative_sigma_is_rejected() {
        assert_eq!(Geocoder::new(-1.0).unwrap_err().code(), "E2003");

        let err = Geocoder::new(-0.005).unwrap_err();
        assert_eq!(err.code(), "E2003");
        assert_eq!(err.details().unwrap()["sigma_deg"], "-0.005");
    }

    #[test]
    fn non_finite_sigma_is_rejected() {
        for sigma in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(Geocoder::new(sigma).unwrap_err().code(), "E2003");
        }
    }
}
