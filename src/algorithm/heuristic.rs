//! Admissible A* heuristic: an underestimate of the remaining cost to a
//! fixed destination, in the units of whichever dominance variable is
//! active. see the specification's section 4.4; the planar (rather than
//! great-circle) approximation is deliberate -- it is cheaper to compute
//! per-state and an overestimate in only the direction that matters (flat
//! projection always underestimates true spherical distance).

use crate::model::dominance::DominanceVariable;
use crate::model::edge::DEFAULT_CAR_SPEED_MPS;
use crate::model::mode::StreetMode;
use crate::model::units::mm_per_fixed_deg_lat;
use crate::model::vertex::Vertex;
use crate::request::ProfileRequest;

fn max_mode_speed_mps(mode: StreetMode, request: &ProfileRequest) -> f32 {
    match mode {
        StreetMode::Walk => request.walk_speed_mps,
        StreetMode::Bicycle => request.bicycle_speed_mps,
        StreetMode::Car => request.car_speed_mps.unwrap_or(DEFAULT_CAR_SPEED_MPS),
    }
}

/// admissible estimate of the remaining cost from `from` to `to`, in the
/// units of `variable`. scales longitude by `cos(max_lat)` using whichever of
/// the two endpoints has the higher latitude, which shrinks the x-axis scale
/// and so never overestimates -- the heuristic is safe even when the search
/// is far from the destination's latitude.
pub fn estimate(
    from: &Vertex,
    to: &Vertex,
    mode: StreetMode,
    variable: DominanceVariable,
    request: &ProfileRequest,
) -> i64 {
    let max_lat_rad = from.lat().max(to.lat()).to_radians();
    let mm_per_lat = mm_per_fixed_deg_lat();

    let dx_fixed_deg = (to.lon_fixed - from.lon_fixed) as f64;
    let dy_fixed_deg = (to.lat_fixed - from.lat_fixed) as f64;

    let dx_mm = dx_fixed_deg * mm_per_lat * max_lat_rad.cos();
    let dy_mm = dy_fixed_deg * mm_per_lat;
    let distance_mm = (dx_mm * dx_mm + dy_mm * dy_mm).sqrt();

    match variable {
        DominanceVariable::DistanceMillimeters => distance_mm.round() as i64,
        DominanceVariable::DurationSeconds => {
            let speed_mm_per_s = max_mode_speed_mps(mode, request) as f64 * 1000.0;
            (distance_mm / speed_mm_per_s).round() as i64
        }
        DominanceVariable::Weight => {
            let speed_mm_per_s = max_mode_speed_mps(mode, request) as f64 * 1000.0;
            let seconds = distance_mm / speed_mm_per_s;
            let reluctance = if mode == StreetMode::Walk { request.walk_reluctance } else { 1.0 };
            (seconds * reluctance).round() as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flags::VertexFlags;

    #[test]
    fn zero_distance_is_zero_heuristic() {
        let v = Vertex::new(39.0, -104.0, VertexFlags::EMPTY);
        let request = ProfileRequest::default();
        let h = estimate(&v, &v, StreetMode::Walk, DominanceVariable::DurationSeconds, &request);
        assert_eq!(h, 0);
    }

    #[test]
    fn duration_heuristic_matches_distance_over_speed() {
        let origin = Vertex::new(0.0, 0.0, VertexFlags::EMPTY);
        let destination = Vertex::new(0.0, 0.01, VertexFlags::EMPTY);
        let request = ProfileRequest::default();
        let distance_mm =
            estimate(&origin, &destination, StreetMode::Walk, DominanceVariable::DistanceMillimeters, &request);
        let duration_s =
            estimate(&origin, &destination, StreetMode::Walk, DominanceVariable::DurationSeconds, &request);
        let expected_s = (distance_mm as f64 / (request.walk_speed_mps as f64 * 1000.0)).round() as i64;
        assert_eq!(duration_s, expected_s);
    }

    #[test]
    fn weight_heuristic_applies_walk_reluctance() {
        let origin = Vertex::new(0.0, 0.0, VertexFlags::EMPTY);
        let destination = Vertex::new(0.0, 0.01, VertexFlags::EMPTY);
        let request = ProfileRequest::default();
        let duration_s =
            estimate(&origin, &destination, StreetMode::Walk, DominanceVariable::DurationSeconds, &request);
        let weight =
            estimate(&origin, &destination, StreetMode::Walk, DominanceVariable::Weight, &request);
        // both are independently rounded from the same raw distance, so they
        // may differ from `duration_s * reluctance` by up to one unit of
        // rounding error; what matters is that reluctance is actually applied.
        assert!((weight as f64 - duration_s as f64 * request.walk_reluctance).abs() <= 1.0);
    }

    #[test]
    fn higher_latitude_endpoint_shrinks_longitude_scale() {
        // an underestimate must never exceed the true planar distance computed
        // locally at either endpoint's own latitude; using max(lat) guarantees this.
        let low_lat = Vertex::new(10.0, 0.0, VertexFlags::EMPTY);
        let high_lat = Vertex::new(60.0, 1.0, VertexFlags::EMPTY);
        let request = ProfileRequest::default();
        let h = estimate(&low_lat, &high_lat, StreetMode::Car, DominanceVariable::DistanceMillimeters, &request);
        // local-at-low-lat longitude scale would be larger (cos 10 > cos 60),
        // so using the higher latitude must not exceed that naive estimate.
        let mm_per_lat = mm_per_fixed_deg_lat();
        let naive_dx = 1.0e7 * mm_per_lat * 10f64.to_radians().cos();
        let naive_dy = 50.0e7 * mm_per_lat;
        let naive = (naive_dx * naive_dx + naive_dy * naive_dy).sqrt();
        assert!((h as f64) <= naive + 1.0);
    }
}
