use crate::domain::model::RoutePoint;
use crate::domain::services::geo::degree_distance;

/// Reorders points with the nearest-neighbor heuristic, starting at `points[0]`.
///
/// Distances are planar on degrees; ties go to the earliest remaining point.
/// The output is always a permutation of the input. O(n²).
pub fn optimize(points: &[RoutePoint]) -> Vec<RoutePoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut remaining = points.to_vec();
    let mut optimized = Vec::with_capacity(points.len());

    let mut current = remaining.remove(0);
    optimized.push(current);

    while !remaining.is_empty() {
        let index = nearest_index(current, &remaining);
        current = remaining.remove(index);
        optimized.push(current);
    }

    optimized
}

fn nearest_index(from: RoutePoint, candidates: &[RoutePoint]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;

    for (index, candidate) in candidates.iter().enumerate() {
        let distance = degree_distance(from, *candidate);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }

    best
}

/// Sum of consecutive planar distances, in degrees.
pub fn path_length(points: &[RoutePoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| degree_distance(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> RoutePoint {
        RoutePoint::new(lat, lon)
    }

    /// Deterministic pseudo-random point lists.
    fn sample_lists() -> Vec<Vec<RoutePoint>> {
        let mut state: u64 = 0x5eed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 10_000) as f64 / 100.0
        };

        (0..40)
            .map(|n| (0..(n % 12)).map(|_| p(next(), next())).collect())
            .collect()
    }

    fn sorted(points: &[RoutePoint]) -> Vec<(f64, f64)> {
        let mut pairs: Vec<(f64, f64)> = points.iter().map(|pt| (pt.lat, pt.lon)).collect();
        pairs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        pairs
    }

    #[test]
    fn test_short_lists_are_unchanged() {
        assert!(optimize(&[]).is_empty());
        assert_eq!(optimize(&[p(1.0, 1.0)]), vec![p(1.0, 1.0)]);
        let two = vec![p(5.0, 5.0), p(0.0, 0.0)];
        assert_eq!(optimize(&two), two);
    }

    #[test]
    fn test_nearest_first_from_start() {
        let result = optimize(&[p(0.0, 0.0), p(0.0, 3.0), p(0.0, 1.0)]);
        assert_eq!(result, vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 3.0)]);
    }

    #[test]
    fn test_tie_goes_to_first_remaining() {
        let result = optimize(&[p(0.0, 0.0), p(0.0, -1.0), p(0.0, 1.0), p(1.0, 0.0)]);
        assert_eq!(result[1], p(0.0, -1.0));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let input = vec![p(0.0, 0.0), p(2.0, 2.0), p(2.0, 2.0), p(1.0, 1.0)];
        let result = optimize(&input);
        assert_eq!(result.len(), 4);
        assert_eq!(sorted(&result), sorted(&input));
    }

    #[test]
    fn test_result_is_permutation() {
        for list in sample_lists() {
            let result = optimize(&list);
            assert_eq!(sorted(&result), sorted(&list));
            if let Some(first) = list.first() {
                assert_eq!(result[0], *first);
            }
        }
    }

    #[test]
    fn test_each_step_picks_nearest_unvisited() {
        for list in sample_lists().into_iter().filter(|l| l.len() >= 3) {
            let result = optimize(&list);
            let mut unvisited: Vec<RoutePoint> = list[1..].to_vec();

            for window in result.windows(2) {
                let (from, chosen) = (window[0], window[1]);
                let chosen_distance = degree_distance(from, chosen);
                for candidate in &unvisited {
                    assert!(
                        chosen_distance <= degree_distance(from, *candidate),
                        "picked {:?} from {:?} but {:?} is closer",
                        chosen,
                        from,
                        candidate
                    );
                }
                let pos = unvisited.iter().position(|c| *c == chosen).unwrap();
                unvisited.remove(pos);
            }
            assert!(unvisited.is_empty());
        }
    }

    #[test]
    fn test_path_length() {
        let path = vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 3.0)];
        assert_eq!(path_length(&path), 3.0);
        assert!(path_length(&optimize(&[p(0.0, 0.0), p(0.0, 3.0), p(0.0, 1.0)])) <= 4.0);
    }
}
