use geo::{Euclidean, InterpolatePoint, Point};
use tracing::trace;

use super::NumberingScheme;
use crate::model::HouseNumber;

/// A known house number next to the requested one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub number: i64,
    pub location: Point<f64>,
}

/// Outcome of resolving a requested house number against a street's known numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HouseNumberMatch {
    /// The number exists on the street.
    Exact { number: i64, location: Point<f64> },
    /// The number is missing but lies next to known numbers. `interpolated` is only
    /// set when both neighbours exist and interpolation was allowed.
    Approximate {
        lower: Option<Neighbour>,
        upper: Option<Neighbour>,
        interpolated: Option<Point<f64>>,
    },
    Absent,
}

impl HouseNumberMatch {
    /// The coordinate to report for the requested number, if any.
    #[must_use]
    pub fn location(&self) -> Option<Point<f64>> {
        match self {
            Self::Exact { location, .. } => Some(*location),
            Self::Approximate { interpolated, .. } => *interpolated,
            Self::Absent => None,
        }
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }
}

/// Resolve `target` against `candidates`.
///
/// Numbers are normalized with the scheme of `country_code`; candidates without a
/// usable number are ignored. The first exact match in input order wins. Otherwise the
/// nearest lower and upper numbers are collected and, when both exist and
/// `allow_interpolation` is set, a point is placed on the straight line between them in
/// proportion to the numeric distance.
#[must_use]
pub fn interpolate(
    target: &str,
    candidates: &[HouseNumber],
    country_code: Option<&str>,
    allow_interpolation: bool,
) -> HouseNumberMatch {
    let scheme = NumberingScheme::for_country(country_code);
    let Some(target) = scheme.normalize(target) else {
        return HouseNumberMatch::Absent;
    };

    let mut lower: Option<Neighbour> = None;
    let mut upper: Option<Neighbour> = None;

    for candidate in candidates {
        let Some(number) = scheme.normalize(&candidate.number) else {
            continue;
        };
        let neighbour = Neighbour {
            number,
            location: candidate.location(),
        };
        if number == target {
            return HouseNumberMatch::Exact {
                number,
                location: neighbour.location,
            };
        }
        if number < target {
            if lower.is_none_or(|current| number > current.number) {
                lower = Some(neighbour);
            }
        } else if upper.is_none_or(|current| number < current.number) {
            upper = Some(neighbour);
        }
    }

    match (lower, upper) {
        (None, None) => HouseNumberMatch::Absent,
        (Some(low), Some(high)) if allow_interpolation => {
            match point_between(target, low, high) {
                Some(point) => HouseNumberMatch::Approximate {
                    lower,
                    upper,
                    interpolated: Some(point),
                },
                None => {
                    trace!(house_number = target, "Interpolated point fell outside the segment");
                    HouseNumberMatch::Absent
                }
            }
        }
        _ => HouseNumberMatch::Approximate {
            lower,
            upper,
            interpolated: None,
        },
    }
}

fn point_between(target: i64, lower: Neighbour, upper: Neighbour) -> Option<Point<f64>> {
    let ratio = (target - lower.number) as f64 / (upper.number - lower.number) as f64;
    let point = Euclidean.point_at_ratio_between(lower.location, upper.location, ratio);

    let (start, end) = (lower.location, upper.location);
    let within = |value: f64, a: f64, b: f64| value >= a.min(b) && value <= a.max(b);
    let plausible = point.x().is_finite()
        && point.y().is_finite()
        && within(point.x(), start.x(), end.x())
        && within(point.y(), start.y(), end.y());

    plausible.then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(entries: &[(&str, f64, f64)]) -> Vec<HouseNumber> {
        entries
            .iter()
            .map(|(number, lat, lng)| HouseNumber::new(*number, *lat, *lng))
            .collect()
    }

    fn strictly_between(value: f64, a: f64, b: f64) -> bool {
        value > a.min(b) && value < a.max(b)
    }

    #[test]
    fn test_single_equal_candidate_is_exact_with_its_location() {
        let candidates = numbers(&[("7", 51.5, -0.12)]);
        for allow in [true, false] {
            let result = interpolate("7", &candidates, None, allow);
            assert_eq!(
                result,
                HouseNumberMatch::Exact {
                    number: 7,
                    location: Point::new(-0.12, 51.5),
                }
            );
        }
    }

    #[test]
    fn test_first_exact_match_wins() {
        let candidates = numbers(&[("3", 1.0, 1.0), ("5a", 2.0, 2.0), ("5", 3.0, 3.0)]);
        let result = interpolate("5", &candidates, None, true);
        assert_eq!(result.location(), Some(Point::new(2.0, 2.0)));
        assert!(result.is_exact());
    }

    #[test]
    fn test_interpolates_strictly_between_neighbours() {
        let candidates = numbers(&[("10", 40.0, -90.0), ("20", 40.01, -90.02)]);
        let HouseNumberMatch::Approximate {
            lower,
            upper,
            interpolated,
        } = interpolate("15", &candidates, None, true)
        else {
            panic!("expected an approximate match");
        };
        assert_eq!(lower.map(|n| n.number), Some(10));
        assert_eq!(upper.map(|n| n.number), Some(20));

        let point = interpolated.expect("both neighbours present");
        assert!(strictly_between(point.y(), 40.0, 40.01));
        assert!(strictly_between(point.x(), -90.0, -90.02));
        assert!((point.y() - 40.005).abs() < 1e-9);
    }

    #[test]
    fn test_disallowed_interpolation_keeps_neighbours_only() {
        let candidates = numbers(&[("10", 40.0, -90.0), ("20", 40.01, -90.02)]);
        let result = interpolate("15", &candidates, None, false);
        match result {
            HouseNumberMatch::Approximate {
                lower,
                upper,
                interpolated,
            } => {
                assert_eq!(lower.map(|n| n.number), Some(10));
                assert_eq!(upper.map(|n| n.number), Some(20));
                assert!(interpolated.is_none());
            }
            other => panic!("expected approximate, got {other:?}"),
        }
        assert_eq!(result.location(), None);
    }

    #[test]
    fn test_nearest_neighbours_are_chosen() {
        let candidates = numbers(&[
            ("2", 0.0, 0.0),
            ("30", 3.0, 3.0),
            ("8", 1.0, 1.0),
            ("12", 2.0, 2.0),
            ("40", 4.0, 4.0),
        ]);
        let HouseNumberMatch::Approximate { lower, upper, .. } =
            interpolate("10", &candidates, None, false)
        else {
            panic!("expected an approximate match");
        };
        assert_eq!(lower.map(|n| n.number), Some(8));
        assert_eq!(upper.map(|n| n.number), Some(12));
    }

    #[test]
    fn test_one_sided_neighbour_has_no_location() {
        let candidates = numbers(&[("2", 0.0, 0.0), ("4", 1.0, 1.0)]);
        let result = interpolate("9", &candidates, None, true);
        assert_eq!(
            result,
            HouseNumberMatch::Approximate {
                lower: Some(Neighbour {
                    number: 4,
                    location: Point::new(1.0, 1.0)
                }),
                upper: None,
                interpolated: None,
            }
        );
    }

    #[test]
    fn test_absent_without_neighbours_or_target() {
        assert_eq!(interpolate("5", &[], None, true), HouseNumberMatch::Absent);

        let candidates = numbers(&[("bis", 0.0, 0.0)]);
        assert_eq!(interpolate("5", &candidates, None, true), HouseNumberMatch::Absent);

        let candidates = numbers(&[("5", 0.0, 0.0)]);
        assert_eq!(interpolate("ter", &candidates, None, true), HouseNumberMatch::Absent);
    }

    #[test]
    fn test_non_finite_geometry_is_absent() {
        let candidates = numbers(&[("10", f64::NAN, 0.0), ("20", 1.0, 1.0)]);
        assert_eq!(interpolate("15", &candidates, None, true), HouseNumberMatch::Absent);
    }

    #[test]
    fn test_country_scheme_applies_to_target_and_candidates() {
        let candidates = numbers(&[("1200/3", 48.1, 17.1), ("1201/5", 48.2, 17.2)]);
        let result = interpolate("999/5", &candidates, Some("SK"), true);
        assert_eq!(result.location(), Some(Point::new(17.2, 48.2)));

        let result = interpolate("999/5", &candidates, Some("DE"), true);
        assert_eq!(
            result,
            HouseNumberMatch::Approximate {
                lower: None,
                upper: Some(Neighbour {
                    number: 1200,
                    location: Point::new(17.1, 48.1)
                }),
                interpolated: None,
            }
        );
    }
}
