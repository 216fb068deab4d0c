use crate::{
    datatypes::{Circle, Point},
    vector::V,
};

/// Points covering less of the circle than this (in degrees) trigger a warning.
const NARROW_ARC_DEGREES: f64 = 90.0;

/// Something about a fit that isn't an error, but is probably worth knowing.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Warning {
    /// Which input point this is about, if any.
    pub about_point: Option<usize>,
    /// What the problem is.
    pub content: WarningContent,
}

/// The kinds of [`Warning`].
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub enum WarningContent {
    /// This point has exactly the same coordinates as an earlier one.
    DuplicatePoint {
        /// Index of the first point at these coordinates.
        duplicate_of: usize,
    },
    /// The points only cover this many degrees of the fitted circle.
    NarrowArc(f64),
    /// The Jacobian at the solution has this condition number.
    IllConditioned(f64),
}

pub(crate) fn lint(points: &[Point], circle: Circle) -> Vec<Warning> {
    let mut warnings = duplicates(points);
    let coverage = arc_coverage_degrees(points, circle);
    if coverage < NARROW_ARC_DEGREES {
        warnings.push(Warning {
            about_point: None,
            content: WarningContent::NarrowArc(coverage),
        });
    }
    warnings
}

/// Find points with identical coordinates, sorting instead of comparing every pair.
fn duplicates(points: &[Point]) -> Vec<Warning> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .total_cmp(&points[j].x)
            .then(points[i].y.total_cmp(&points[j].y))
            .then(i.cmp(&j))
    });

    let mut warnings = Vec::new();
    let mut run_start = 0;
    for k in 1..order.len() {
        let (first, this) = (points[order[run_start]], points[order[k]]);
        if first.x.total_cmp(&this.x).is_eq() && first.y.total_cmp(&this.y).is_eq() {
            warnings.push(Warning {
                about_point: Some(order[k]),
                content: WarningContent::DuplicatePoint {
                    duplicate_of: order[run_start],
                },
            });
        } else {
            run_start = k;
        }
    }
    warnings.sort_by_key(|w| w.about_point);
    warnings
}

/// How much of the circle's perimeter the points span, in degrees.
/// That's 360 minus the biggest angular gap between neighbouring points.
fn arc_coverage_degrees(points: &[Point], circle: Circle) -> f64 {
    let center = V::from(circle.center);
    let mut angles: Vec<f64> = points
        .iter()
        .map(|p| (V::from(*p) - center).angle())
        .collect();
    angles.sort_by(f64::total_cmp);
    let (Some(first), Some(last)) = (angles.first().copied(), angles.last().copied()) else {
        return 0.0;
    };
    let wrap_gap = std::f64::consts::TAU - (last - first);
    let largest_gap = angles
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(wrap_gap, libm::fmax);
    (std::f64::consts::TAU - largest_gap).to_degrees()
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.about_point {
            Some(i) => write!(f, "Point {i}: {}", self.content),
            None => write!(f, "{}", self.content),
        }
    }
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::DuplicatePoint { duplicate_of } => write!(
                f,
                "This point is a duplicate of point {duplicate_of}. Duplicates count twice towards the fit."
            ),
            WarningContent::NarrowArc(degrees) => write!(
                f,
                "The points only cover {degrees:.1} degrees of the circle, so its center and radius are poorly determined."
            ),
            WarningContent::IllConditioned(condition_number) => write!(
                f,
                "The fit is ill-conditioned (condition number {condition_number:e}), small changes to the points could move the circle a lot."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_circle(degrees: &[f64]) -> Vec<Point> {
        degrees
            .iter()
            .map(|d| Point::new(libm::cos(d.to_radians()), libm::sin(d.to_radians())))
            .collect()
    }

    #[test]
    fn finds_duplicates() {
        let points = [
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        let warnings = duplicates(&points);
        assert_eq!(
            warnings,
            vec![
                Warning {
                    about_point: Some(2),
                    content: WarningContent::DuplicatePoint { duplicate_of: 0 }
                },
                Warning {
                    about_point: Some(4),
                    content: WarningContent::DuplicatePoint { duplicate_of: 0 }
                },
            ]
        );
    }

    #[test]
    fn coverage_of_full_and_partial_circles() {
        let unit = Circle::new(Point::new(0.0, 0.0), 1.0);
        let full = on_circle(&[0.0, 90.0, 180.0, 270.0]);
        assert!((arc_coverage_degrees(&full, unit) - 270.0).abs() < 1e-9);
        let narrow = on_circle(&[10.0, 20.0, 40.0]);
        assert!((arc_coverage_degrees(&narrow, unit) - 30.0).abs() < 1e-9);
        // Wrapping across the -180/180 seam.
        let seam = on_circle(&[170.0, -170.0, 175.0]);
        assert!((arc_coverage_degrees(&seam, unit) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn lint_flags_narrow_arc_only() {
        let unit = Circle::new(Point::new(0.0, 0.0), 1.0);
        let narrow = on_circle(&[0.0, 15.0, 30.0, 45.0]);
        let warnings = lint(&narrow, unit);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0].content,
            WarningContent::NarrowArc(d) if (d - 45.0).abs() < 1e-9
        ));
        let wide = on_circle(&[0.0, 120.0, 240.0]);
        assert!(lint(&wide, unit).is_empty());
    }

    #[test]
    fn display_formats_are_human_friendly() {
        let dup = WarningContent::DuplicatePoint { duplicate_of: 3 }.to_string();
        assert!(dup.contains("duplicate of point 3"));
        let narrow = WarningContent::NarrowArc(12.0).to_string();
        assert!(narrow.contains("12.0 degrees"));
        let ill = WarningContent::IllConditioned(1e9).to_string();
        assert!(ill.contains("ill-conditioned"));
        let about = Warning {
            about_point: Some(2),
            content: WarningContent::DuplicatePoint { duplicate_of: 0 },
        };
        assert!(about.to_string().starts_with("Point 2: "));
    }
}
