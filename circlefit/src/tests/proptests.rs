use std::f64::consts::TAU;

use proptest::prelude::*;

use crate::{
    Circle, Config, Degeneracy, FitError, Point, fit, fit_with_guess,
    tests::{assert_nearly_eq, points_on},
};

/// Evenly spaced around the circle, starting at `phase` radians.
fn evenly_spaced(circle: Circle, n: usize, phase: f64) -> Vec<Point> {
    let degrees: Vec<f64> = (0..n)
        .map(|i| (phase + TAU * i as f64 / n as f64).to_degrees())
        .collect();
    points_on(circle, &degrees)
}

/// Perturb each point's X and Y by `noise` (consumed in pairs), scaled by `amplitude`.
fn jitter(points: Vec<Point>, noise: &[f64], amplitude: f64) -> Vec<Point> {
    points
        .into_iter()
        .zip(noise.chunks_exact(2))
        .map(|(p, n)| p.translate(amplitude * n[0], amplitude * n[1]))
        .collect()
}

proptest! {
    #[test]
    fn recovers_exact_circle_from_three_points(
        a in -100.0..100.0f64,
        b in -100.0..100.0f64,
        r in 0.5..50.0f64,
        phase in 0.0..TAU,
        wobble1 in -0.5..0.5f64,
        wobble2 in -0.5..0.5f64,
    ) {
        let expected = Circle::new(Point::new(a, b), r);
        let degrees = [
            phase.to_degrees(),
            (phase + TAU / 3.0 + wobble1).to_degrees(),
            (phase + 2.0 * TAU / 3.0 + wobble2).to_degrees(),
        ];
        let points = points_on(expected, &degrees);

        // Invariant: three well-spread points on a circle pin it down exactly.
        let outcome = fit(&points, Config::default())
            .expect("three well-spread points should always be fittable");
        let actual = outcome.circle();
        assert_nearly_eq(actual.center.x, a);
        assert_nearly_eq(actual.center.y, b);
        assert_nearly_eq(actual.radius, r);
    }

    #[test]
    fn noise_moves_the_fit_proportionally(
        a in -100.0..100.0f64,
        b in -100.0..100.0f64,
        r in 1.0..50.0f64,
        phase in 0.0..TAU,
        noise in prop::collection::vec(-1.0..1.0f64, 32),
    ) {
        let expected = Circle::new(Point::new(a, b), r);
        let amplitude = 1e-3 * r;
        let points = jitter(evenly_spaced(expected, 16, phase), &noise, amplitude);

        let actual = fit(&points, Config::default())
            .expect("noisy points around a full circle should be fittable")
            .circle();
        let bound = 5.0 * amplitude;
        prop_assert!((actual.center.x - a).abs() < bound);
        prop_assert!((actual.center.y - b).abs() < bound);
        prop_assert!((actual.radius - r).abs() < bound);
    }

    #[test]
    fn translation_shifts_center_only(
        r in 1.0..50.0f64,
        phase in 0.0..TAU,
        noise in prop::collection::vec(-1.0..1.0f64, 20),
        dx in -1000.0..1000.0f64,
        dy in -1000.0..1000.0f64,
    ) {
        let circle = Circle::new(Point::new(0.0, 0.0), r);
        let points = jitter(evenly_spaced(circle, 10, phase), &noise, 0.01 * r);
        let moved: Vec<Point> = points.iter().map(|p| p.translate(dx, dy)).collect();

        let original = fit(&points, Config::default()).unwrap().circle();
        let translated = fit(&moved, Config::default()).unwrap().circle();
        assert_nearly_eq(translated.center.x - dx, original.center.x);
        assert_nearly_eq(translated.center.y - dy, original.center.y);
        assert_nearly_eq(translated.radius, original.radius);
    }

    #[test]
    fn point_order_is_irrelevant(
        (points, shuffled) in prop::collection::vec(-1.0..1.0f64, 24)
            .prop_map(|noise| {
                let circle = Circle::new(Point::new(3.0, -7.0), 4.0);
                jitter(evenly_spaced(circle, 12, 0.3), &noise, 0.05)
            })
            .prop_flat_map(|points| {
                let shuffled = Just(points.clone()).prop_shuffle();
                (Just(points), shuffled)
            }),
    ) {
        let original = fit(&points, Config::default()).unwrap().circle();
        let permuted = fit(&shuffled, Config::default()).unwrap().circle();
        assert_nearly_eq(original.center.x, permuted.center.x);
        assert_nearly_eq(original.center.y, permuted.center.y);
        assert_nearly_eq(original.radius, permuted.radius);
    }

    #[test]
    fn any_positive_guess_finds_the_circle(
        a in -10.0..10.0f64,
        b in -10.0..10.0f64,
        r in 0.01..10.0f64,
    ) {
        let expected = Circle::new(Point::new(0.0, 0.0), 1.0);
        let points = points_on(expected, &[0.0, 72.0, 144.0, 216.0, 288.0]);
        let guess = Circle::new(Point::new(a, b), r);
        let actual = fit_with_guess(&points, guess, Config::default())
            .expect("exact points should fit from any positive-radius guess")
            .circle();
        assert_nearly_eq(actual.center.x, 0.0);
        assert_nearly_eq(actual.center.y, 0.0);
        assert_nearly_eq(actual.radius, 1.0);
    }

    #[test]
    fn collinear_points_never_fit(
        slope in -10.0..10.0f64,
        intercept in -100.0..100.0f64,
        xs in prop::collection::vec(-100.0..100.0f64, 3..10),
    ) {
        let spread = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - xs.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1.0);
        let points: Vec<Point> = xs.iter().map(|&x| Point::new(x, slope * x + intercept)).collect();

        // Invariant: a straight line has no circle through it, so this must fail loudly
        // instead of returning an enormous radius.
        let err = fit(&points, Config::default()).unwrap_err();
        prop_assert!(
            matches!(
                err,
                FitError::DegenerateGeometry(Degeneracy::Collinear | Degeneracy::SingularJacobian)
            ),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn successful_fits_are_always_valid(
        xy in prop::collection::vec((-1e3..1e3f64, -1e3..1e3f64), 3..20),
    ) {
        let points: Vec<Point> = xy.into_iter().map(Point::from).collect();
        // Random point clouds may fail, but a returned circle must be usable.
        if let Ok(outcome) = fit(&points, Config::default()) {
            let circle = outcome.circle();
            prop_assert!(circle.is_finite());
            prop_assert!(circle.radius > 0.0);
            prop_assert!(outcome.sum_of_squares().is_finite());
        }
    }
}
