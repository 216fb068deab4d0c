#![no_main]

use arbitrary::Arbitrary;
use circlefit::{Circle, Config, Point};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|setup: Setup| {
    let config = Config::default().with_max_iterations(setup.max_iterations.into());
    let result = match setup.guess {
        Some(guess) => circlefit::fit_with_guess(&setup.points, Circle::from(guess), config),
        None => circlefit::fit(&setup.points, config),
    };
    // Whatever the input, a returned circle must be usable.
    if let Ok(outcome) = result {
        let circle = outcome.circle();
        assert!(circle.is_finite(), "{circle}");
        assert!(circle.radius > 0.0, "{circle}");
    }
});

#[derive(Debug, Arbitrary)]
struct Setup {
    points: Vec<Point>,
    guess: Option<[f64; 3]>,
    max_iterations: u8,
}
