//! A basic example for how to use the circle fitter.
use circlefit::{Config, Point, fit};

fn main() {
    // Measured points, roughly on a circle centered at (2, 3) with radius 5.
    let points = [
        Point::new(7.01, 3.0),
        Point::new(2.0, 7.98),
        Point::new(-3.02, 3.01),
        Point::new(2.0, -1.99),
        Point::new(5.55, 6.52),
    ];

    // Run the fitter!
    let outcome = fit(&points, Config::default());

    // Check the outcome.
    match outcome {
        Ok(outcome) => {
            println!("{}", outcome.circle());
            println!(
                "Took {} iterations, RMS residual {:.3e}",
                outcome.iterations(),
                outcome.rms_residual()
            );
            for warning in outcome.warnings() {
                println!("Warning: {warning}");
            }
        }
        Err(e) => {
            eprintln!("circlefit could not fit these points: {e}");
        }
    }
}
