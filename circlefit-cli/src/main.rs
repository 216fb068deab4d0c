use std::{hint::black_box, time::Duration};

use anyhow::{Context, bail};
use circlefit::{Config, FitAnalysis, FitError, FitOutcome, Point, Warning};
use clap::Parser;

const NUM_ITERS_BENCHMARK: u32 = 100;

/// Points used when none are given on the command line.
const DEFAULT_POINTS: [(f64, f64); 5] = [(1.0, 2.0), (2.0, 3.0), (3.0, 4.0), (4.0, 5.0), (5.0, 6.0)];

#[derive(Parser)]
#[command(name = "circlefit", version, about, long_about = None)]
struct Cli {
    /// A point to fit, as `X,Y`. Repeat for each point.
    #[arg(short = 'p', long = "point", value_parser = parse_point, allow_hyphen_values = true)]
    points: Vec<Point>,

    /// Give up after this many solver steps.
    #[arg(long = "max-iterations")]
    max_iterations: Option<usize>,

    /// Relative decrease in the sum of squares that counts as converged.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Starting value of the damping parameter.
    #[arg(long = "initial-damping")]
    initial_damping: Option<f64>,

    /// Report conditioning and standard errors of the fit.
    #[arg(long, default_value_t = false)]
    analysis: bool,

    /// Show each point's distance from the fitted circle.
    #[arg(long = "show-residuals")]
    show_residuals: bool,
}

impl Cli {
    fn points(&self) -> Vec<Point> {
        if self.points.is_empty() {
            DEFAULT_POINTS.into_iter().map(Point::from).collect()
        } else {
            self.points.clone()
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(initial_damping) = self.initial_damping {
            config = config.with_initial_damping(initial_damping);
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = match main_inner(&cli) {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            print_failure_output(&e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    print_output(&report, &cli);
}

/// Everything the CLI prints about a successful fit.
#[derive(Debug)]
struct Report {
    points: Vec<Point>,
    outcome: FitOutcome,
    analysis: Option<FitAnalysis>,
    duration: Duration,
}

type RunResult = Result<Report, FitError>;

fn main_inner(cli: &Cli) -> anyhow::Result<RunResult> {
    let points = cli.points();
    let config = cli.config();

    let fitted = if cli.analysis {
        circlefit::fit_with_analysis(&points, config)
            .map(|fitted| (fitted.outcome, Some(fitted.analysis)))
    } else {
        circlefit::fit(&points, config).map(|outcome| (outcome, None))
    };
    let (outcome, analysis) = match fitted {
        Ok(fitted) => fitted,
        Err(e) => return Ok(Err(e)),
    };

    // It succeeded. Benchmark its perf
    let now = std::time::Instant::now();
    for _ in 0..NUM_ITERS_BENCHMARK {
        if black_box(circlefit::fit(black_box(&points), config)).is_err() {
            bail!("fitting the same points again failed");
        }
    }
    let duration = now.elapsed() / NUM_ITERS_BENCHMARK;
    Ok(Ok(Report {
        points,
        outcome,
        analysis,
        duration,
    }))
}

/// Prints the output nicely to stdout.
fn print_output(report: &Report, cli: &Cli) {
    let Report {
        points,
        outcome,
        analysis,
        duration,
    } = report;
    print_warnings(outcome.warnings());
    println!("{}", outcome.circle());
    println!(
        "Iterations needed: {} ({})",
        outcome.iterations(),
        outcome.termination()
    );
    println!("RMS residual: {:.3e}", outcome.rms_residual());
    if let Some(analysis) = analysis {
        print_analysis(analysis);
    }
    print_performance(*duration);
    if cli.show_residuals {
        println!("Residuals:");
        for (i, (point, residual)) in points
            .iter()
            .zip(outcome.geometric_residuals(points))
            .enumerate()
        {
            println!("\t{i}: {point} is {residual:+.3e} from the circle");
        }
    }
}

fn print_analysis(analysis: &FitAnalysis) {
    use colored::Colorize;
    let [s0, s1, s2] = analysis.singular_values;
    println!("Singular values: {s0:.3e}, {s1:.3e}, {s2:.3e}");
    let condition_number = format!("{:.3e}", analysis.condition_number);
    let condition_number = if analysis.condition_number > 1e8 {
        condition_number.yellow()
    } else {
        condition_number.normal()
    };
    println!("Condition number: {condition_number}");
    match analysis.standard_errors {
        Some(errors) => println!(
            "Standard errors: center x ±{:.3e}, center y ±{:.3e}, radius ±{:.3e}",
            errors.center_x, errors.center_y, errors.radius
        ),
        None => println!("Standard errors: unknown (need more than 3 points)"),
    }
}

fn print_performance(duration: Duration) {
    use colored::Colorize;
    let time = format!("{}μs", duration.as_micros());
    println!("Fit in {time} (mean over {NUM_ITERS_BENCHMARK} iterations)");
    let fits_per_second = Duration::from_secs(1).as_micros() / duration.as_micros().max(1);
    let fits_per_second = if fits_per_second <= 60 {
        fits_per_second.to_string().red()
    } else {
        fits_per_second.to_string().normal()
    };
    println!("i.e. {fits_per_second} fits per second");
}

fn print_warnings(warnings: &[Warning]) {
    use colored::Colorize;
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("\t{}", warning.to_string().yellow());
        }
    }
}

fn print_failure_output(error: &FitError) {
    use colored::Colorize;
    eprintln!("{}: {}", "Could not fit a circle".red(), error);
    if let Some(estimate) = error.unconverged_estimate() {
        eprintln!("Last estimate was {estimate}. Try raising --max-iterations.");
    } else if error.degeneracy().is_some() {
        eprintln!("Your points don't pin down a unique circle. Try adding points off the line.");
    }
}

/// Parse `X,Y` into a point.
fn parse_point(s: &str) -> anyhow::Result<Point> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected a point like `X,Y`, got `{s}`");
    };
    let x: f64 = x.trim().parse().with_context(|| format!("bad X component `{x}`"))?;
    let y: f64 = y.trim().parse().with_context(|| format!("bad Y component `{y}`"))?;
    Ok(Point::new(x, y))
}
