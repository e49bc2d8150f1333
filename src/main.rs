use algebrist::{
    evaluate_str,
    interpreter::{
        checking::{equivalence::are_equivalent, settings::CheckingSettings},
        library::core::builtin_scope,
    },
};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing_subscriber::EnvFilter;

/// algebrist evaluates mathematical expressions, or checks whether two of
/// them are equivalent.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Binds a variable before evaluating, as NAME=EXPRESSION. Bindings are
    /// evaluated in order, so later ones may use earlier ones.
    #[arg(short = 'v', long = "var", value_name = "NAME=EXPRESSION")]
    variables: Vec<String>,

    /// Instead of printing the value of the expression, prints whether it is
    /// equivalent to this one.
    #[arg(short, long, value_name = "EXPRESSION")]
    equiv: Option<String>,

    /// Number of random sample points used by --equiv.
    #[arg(long, default_value_t = 5)]
    points: usize,

    /// Lower end of the interval free variables are sampled from.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    range_start: f64,

    /// Upper end of the interval free variables are sampled from.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    range_end: f64,

    /// The expressions are equivalent while fewer sample points than this
    /// disagree.
    #[arg(long, default_value_t = 1)]
    failure_rate: usize,

    /// Seed for the sample points and for `random`, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Logs what the interpreter is doing to stderr.
    #[arg(long)]
    verbose: bool,

    expression: String,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut scope = builtin_scope();
    if let Some(seed) = args.seed {
        scope.seed_random(seed);
    }
    for binding in &args.variables {
        let Some((name, source)) = binding.split_once('=') else {
            return Err(format!("'{binding}' is not of the form NAME=EXPRESSION").into());
        };
        let value = evaluate_str(source, &scope)?;
        scope.set_variable(name.trim(), value);
    }

    if let Some(other) = &args.equiv {
        let settings = CheckingSettings { points: args.points,
                                          range: (args.range_start, args.range_end),
                                          failure_rate: args.failure_rate,
                                          ..CheckingSettings::default() };
        let mut rng = args.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        println!("{}", are_equivalent(&args.expression, other, &settings, &scope, &mut rng));
    } else {
        println!("{}", evaluate_str(&args.expression, &scope)?);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
