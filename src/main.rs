use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use maestro_dtw::{
    compose, BoundaryMode2, BoundaryMode3, MixGains, MixtureCost, PairwiseDtw, StepPattern2,
    TripleDtw, WarpCurve,
};
use maestro_io::{AlignSummary, CurveReader, FeatureReader, PathWriter, ScenarioId};

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "Audio-to-audio alignment with generalized dynamic time warping")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared output options.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Scenario name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    scenario: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

/// Shared time-conversion options.
#[derive(Args, Debug, Clone)]
struct TimeArgs {
    /// Emit the path in seconds instead of frames
    #[arg(long, default_value_t = false)]
    seconds: bool,

    /// Hop size between feature frames, in samples
    #[arg(long, default_value_t = 512)]
    hop: u32,

    /// Audio sample rate in Hz
    #[arg(long, default_value_t = 22050)]
    sample_rate: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Align two feature CSV files with pairwise DTW
    Align {
        /// Path to the query feature CSV (rows = frames)
        #[arg(long)]
        query: PathBuf,

        /// Path to the reference feature CSV
        #[arg(long)]
        reference: PathBuf,

        /// Boundary mode: "standard", "subsequence", or "fixed-start"
        #[arg(long, default_value = "standard")]
        mode: String,

        /// Step displacements as "di,dj;di,dj;..."
        #[arg(long, default_value = "1,1;1,2;2,1")]
        steps: String,

        /// Step weights, one per step
        #[arg(long, default_value = "2,3,3")]
        weights: String,

        #[command(flatten)]
        time: TimeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Jointly align two part recordings against their full mix
    Align3 {
        /// Feature CSV of the first part (e.g. piano)
        #[arg(long)]
        part_a: PathBuf,

        /// Feature CSV of the second part (e.g. orchestra)
        #[arg(long)]
        part_b: PathBuf,

        /// Feature CSV of the full mix
        #[arg(long)]
        mix: PathBuf,

        /// Boundary mode: "standard" or "flex"
        #[arg(long, default_value = "standard")]
        mode: String,

        /// Minimum endpoint distance from the origin-adjacent faces (flex mode)
        #[arg(long, default_value_t = 5)]
        buffer: usize,

        /// Mixture cost: "sum" or "residual"
        #[arg(long, default_value = "sum")]
        mixture: String,

        /// Explicit gain for the first part (estimated from data if unset)
        #[arg(long)]
        gain_a: Option<f64>,

        /// Explicit gain for the second part (estimated from data if unset)
        #[arg(long)]
        gain_b: Option<f64>,

        #[command(flatten)]
        time: TimeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compose two path CSVs sharing their middle sequence into one
    Compose {
        /// Path CSV mapping sequence A to sequence B
        #[arg(long)]
        ab: PathBuf,

        /// Path CSV mapping sequence B to sequence C
        #[arg(long)]
        bc: PathBuf,

        /// Treat the second file as C-to-B and flip it before composing
        #[arg(long, default_value_t = false)]
        flip_bc: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Convert a frame-unit path CSV to seconds with optional offsets
    Convert {
        /// Path CSV to convert
        #[arg(long)]
        input: PathBuf,

        /// Hop size between feature frames, in samples
        #[arg(long, default_value_t = 512)]
        hop: u32,

        /// Audio sample rate in Hz
        #[arg(long, default_value_t = 22050)]
        sample_rate: u32,

        /// Additive offset for the first axis, in seconds
        #[arg(long, default_value_t = 0.0)]
        offset_a: f64,

        /// Additive offset for the second axis, in seconds
        #[arg(long, default_value_t = 0.0)]
        offset_b: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AlignOutput {
    scenario: String,
    mode: String,
    n_query: usize,
    n_reference: usize,
    path_len: usize,
    cost: f64,
    unit: String,
}

#[derive(Serialize)]
struct Align3Output {
    scenario: String,
    mode: String,
    n_part_a: usize,
    n_part_b: usize,
    n_mix: usize,
    path_len: usize,
    cost: f64,
    start: [usize; 3],
}

#[derive(Serialize)]
struct ComposeOutput {
    scenario: String,
    path_len: usize,
    unit: String,
}

#[derive(Serialize)]
struct ConvertOutput {
    scenario: String,
    path_len: usize,
    hop_seconds: f64,
}

fn parse_steps2(steps: &str, weights: &str) -> Result<StepPattern2> {
    let mut displacements = Vec::new();
    for part in steps.split(';') {
        let fields: Vec<&str> = part.split(',').collect();
        if fields.len() != 2 {
            anyhow::bail!("malformed step \"{part}\" (expected \"di,dj\")");
        }
        let di: usize = fields[0]
            .trim()
            .parse()
            .context("step displacement must be a non-negative integer")?;
        let dj: usize = fields[1]
            .trim()
            .parse()
            .context("step displacement must be a non-negative integer")?;
        displacements.push((di, dj));
    }
    let weights: Vec<f64> = weights
        .split(',')
        .map(|w| w.trim().parse::<f64>().context("step weight must be a number"))
        .collect::<Result<_>>()?;
    StepPattern2::new(&displacements, &weights).context("invalid step pattern")
}

fn parse_mode2(s: &str) -> Result<BoundaryMode2> {
    match s {
        "standard" => Ok(BoundaryMode2::Fixed),
        "subsequence" => Ok(BoundaryMode2::Subsequence),
        "fixed-start" => Ok(BoundaryMode2::FixedStartFreeEnd),
        other => anyhow::bail!("unknown mode: {other} (expected standard, subsequence, or fixed-start)"),
    }
}

fn parse_mixture(s: &str) -> Result<MixtureCost> {
    match s {
        "sum" => Ok(MixtureCost::Sum),
        "residual" => Ok(MixtureCost::Residual),
        other => anyhow::bail!("unknown mixture cost: {other} (expected sum or residual)"),
    }
}

/// Convert a solved frame path to the requested output unit.
fn finalize_curve(curve: WarpCurve, time: &TimeArgs) -> Result<WarpCurve> {
    if time.seconds {
        curve
            .into_seconds(maestro_dtw::hop_seconds(time.hop, time.sample_rate))
            .context("frames-to-seconds conversion failed")
    } else {
        Ok(curve)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Align {
            query,
            reference,
            mode,
            steps,
            weights,
            time,
            output,
        } => {
            let scenario = ScenarioId::new(output.scenario.clone())?;
            let pattern = parse_steps2(&steps, &weights)?;
            let boundary = parse_mode2(&mode)?;

            let a = FeatureReader::new(&query)
                .read()
                .context("failed to read query features")?;
            let b = FeatureReader::new(&reference)
                .read()
                .context("failed to read reference features")?;

            let solver = PairwiseDtw::new(pattern).with_mode(boundary);
            let result = solver
                .align(a.as_view(), b.as_view())
                .context("alignment failed")?;
            info!(cost = result.cost, path_len = result.path.len(), "alignment complete");

            let curve = finalize_curve(result.path.to_curve(), &time)?;

            let writer = PathWriter::new(&output.output_dir, scenario)?;
            writer.write_curve(&curve)?;
            writer.write_summary(&AlignSummary {
                scenario: output.scenario.clone(),
                mode: mode.clone(),
                n_a: a.n_frames(),
                n_b: b.n_frames(),
                n_c: None,
                path_len: curve.len(),
                cost: result.cost,
                unit: curve.unit().to_string(),
            })?;

            let summary = AlignOutput {
                scenario: output.scenario,
                mode,
                n_query: a.n_frames(),
                n_reference: b.n_frames(),
                path_len: curve.len(),
                cost: result.cost,
                unit: curve.unit().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Align3 {
            part_a,
            part_b,
            mix,
            mode,
            buffer,
            mixture,
            gain_a,
            gain_b,
            time,
            output,
        } => {
            let scenario = ScenarioId::new(output.scenario.clone())?;
            let mixture_cost = parse_mixture(&mixture)?;
            let boundary = match mode.as_str() {
                "standard" => BoundaryMode3::Fixed,
                "flex" => BoundaryMode3::Flex { buffer },
                other => anyhow::bail!("unknown mode: {other} (expected standard or flex)"),
            };

            let a = FeatureReader::new(&part_a)
                .read()
                .context("failed to read first part features")?;
            let b = FeatureReader::new(&part_b)
                .read()
                .context("failed to read second part features")?;
            let z = FeatureReader::new(&mix)
                .read()
                .context("failed to read mix features")?;

            let mut solver = TripleDtw::standard()
                .with_mode(boundary)
                .with_mixture(mixture_cost);
            if let (Some(x), Some(y)) = (gain_a, gain_b) {
                solver = solver.with_gains(MixGains { x, y });
            }

            let result = solver
                .align(a.as_view(), b.as_view(), z.as_view())
                .context("three-way alignment failed")?;
            info!(cost = result.cost, path_len = result.path.len(), "alignment complete");

            // The part-to-part correspondence is the pairwise projection
            // of the joint path.
            let curve = finalize_curve(result.path.project_ab().to_curve(), &time)?;

            let writer = PathWriter::new(&output.output_dir, scenario)?;
            writer.write_curve(&curve)?;
            writer.write_summary(&AlignSummary {
                scenario: output.scenario.clone(),
                mode: mode.clone(),
                n_a: a.n_frames(),
                n_b: b.n_frames(),
                n_c: Some(z.n_frames()),
                path_len: curve.len(),
                cost: result.cost,
                unit: curve.unit().to_string(),
            })?;

            let start = result.start;
            let summary = Align3Output {
                scenario: output.scenario,
                mode,
                n_part_a: a.n_frames(),
                n_part_b: b.n_frames(),
                n_mix: z.n_frames(),
                path_len: result.path.len(),
                cost: result.cost,
                start: [start.a, start.b, start.c],
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Compose {
            ab,
            bc,
            flip_bc,
            output,
        } => {
            let scenario = ScenarioId::new(output.scenario.clone())?;
            let ab_curve = CurveReader::new(&ab)
                .read()
                .context("failed to read A-B path")?;
            let mut bc_curve = CurveReader::new(&bc)
                .read()
                .context("failed to read B-C path")?;
            if flip_bc {
                bc_curve = bc_curve.swap_axes();
            }

            let ac = compose(&ab_curve, &bc_curve).context("composition failed")?;
            info!(path_len = ac.len(), "composition complete");

            let writer = PathWriter::new(&output.output_dir, scenario)?;
            writer.write_curve(&ac)?;

            let summary = ComposeOutput {
                scenario: output.scenario,
                path_len: ac.len(),
                unit: ac.unit().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Convert {
            input,
            hop,
            sample_rate,
            offset_a,
            offset_b,
            output,
        } => {
            let scenario = ScenarioId::new(output.scenario.clone())?;
            let curve = CurveReader::new(&input)
                .read()
                .context("failed to read path")?;

            let hop_secs = maestro_dtw::hop_seconds(hop, sample_rate);
            let converted = curve
                .into_seconds(hop_secs)
                .context("frames-to-seconds conversion failed")?
                .translate(offset_a, offset_b);

            let writer = PathWriter::new(&output.output_dir, scenario)?;
            writer.write_curve(&converted)?;

            let summary = ConvertOutput {
                scenario: output.scenario,
                path_len: converted.len(),
                hop_seconds: hop_secs,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
