mod provenance;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gbus::dsl::{default_leaves, manhattan, manhattan_diagonal, Program};
use gbus::maze::Maze;
use gbus::oracle::{BestRecord, Oracle, OracleCfg, ScoreFlags};
use gbus::synth::{
    BucketTable, CostModel, PerformanceTransform, Rounding, SynthCfg, Synthesizer,
};
use polars::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use provenance::{current_git_rev, sibling_path, write_sidecar, RunParams};

#[derive(Parser)]
#[command(name = "gbus-cli")]
#[command(about = "Guided bottom-up heuristic synthesis runner")]
struct Cmd {
    /// Optional run label; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Synthesize a heuristic and write summary, bucket table, and provenance
    Run {
        #[command(flatten)]
        maze: MazeArgs,
        #[command(flatten)]
        search: SearchArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Score a reference heuristic on a maze
    Score {
        #[command(flatten)]
        maze: MazeArgs,
        #[arg(long, value_enum, default_value_t = Baseline::Manhattan)]
        heuristic: Baseline,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Clone, Debug, Serialize)]
struct MazeArgs {
    /// MovingAI `.map` file; a random maze is generated when omitted
    #[arg(long)]
    map: Option<PathBuf>,
    #[arg(long, default_value_t = 32)]
    rows: usize,
    #[arg(long, default_value_t = 32)]
    cols: usize,
    /// Random mazes block cells whose uniform draw exceeds this
    #[arg(long, default_value_t = 0.8)]
    cutoff: f64,
    /// Number of (start, goal) pairs
    #[arg(long, default_value_t = 10)]
    pairs: usize,
    /// Seeds maze generation, pair sampling, and tie-breaks
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Also walk every pair on the 90°-rotated field
    #[arg(long)]
    rotate: bool,
    #[arg(long)]
    no_early_termination: bool,
}

#[derive(Args, Clone, Debug, Serialize)]
struct SearchArgs {
    /// Size-counter bound; 0 disables search
    #[arg(long, default_value_t = 10)]
    bound: usize,
    #[arg(long, value_enum, default_value_t = PerfType::Epsilon)]
    perf_type: PerfType,
    #[arg(long, default_value_t = 0.25)]
    log_base: f64,
    #[arg(long, default_value_t = 10.0)]
    reg_divisor: f64,
    #[arg(long, default_value_t = 1.5)]
    reg_power: f64,
    #[arg(long, value_enum, default_value_t = RoundingArg::Individually)]
    rounding: RoundingArg,
    /// Fingerprint raw instead of normalized window values
    #[arg(long)]
    raw_fingerprints: bool,
    #[arg(long, default_value_t = 0.05)]
    restart_margin: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum PerfType {
    Epsilon,
    Laplace,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum RoundingArg {
    Individually,
    Sum,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Baseline {
    Manhattan,
    Diagonal,
}

impl SearchArgs {
    fn synth_cfg(&self) -> SynthCfg {
        SynthCfg {
            bound: self.bound,
            restart_margin: self.restart_margin,
            compare_normalized_costs: !self.raw_fingerprints,
            cost: CostModel {
                transform: match self.perf_type {
                    PerfType::Epsilon => PerformanceTransform::Epsilon,
                    PerfType::Laplace => PerformanceTransform::Laplace,
                },
                log_base: self.log_base,
                reg_divisor: self.reg_divisor,
                reg_power: self.reg_power,
                rounding: match self.rounding {
                    RoundingArg::Individually => Rounding::Individually,
                    RoundingArg::Sum => Rounding::Sum,
                },
            },
        }
    }
}

#[derive(Serialize)]
struct MazeSummary {
    source: String,
    rows: usize,
    cols: usize,
    free_cells: usize,
}

#[derive(Serialize)]
struct PairSummary {
    start: [usize; 2],
    goal: [usize; 2],
}

#[derive(Serialize)]
struct Baselines {
    manhattan: f64,
    manhattan_diagonal: f64,
}

#[derive(Serialize)]
struct RunSummary {
    tag: Option<String>,
    maze: MazeSummary,
    pairs: Vec<PairSummary>,
    baselines: Baselines,
    best_program: Option<String>,
    best_program_size: Option<usize>,
    best_avg_steps: f64,
    levels: usize,
    restarts: usize,
    evaluated: usize,
    table_programs: usize,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run { maze, search, out } => run(&maze, &search, &out, cmd.tag),
        Action::Score { maze, heuristic } => score(&maze, heuristic),
        Action::Report => report(cmd.tag),
    }
}

fn load_maze(args: &MazeArgs, rng: &mut StdRng) -> Result<(Maze, String)> {
    match &args.map {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading map {}", path.display()))?;
            let maze =
                Maze::parse_map(&text).with_context(|| format!("parsing {}", path.display()))?;
            Ok((maze, path.display().to_string()))
        }
        None => {
            let maze = Maze::generate(args.rows, args.cols, args.cutoff, rng)
                .context("generating random maze")?;
            let source = format!("random {}x{} cutoff={}", args.rows, args.cols, args.cutoff);
            Ok((maze, source))
        }
    }
}

fn build_oracle(args: &MazeArgs) -> Result<(Oracle<StdRng>, MazeSummary)> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let (maze, source) = load_maze(args, &mut rng)?;
    let pairs = maze
        .sample_pairs(args.pairs, &mut rng)
        .context("sampling (start, goal) pairs")?;
    let summary = MazeSummary {
        source,
        rows: maze.rows(),
        cols: maze.cols(),
        free_cells: maze.free_cells().len(),
    };
    tracing::info!(
        maze = %summary.source,
        rows = summary.rows,
        cols = summary.cols,
        pairs = pairs.len(),
        "maze ready"
    );
    let cfg = OracleCfg {
        rotate_maze: args.rotate,
        early_termination: !args.no_early_termination,
    };
    let oracle = Oracle::new(maze, pairs, cfg, rng).context("binding pairs to the maze")?;
    Ok((oracle, summary))
}

fn run(maze_args: &MazeArgs, search: &SearchArgs, out: &Path, tag: Option<String>) -> Result<()> {
    tracing::info!(out = %out.display(), tag = ?tag, "run");
    let (mut oracle, maze_summary) = build_oracle(maze_args)?;

    let manhattan_score =
        oracle.score(&manhattan(), ScoreFlags::validation(), &mut BestRecord::default());
    if manhattan_score.accepted.is_none() {
        bail!("broken maze: the manhattan heuristic does not connect every (start, goal) pair");
    }
    let diagonal_score =
        oracle.score(&manhattan_diagonal(), ScoreFlags::validation(), &mut BestRecord::default());
    tracing::info!(
        manhattan = manhattan_score.avg_steps,
        manhattan_diagonal = diagonal_score.avg_steps,
        "baselines"
    );

    let pairs = oracle
        .pairs()
        .iter()
        .map(|p| PairSummary {
            start: [p.start.row, p.start.col],
            goal: [p.goal.row, p.goal.col],
        })
        .collect();

    let mut synth = Synthesizer::new(oracle, default_leaves(), search.synth_cfg());
    let outcome = synth.search()?;
    match &outcome.best_program {
        Some(p) => tracing::info!(program = %p, avg_steps = outcome.best_avg_steps, "best heuristic"),
        None => tracing::warn!("no heuristic found"),
    }

    let summary = RunSummary {
        tag: tag.clone(),
        maze: maze_summary,
        pairs,
        baselines: Baselines {
            manhattan: manhattan_score.avg_steps,
            manhattan_diagonal: diagonal_score.avg_steps,
        },
        best_program: outcome.best_program.as_ref().map(Program::render),
        best_program_size: outcome.best_program.as_ref().map(Program::structural_size),
        best_avg_steps: outcome.best_avg_steps,
        levels: outcome.levels,
        restarts: outcome.restarts,
        evaluated: outcome.evaluated,
        table_programs: synth.table().len(),
    };

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let table_path = sibling_path(out, "buckets.csv");
    write_bucket_table(synth.table(), &table_path)?;

    let run_params = RunParams {
        seed: maze_args.seed,
        tag,
        params: serde_json::json!({
            "maze": maze_args,
            "search": search,
        }),
    };
    write_sidecar(out, &[table_path], &run_params)?;
    Ok(())
}

fn write_bucket_table(table: &BucketTable, path: &Path) -> Result<()> {
    let mut buckets: Vec<u32> = Vec::with_capacity(table.len());
    let mut sizes: Vec<u32> = Vec::with_capacity(table.len());
    let mut programs: Vec<String> = Vec::with_capacity(table.len());
    for (bucket, progs) in table.iter() {
        for p in progs {
            buckets.push(bucket as u32);
            sizes.push(p.structural_size() as u32);
            programs.push(p.render());
        }
    }
    let mut df = df!(
        "bucket" => buckets,
        "size" => sizes,
        "program" => programs
    )?;
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(rows = df.height(), path = %path.display(), "bucket table written");
    Ok(())
}

fn score(maze_args: &MazeArgs, heuristic: Baseline) -> Result<()> {
    let (mut oracle, _) = build_oracle(maze_args)?;
    let program = match heuristic {
        Baseline::Manhattan => manhattan(),
        Baseline::Diagonal => manhattan_diagonal(),
    };
    let s = oracle.score(&program, ScoreFlags::validation(), &mut BestRecord::default());
    let obj = serde_json::json!({
        "heuristic": program.render(),
        "avg_steps": s.avg_steps,
        "accepted": s.accepted,
        "completed": s.completed,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": current_git_rev(),
        "crate_version": gbus::VERSION,
        "tag": tag,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
