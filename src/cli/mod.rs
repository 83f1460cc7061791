//! nestcv CLI Module
//!
//! Command-line interface for the nested vs. non-nested comparison.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::data::{self, Dataset, BUNDLED_DATASETS};
use crate::experiment::{ExperimentConfig, TrialRunner};
use crate::report::style::{
    accent, dim, line_box, line_box_bottom, line_box_center, line_box_empty, line_box_sep,
    line_box_top, muted, section, step_done, step_ok, step_run,
};
use crate::report::{print_experiment, print_nested, print_search};

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nestcv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Nested vs. non-nested cross-validation for SVM hyperparameter search")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full comparison over many trials
    Run {
        #[command(flatten)]
        args: ExperimentArgs,

        /// Print the report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Run one non-nested grid search and print every candidate
    Search {
        #[command(flatten)]
        args: ExperimentArgs,
    },

    /// Run one nested evaluation and print every outer fold
    Nested {
        #[command(flatten)]
        args: ExperimentArgs,
    },

    /// List bundled datasets
    Datasets,
}

/// Options shared by every experiment command; unset options keep the
/// value from `--config` or the built-in default
#[derive(Args, Debug, Clone, Default)]
pub struct ExperimentArgs {
    /// Bundled dataset name
    #[arg(short, long, conflicts_with = "csv")]
    pub dataset: Option<String>,

    /// CSV file to load instead of a bundled dataset
    #[arg(long, requires = "target")]
    pub csv: Option<PathBuf>,

    /// Target column of the CSV file
    #[arg(short, long)]
    pub target: Option<String>,

    /// Number of trials
    #[arg(long)]
    pub trials: Option<usize>,

    /// Folds used by the grid search
    #[arg(long)]
    pub inner_folds: Option<usize>,

    /// Folds used to score tuned models
    #[arg(long)]
    pub outer_folds: Option<usize>,

    /// Worker threads per grid search
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Base seed; trial i uses seed + i
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep class proportions in every fold
    #[arg(long)]
    pub stratified: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ExperimentArgs {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn to_config(&self) -> anyhow::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };

        if let Some(name) = &self.dataset {
            config.dataset = name.clone();
        }
        if let Some(n) = self.trials {
            config.num_trials = n;
        }
        if let Some(k) = self.inner_folds {
            config.inner_folds = k;
        }
        if let Some(k) = self.outer_folds {
            config.outer_folds = k;
        }
        if let Some(seed) = self.seed {
            config.base_seed = seed;
        }
        if self.jobs.is_some() {
            config.n_jobs = self.jobs;
        }
        if self.stratified {
            config.stratified = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Dataset named by `--csv` or, failing that, by the configuration
    pub fn load_dataset(&self, config: &ExperimentConfig) -> anyhow::Result<Dataset> {
        let ds = match (&self.csv, &self.target) {
            (Some(path), Some(target)) => data::load_csv_dataset(path, target)?,
            (Some(_), None) => anyhow::bail!("--csv requires --target"),
            _ => data::load_dataset(&config.dataset)?,
        };
        ds.ensure_binary()?;
        Ok(ds)
    }
}

fn describe_dataset(ds: &Dataset) -> String {
    let counts = ds
        .class_counts()
        .iter()
        .map(|(label, n)| format!("{}: {}", label, n))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} rows × {} features ({})", ds.n_samples(), ds.n_features(), counts)
}

fn load_step(args: &ExperimentArgs, config: &ExperimentConfig) -> anyhow::Result<Dataset> {
    step_run("Loading data");
    let ds = args.load_dataset(config)?;
    step_done(&describe_dataset(&ds));
    Ok(ds)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(args: &ExperimentArgs, json: bool) -> anyhow::Result<()> {
    let config = args.to_config()?;

    if json {
        let ds = args.load_dataset(&config)?;
        let report = TrialRunner::new(config)?.run(&ds)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_banner(&config);
    section("Experiment");
    let ds = load_step(args, &config)?;

    let runner = TrialRunner::new(config)?;
    let n_trials = runner.config().num_trials;
    let report = runner.run_with_progress(&ds, |t| {
        step_ok(&format!(
            "trial {:>3}/{}  {} {:.4}  {} {:.4}",
            t.trial + 1,
            n_trials,
            muted("non-nested"),
            t.non_nested_score,
            muted("nested"),
            t.nested_score()
        ));
    })?;

    print_experiment(&report);
    Ok(())
}

pub fn cmd_search(args: &ExperimentArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    section("Search");
    let ds = load_step(args, &config)?;

    let seed = config.base_seed;
    let runner = TrialRunner::new(config)?;
    let search = runner.search_for(seed);

    step_run(&format!(
        "Fitting {} candidates × {} folds",
        search.grid().len(),
        search.cv().n_splits()
    ));
    let start = Instant::now();
    let result = search.fit(&ds.x, &ds.y)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    print_search(&result);
    println!();
    Ok(())
}

pub fn cmd_nested(args: &ExperimentArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    section("Nested");
    let ds = load_step(args, &config)?;

    let seed = config.base_seed;
    let runner = TrialRunner::new(config)?;
    let nested = runner.nested_for(seed);

    step_run(&format!(
        "Evaluating {} outer folds ({} fits each)",
        nested.outer().n_splits(),
        nested.inner().fits_per_search()
    ));
    let start = Instant::now();
    let result = nested.evaluate(&ds.x, &ds.y)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    print_nested(&result);
    println!();
    Ok(())
}

pub fn cmd_datasets() -> anyhow::Result<()> {
    section("Bundled datasets");
    for (name, description) in BUNDLED_DATASETS {
        println!("  {:<14} {}", accent(name), dim(description));
    }
    println!();
    println!("  {}", dim("use --csv PATH --target COLUMN for your own data"));
    println!();
    Ok(())
}

fn print_banner(config: &ExperimentConfig) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "nestcv".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&format!("{} {}", muted("trials     "), config.num_trials.to_string().white()));
    line_box(&format!(
        "{} {} inner / {} outer",
        muted("folds      "),
        config.inner_folds,
        config.outer_folds
    ));
    line_box(&format!("{} {} candidates", muted("grid       "), config.grid.len()));
    line_box(&format!("{} {}", muted("classifier "), config.svm.describe()));
    line_box_empty();
    line_box_bottom();
}
