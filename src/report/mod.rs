//! Console reports for searches, nested evaluations and full experiments

pub mod boxplot;
pub mod style;

pub use boxplot::{render_boxplot, BoxStats};

use crate::experiment::ExperimentReport;
use crate::nested::NestedResult;
use crate::search::GridSearchResult;
use colored::*;
use style::{accent, dim, kv, muted, ok, section, warn, wrap};

const PLOT_WIDTH: usize = 48;

const BIAS_NOTE: &str = "The non-nested score reuses the data that picked the \
hyperparameters, so it tends to overestimate accuracy on unseen data. The nested \
score tunes on inner folds only and evaluates on outer folds never seen during \
tuning, which gives an unbiased estimate.";

/// Candidate table for one grid search, best row highlighted
pub fn print_search<M>(result: &GridSearchResult<M>) {
    section("Grid search");
    println!(
        "  {:<5} {:<34} {:>8} {:>8}",
        muted("rank"),
        muted("params"),
        muted("mean"),
        muted("std")
    );
    println!("  {}", dim(&"─".repeat(58)));

    for (i, c) in result.candidates.iter().enumerate() {
        let line = format!(
            "{:<5} {:<34} {:>8.4} {:>8.4}",
            c.rank,
            c.params.to_string(),
            c.mean_score,
            c.std_score
        );
        if i == result.best_index {
            println!("  {}", line.white().bold());
        } else {
            println!("  {}", line);
        }
    }

    println!("  {}", dim(&"─".repeat(58)));
    println!(
        "  {} {} {} {:.6}",
        ok("best"),
        result.best_params.to_string().white().bold(),
        muted("score:"),
        result.best_score
    );
    println!(
        "  {}",
        dim(&format!("{} folds, {} fits", result.n_splits, result.n_fits))
    );
}

/// Per-fold records of one nested evaluation
pub fn print_nested(result: &NestedResult) {
    section("Nested cross-validation");
    println!(
        "  {:<5} {:>6} {:>6} {:<26} {:>7} {:>7}",
        muted("fold"),
        muted("train"),
        muted("test"),
        muted("selected"),
        muted("inner"),
        muted("outer")
    );
    println!("  {}", dim(&"─".repeat(58)));

    for fold in &result.folds {
        println!(
            "  {:<5} {:>6} {:>6} {:<26} {:>7.4} {:>7.4}",
            fold.fold_idx,
            fold.train_indices.len(),
            fold.test_indices.len(),
            fold.best_params.to_string(),
            fold.inner_score,
            fold.test_score
        );
    }

    println!("  {}", dim(&"─".repeat(58)));
    kv("mean", &format!("{:.6} ± {:.6}", result.mean_score(), result.std_score()));
    if result.is_leak_free() {
        println!("  {} {}", ok("✓"), dim("no outer test sample reached an inner split"));
    } else {
        println!("  {} {}", warn("!"), "outer test samples leaked into inner splits".red());
    }
}

/// Full experiment: first-trial search, bias note, per-trial table, box plot, summary
pub fn print_experiment(report: &ExperimentReport) {
    if let Some(first) = report.first_trial() {
        section("Non-nested search (trial 1)");
        kv("best params", &first.non_nested_params.to_string());
        kv("best score", &format!("{:.6}", first.non_nested_score));
    }

    println!();
    for line in wrap(BIAS_NOTE, 58) {
        println!("  {}", dim(&line));
    }

    section("Trials");
    println!(
        "  {:<6} {:>6} {:>12} {:>10} {:>12}",
        muted("trial"),
        muted("seed"),
        muted("non-nested"),
        muted("nested"),
        muted("difference")
    );
    println!("  {}", dim(&"─".repeat(50)));
    for (i, t) in report.trials.iter().enumerate() {
        println!(
            "  {:<6} {:>6} {:>12.4} {:>10.4} {:>12.4}",
            t.trial + 1,
            t.seed,
            report.non_nested_scores[i],
            report.nested_scores[i],
            report.score_difference[i]
        );
    }

    section("Score distribution");
    let series: [(&str, &[f64]); 3] = [
        ("non-nested", report.non_nested_scores.as_slice()),
        ("nested", report.nested_scores.as_slice()),
        ("difference", report.score_difference.as_slice()),
    ];
    // Differences live on a different scale; plot them on their own axis
    for line in render_boxplot(&series[..2], PLOT_WIDTH) {
        println!("  {}", line);
    }
    println!();
    for line in render_boxplot(&series[2..], PLOT_WIDTH) {
        println!("  {}", line);
    }

    println!();
    println!("  {}", accent(&report.summary_line()).bold());
    println!(
        "  {}",
        dim(&format!(
            "{} trials on {} ({} samples) in {:.2}s",
            report.trials.len(),
            report.dataset,
            report.n_samples,
            report.elapsed_secs
        ))
    );
    println!();
}
