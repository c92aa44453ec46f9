// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. Parses arguments
// with clap, hands a config to Layer 2, prints what came back.
//
// Three commands are supported:
//   1. `mine`    harvest eco-scored products into a corpus file
//   2. `train`   fit the network, write the weights artifact
//   3. `predict` score one product with a trained artifact
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, MineArgs, PredictArgs, TrainArgs};

use crate::data::harvester::{HarvestState, PageProgress};
use crate::domain::corpus::SCORE_BUCKETS;
use crate::domain::example::ProductSignals;
use crate::domain::product::{Grade, GradeHistogram};

#[derive(Parser, Debug)]
#[command(
    name = "ecoscore-trainer",
    version,
    about = "Mine eco-score training data from a product catalog, then train a compact score regressor."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Mine(args)    => run_mine(args),
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_mine(args: MineArgs) -> Result<()> {
    use crate::application::mine_use_case::MineUseCase;

    tracing::info!("Mining from {}", args.base_url);

    let report = MineUseCase::new(args.into()).execute(print_progress)?;
    let corpus = &report.corpus;

    println!("\nStopped: {}", report.stop_reason);
    println!(
        "Pages: {} fetched, {} failed",
        report.pages_fetched, report.pages_failed
    );
    println!(
        "Kept {} of {} scanned records ({:.1}% yield)",
        corpus.total_products,
        corpus.total_scanned,
        report.yield_percent()
    );
    println!("Grades: {}", grade_shares(&corpus.grade_distribution));
    let buckets: Vec<String> = SCORE_BUCKETS
        .iter()
        .map(|b| format!("{b}: {}", corpus.score_distribution.get(*b).copied().unwrap_or(0)))
        .collect();
    println!("Scores: {}", buckets.join(", "));
    println!("Corpus written to '{}'", report.output.display());
    Ok(())
}

/// "A:12 (40.0%) B:..." over the kept products.
fn grade_shares(h: &GradeHistogram) -> String {
    let total = h.total().max(1) as f64;
    Grade::ALL
        .iter()
        .map(|g| {
            let n = h.count(*g);
            format!("{}:{} ({:.1}%)", g.as_str().to_ascii_uppercase(), n, n as f64 * 100.0 / total)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_progress(p: &PageProgress) {
    if p.failed {
        println!("Page {:>4}: failed after retries, skipped", p.page);
        return;
    }
    if p.state == HarvestState::PageEmpty {
        println!("Page {:>4}: empty | {:>6}/{}", p.page, p.total, p.target);
        return;
    }
    println!(
        "Page {:>4}: {:>3}/{:<3} valid ({:>5.1}%), +{:<3} | {:>6}/{} | {}",
        p.page,
        p.valid,
        p.attempted,
        p.yield_ratio() * 100.0,
        p.added,
        p.total,
        p.target,
        p.grades,
    );
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training from seed file '{}'", args.seed_file);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!("\nScenario evaluation:");
    println!("{}", report.evaluation);
    println!(
        "Training complete on {} examples. Weights saved to '{}'",
        report.training_examples,
        report.weights_path.display()
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case   = PredictUseCase::new(&args.model_dir)?;
    let signals    = ProductSignals::from(&args);
    let prediction = use_case.predict(&signals)?;

    println!(
        "Predicted eco-score: {:.1} (grade {})",
        prediction.score,
        prediction.grade.as_str().to_ascii_uppercase()
    );
    Ok(())
}
