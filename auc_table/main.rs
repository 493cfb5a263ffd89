use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use matlib::Mwc256;
use roc::{auc_with_ci, PredictorSet};
use sepsis_eval::{
    baseline_predictions, read_cohort, render_operating_stats, write_json, write_report,
    AnalysisConfig, AucTable, Cohort, LogisticModel, OperatingStats,
};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "auc_table")]
#[command(about = "AUROC comparison of mortality predictors in a sepsis cohort")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write the full results as JSON
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// Also write the printed tables to this file
    #[arg(long, global = true)]
    report: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse a cohort file with settings given as flags
    Run(AnalysisConfig),
    /// Analyse with settings loaded from a TOML file
    Config {
        #[arg(value_name = "CONFIG_FILE")]
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct Results<'a> {
    config: &'a AnalysisConfig,
    n_subjects: usize,
    n_deaths: usize,
    table: &'a AucTable,
    operating_points: Vec<(String, OperatingStats)>,
}

fn predictor_names(config: &AnalysisConfig, cohort: &Cohort) -> Vec<String> {
    if !config.predictors.is_empty() {
        return config.predictors.clone();
    }
    cohort
        .columns
        .names()
        .iter()
        .filter(|n| !config.baseline_covariates.contains(*n))
        .cloned()
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.command {
        Command::Run(config) => config.clone(),
        Command::Config { file } => AnalysisConfig::from_file(file)
            .with_context(|| format!("reading config {}", file.display()))?,
    };
    config.validate()?;

    println!("AUROC - mortality prediction\n");

    let cohort = read_cohort(
        &config.data_file,
        &config.outcome,
        &config.columns(),
        config.id_column.as_deref(),
    )
    .with_context(|| format!("loading cohort {}", config.data_file))?;

    let n_deaths = cohort.n_positive();
    println!(
        "Subjects: {}  deaths: {} ({:.1}%)",
        cohort.len(),
        n_deaths,
        100.0 * n_deaths as f64 / cohort.len() as f64
    );

    let names = predictor_names(&config, &cohort);
    if names.is_empty() {
        anyhow::bail!("no predictor columns in {}", config.data_file);
    }

    let predictors: PredictorSet = if config.baseline_covariates.is_empty() {
        cohort.columns.select(&names)?
    } else {
        info!(
            "fitting baseline model on {} plus each predictor",
            config.baseline_covariates.join(", ")
        );
        baseline_predictions(
            &cohort.columns,
            &names,
            &config.baseline_covariates,
            &cohort.labels,
            &LogisticModel::default(),
        )?
    };
    if predictors.is_empty() {
        anyhow::bail!("no predictor could be scored");
    }

    let mut report = String::new();

    let mut rng = Mwc256::with_seed(config.seed);
    let table = AucTable::compute(&predictors, &cohort.labels, config.n_boot, config.alpha, &mut rng)?;
    let rendered = table.render();
    println!("\n{}", rendered);
    report.push_str(&rendered);

    match auc_with_ci(&predictors.as_predictors(), &cohort.labels, config.alpha) {
        Ok(intervals) => {
            let level = 100.0 * (1.0 - config.alpha);
            println!("DeLong {:.0}% intervals", level);
            for (name, iv) in predictors.names().iter().zip(intervals.into_vec()) {
                let line = format!(
                    "{:<8}\t{:.3} [{:.3}, {:.3}]  se={:.4}",
                    name, iv.auc, iv.ci.0, iv.ci.1, iv.std_error
                );
                println!("{}", line);
                report.push('\n');
                report.push_str(&line);
            }
            report.push('\n');
        }
        Err(e) => warn!("DeLong intervals unavailable: {}", e),
    }

    let mut operating_points = Vec::new();
    if let Some(threshold) = config.threshold {
        for (name, scores) in predictors.iter() {
            let stats = OperatingStats::from_scores(scores, &cohort.labels, threshold)?;
            operating_points.push((name.to_string(), stats));
        }
        let names: Vec<&str> = operating_points.iter().map(|(n, _)| n.as_str()).collect();
        let stats: Vec<OperatingStats> = operating_points.iter().map(|(_, s)| *s).collect();
        let rendered = render_operating_stats(&names, &stats);
        println!("\nOperating point: score >= {}\n{}", threshold, rendered);
        report.push('\n');
        report.push_str(&rendered);
    }

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
        info!("tables written to {}", path.display());
    }

    if let Some(path) = &cli.json {
        let results = Results {
            config: &config,
            n_subjects: cohort.len(),
            n_deaths,
            table: &table,
            operating_points,
        };
        write_json(path, &results)?;
        info!("results written to {}", path.display());
    }

    Ok(())
}
