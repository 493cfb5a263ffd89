use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use matlib::Mwc256;
use stats::{binomial_ci, binomial_tail};

/// Monte-Carlo check of the exact (Clopper-Pearson) binomial interval
#[derive(Debug, Clone, Parser)]
#[command(name = "binom_coverage")]
struct Config {
    /// Number of Bernoulli trials per simulated study
    #[arg(long, default_value_t = 30)]
    trials: u64,

    /// True success probability
    #[arg(long, default_value_t = 0.3)]
    p: f64,

    /// Interval level is 1 - alpha
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Number of simulated studies
    #[arg(long, default_value_t = 10000)]
    sims: usize,

    #[arg(long, default_value_t = Mwc256::DEFAULT_SEED)]
    seed: u32,

    /// Print running coverage every this many studies (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    report_every: usize,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            anyhow::bail!("trials must be greater than 0");
        }
        if !(self.p > 0.0 && self.p < 1.0) {
            anyhow::bail!("p must be in range (0, 1), got {}", self.p);
        }
        if self.alpha <= 0.0 || self.alpha >= 1.0 {
            anyhow::bail!("alpha must be in range (0, 1), got {}", self.alpha);
        }
        if self.sims == 0 {
            anyhow::bail!("sims must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Coverage {
    covered: usize,
    below: usize,
    above: usize,
    sims: usize,
}

impl Coverage {
    fn rate(&self) -> f64 {
        self.covered as f64 / self.sims as f64
    }
}

/// Interval for every possible success count, indexed by the count.
fn interval_table(trials: u64, alpha: f64) -> Result<Vec<(f64, f64)>> {
    (0..=trials)
        .map(|k| Ok(binomial_ci(k, trials, alpha)?))
        .collect()
}

/// Coverage computed from the binomial distribution instead of simulation.
fn exact_coverage(table: &[(f64, f64)], trials: u64, p: f64) -> f64 {
    table
        .iter()
        .enumerate()
        .filter(|(_, (lo, hi))| *lo <= p && p <= *hi)
        .map(|(k, _)| binomial_tail(trials, p, k as u64, k as u64))
        .sum()
}

fn simulate(config: &Config, table: &[(f64, f64)]) -> Coverage {
    let mut rng = Mwc256::with_seed(config.seed);
    let mut cov = Coverage {
        covered: 0,
        below: 0,
        above: 0,
        sims: 0,
    };

    for itry in 1..=config.sims {
        let successes = (0..config.trials).filter(|_| rng.unifrand() < config.p).count();
        let (lo, hi) = table[successes];
        if config.p < lo {
            cov.below += 1;
        } else if config.p > hi {
            cov.above += 1;
        } else {
            cov.covered += 1;
        }
        cov.sims = itry;

        if config.report_every > 0 && itry % config.report_every == 0 {
            println!("{:8}  coverage={:.4}", itry, cov.rate());
        }
    }
    cov
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    config.validate()?;

    println!(
        "\ntrials={}  p={:.3}  alpha={:.3}  sims={}",
        config.trials, config.p, config.alpha, config.sims
    );

    let table = interval_table(config.trials, config.alpha)?;
    for (k, (lo, hi)) in table.iter().enumerate() {
        debug!("{:4} successes: [{:.4}, {:.4}]", k, lo, hi);
    }
    info!("intervals computed for 0..={} successes", config.trials);

    let exact = exact_coverage(&table, config.trials, config.p);
    let cov = simulate(&config, &table);

    println!("\nNominal coverage={:.4}", 1.0 - config.alpha);
    println!("Exact coverage={:.4}", exact);
    println!(
        "Simulated coverage={:.4}  missed below={:.4}  missed above={:.4}",
        cov.rate(),
        cov.below as f64 / cov.sims as f64,
        cov.above as f64 / cov.sims as f64
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            trials: 30,
            p: 0.3,
            alpha: 0.05,
            sims: 10000,
            seed: 20160223,
            report_every: 0,
        }
    }

    #[test]
    fn test_exact_coverage_at_least_nominal() {
        let c = config();
        let table = interval_table(c.trials, c.alpha).unwrap();
        assert_eq!(table.len(), 31);
        assert!(exact_coverage(&table, c.trials, c.p) >= 0.95);
    }

    #[test]
    fn test_simulated_coverage() {
        let c = config();
        let table = interval_table(c.trials, c.alpha).unwrap();
        let cov = simulate(&c, &table);
        assert_eq!(cov.sims, 10000);
        assert_eq!(cov.covered + cov.below + cov.above, cov.sims);
        assert!(cov.rate() >= 0.95, "coverage {}", cov.rate());
    }

    #[test]
    fn test_validate() {
        let mut c = config();
        assert!(c.validate().is_ok());
        c.p = 1.0;
        assert!(c.validate().is_err());
        c.p = 0.3;
        c.trials = 0;
        assert!(c.validate().is_err());
    }
}
