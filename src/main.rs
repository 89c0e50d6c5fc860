use anyhow::Context;
use anyhow::Result;
use mpt_rs::portfolio::Asset;
use mpt_rs::portfolio::CorrelationMatrix;
use mpt_rs::portfolio::PortfolioEngine;
use mpt_rs::portfolio::PortfolioEngineConfig;
use mpt_rs::portfolio::PortfolioInput;
use mpt_rs::portfolio::PortfolioPoint;
use mpt_rs::simulation::AssetSimulationSpec;
use mpt_rs::simulation::SimulationConfig;
use mpt_rs::simulation::simulate_history;
use prettytable::Table;
use prettytable::row;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

fn weights_label(point: &PortfolioPoint) -> String {
  point
    .weights
    .iter()
    .map(|w| format!("{:.1}%", w * 100.0))
    .collect::<Vec<_>>()
    .join(" / ")
}

fn print_analysis(title: &str, input: &PortfolioInput, engine: &PortfolioEngine, seed: u64) -> Result<()> {
  let mut rng = StdRng::seed_from_u64(seed);
  let analysis = engine
    .analyze(input, &mut rng)
    .with_context(|| format!("analysis of {title} failed"))?;

  let names: Vec<&str> = input.assets.iter().map(|a| a.name.as_str()).collect();
  println!("\n{title} ({})", names.join(" / "));

  let mut table = Table::new();
  table.add_row(row!["Portfolio", "Weights", "Return", "Risk", "Sharpe"]);
  let mut push = |label: &str, p: &PortfolioPoint| {
    let sharpe = p
      .sharpe_ratio
      .map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
    table.add_row(row![
      label,
      weights_label(p),
      format!("{:.2}%", p.expected_return * 100.0),
      format!("{:.2}%", p.risk * 100.0),
      sharpe
    ]);
  };
  if let Some(current) = &analysis.current {
    push("Current", current);
  }
  push("Minimum risk", analysis.minimum());
  push("Tangency", &analysis.tangency);
  table.printstd();

  println!(
    "CML: E[R] = {:.2}% + {:.3} x risk, {} frontier points",
    analysis.cml.risk_free * 100.0,
    analysis.cml.slope,
    analysis.frontier.points().len()
  );
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let engine = PortfolioEngine::new(PortfolioEngineConfig::default());

  let assets = vec![
    Asset::with_std_dev("Stock A", 0.10, 0.15),
    Asset::with_std_dev("Stock B", 0.14, 0.25),
    Asset::with_std_dev("Stock C", 0.07, 0.10),
  ];
  let mut corr = CorrelationMatrix::identity(3);
  corr.set(0, 1, 0.3)?;
  corr.set(0, 2, 0.2)?;
  corr.set(1, 2, 0.1)?;
  let manual = PortfolioInput::manual(assets, corr).with_weights(vec![0.4, 0.3, 0.3]);
  print_analysis("Manual inputs", &manual, &engine, 42)?;

  let specs = vec![
    AssetSimulationSpec::new("Utility".to_string(), 60.0, 0.06, 0.12, true, 0.04),
    AssetSimulationSpec::new("Tech".to_string(), 150.0, 0.15, 0.30, false, 0.0),
    AssetSimulationSpec::new("Bank".to_string(), 45.0, 0.09, 0.20, true, 0.03),
  ];
  let sim = SimulationConfig::default();
  let mut rng = StdRng::seed_from_u64(7);
  let histories = simulate_history(&specs, &sim, &mut rng).context("price simulation failed")?;
  let historical = PortfolioInput::from_history(&histories, sim.frequency)?;
  print_analysis(
    &format!("Simulated {} years, {}", sim.years, sim.frequency),
    &historical,
    &engine,
    7,
  )?;

  Ok(())
}
