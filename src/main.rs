use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::runtime::Builder;
use tracing::Level;

use dv_simulator::algorithms::all_pairs_shortest_costs;
use dv_simulator::driver::{self, DriverExit};
use dv_simulator::simulator::{RunSummary, Snapshot};
use dv_simulator::{Position, Simulator, SimulatorConfig};

#[derive(Parser)]
#[command(name = "dv_simulator", about = "Run a Distance-Vector routing simulation to convergence")]
struct Cli {
    /// Link as `A-B:weight`; routers are created in order of first mention
    #[arg(long = "link", required = true, num_args = 1..)]
    links: Vec<String>,

    /// JSON simulator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the per-tick transmission speed
    #[arg(long)]
    speed: Option<f64>,

    /// Drive ticks from a timer instead of a tight loop
    #[arg(long)]
    realtime: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, PartialEq)]
struct LinkArg {
    a: String,
    b: String,
    weight: f64,
}

fn parse_link_arg(arg: &str) -> Result<LinkArg> {
    let (ends, weight) = arg
        .split_once(':')
        .with_context(|| format!("link `{}` is missing `:weight`", arg))?;
    let (a, b) = ends
        .split_once('-')
        .with_context(|| format!("link `{}` must look like A-B:weight", arg))?;
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        bail!("link `{}` has an empty router name", arg);
    }
    if a == b {
        bail!("link `{}` connects a router to itself", arg);
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("invalid weight in link `{}`", arg))?;
    Ok(LinkArg {
        a: a.to_string(),
        b: b.to_string(),
        weight,
    })
}

/// Positions on a circle so that every router is easy to click.
fn layout(count: usize) -> Vec<Position> {
    let center = Position::new(720.0, 360.0);
    let radius = 300.0;
    (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count.max(1) as f64;
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

fn build(sim: &mut Simulator, links: &[LinkArg]) -> Result<()> {
    let mut names: Vec<&str> = Vec::new();
    for link in links {
        for name in [link.a.as_str(), link.b.as_str()] {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let positions = layout(names.len());
    for (name, position) in names.iter().zip(&positions) {
        sim.request_add_router(*name);
        sim.click(Some(*position));
    }

    let position_of = |name: &str| -> Result<Position> {
        let index = names
            .iter()
            .position(|n| *n == name)
            .with_context(|| format!("unknown router {}", name))?;
        Ok(positions[index])
    };

    for link in links {
        sim.request_edit_link();
        sim.click(Some(position_of(&link.a)?));
        sim.click(Some(position_of(&link.b)?));
        let added = sim
            .submit_link_weight(link.weight)
            .with_context(|| format!("failed to add link {}-{}", link.a, link.b))?;
        if !added {
            bail!("link {}-{} was not added", link.a, link.b);
        }
    }
    Ok(())
}

fn run_realtime(sim: Simulator) -> Result<(Simulator, RunSummary)> {
    let rt = Builder::new_current_thread().enable_all().build()?;
    let period = sim.config().tick_interval();
    let shared = sim.into_shared();

    let exit = rt.block_on(async {
        let driver = driver::spawn_run(shared.clone(), period).await;
        driver.join().await
    });

    let sim = std::sync::Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("simulator still shared after the run"))?
        .into_inner();
    match exit {
        DriverExit::Converged(summary) => Ok((sim, summary)),
        other => bail!("run stopped before converging: {:?}", other),
    }
}

#[derive(Serialize)]
struct Report {
    summary: RunSummary,
    snapshot: Snapshot,
    distance_vectors: BTreeMap<String, BTreeMap<String, f64>>,
}

fn report(sim: &Simulator, summary: RunSummary) -> Report {
    let topology = sim.topology();
    let name = |id| {
        topology
            .router(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let distance_vectors = topology
        .routers()
        .iter()
        .map(|r| {
            let vector = r.distance_vector().iter().map(|(&d, &c)| (name(d), c)).collect();
            (r.name.clone(), vector)
        })
        .collect();

    Report {
        summary,
        snapshot: sim.snapshot(),
        distance_vectors,
    }
}

fn print_table(sim: &Simulator, summary: RunSummary) {
    let topology = sim.topology();
    let reference = all_pairs_shortest_costs(topology);

    println!(
        "Converged after {} rounds ({} ticks)\n",
        summary.rounds, summary.ticks
    );
    println!("{:<10} {:<12} {:<10} {:<10}", "Router", "Destination", "Cost", "Shortest");
    println!("{}", "-".repeat(45));

    for router in topology.routers() {
        if router.distance_vector().is_empty() {
            println!("{:<10} {:<12}", router.name, "(none)");
        }
        for (&dest, &cost) in router.distance_vector() {
            let dest_name = topology.router(dest).map(|r| r.name.as_str()).unwrap_or("?");
            let shortest = reference
                .get(&router.id)
                .and_then(|costs| costs.get(&dest))
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{:<10} {:<12} {:<10} {:<10}", router.name, dest_name, cost, shortest);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.transmission_speed = speed;
    }
    config.validate()?;

    let links = cli
        .links
        .iter()
        .map(|arg| parse_link_arg(arg))
        .collect::<Result<Vec<_>>>()?;

    let mut sim = Simulator::new(config);
    build(&mut sim, &links)?;

    let (sim, summary) = if cli.realtime {
        run_realtime(sim)?
    } else {
        let summary = sim.run_to_convergence()?;
        (sim, summary)
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report(&sim, summary))?);
    } else {
        print_table(&sim, summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_link_args() {
        assert_eq!(
            parse_link_arg("A-B:4").unwrap(),
            LinkArg { a: "A".into(), b: "B".into(), weight: 4.0 }
        );
        assert_eq!(parse_link_arg(" AA - C : 2.5 ").unwrap().weight, 2.5);
        assert!(parse_link_arg("A-B").is_err());
        assert!(parse_link_arg("AB:3").is_err());
        assert!(parse_link_arg("A-A:3").is_err());
        assert!(parse_link_arg("A-B:heavy").is_err());
    }

    #[test]
    fn builds_and_converges_triangle() {
        let links: Vec<_> = ["A-B:4", "B-C:1", "A-C:10"]
            .iter()
            .map(|s| parse_link_arg(s).unwrap())
            .collect();
        let mut sim = Simulator::default();
        build(&mut sim, &links).unwrap();
        assert_eq!(sim.topology().router_count(), 3);
        assert_eq!(sim.topology().links().len(), 3);

        let summary = sim.run_to_convergence().unwrap();
        let report = report(&sim, summary);
        assert_eq!(report.distance_vectors["A"]["C"], 5.0);
        assert_eq!(report.distance_vectors["C"]["A"], 5.0);
    }
}
