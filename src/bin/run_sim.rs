//--------------------------------------------------------------------------------------------------
// SIMULATION DRIVER
//--------------------------------------------------------------------------------------------------
// Command-line entry point: configures and runs a simulation with the three canonical agents,
// logs a summary, and optionally dumps the collected market data as CSV.
//--------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use marketsim::agents::{MarketMakerConfig, NoiseTraderConfig, TakerConfig};
use marketsim::simulator::{analysis, SimulationConfig, Simulator, SimulatorError};

/// Command line arguments for the simulation driver
#[derive(Parser, Debug)]
#[command(author, version, about = "Single-instrument market simulator")]
struct Args {
    /// Number of simulation steps to run
    #[arg(short = 'n', long, default_value = "100000")]
    steps: usize,

    /// Random seed for the run
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Logical tick length in nanoseconds
    #[arg(long, default_value = "1000")]
    time_step: i64,

    /// Record a market snapshot every N steps
    #[arg(long, default_value = "100")]
    snapshot_interval: usize,

    /// Record agent PnL every N steps
    #[arg(long, default_value = "1000")]
    pnl_interval: usize,

    /// Directory to write trades.csv / market_snapshots.csv / agent_pnl.csv into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Market maker quote spread in ticks
    #[arg(long, default_value = "2")]
    maker_spread: i64,

    /// Market maker quote size
    #[arg(long, default_value = "50")]
    maker_quantity: i64,

    /// Taker order arrival intensity (orders per millisecond)
    #[arg(long, default_value = "0.8")]
    taker_intensity: f64,

    /// Noise trader limit-order arrival intensity (orders per millisecond)
    #[arg(long, default_value = "1.5")]
    noise_intensity: f64,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn main() -> Result<(), SimulatorError> {
    let args = Args::parse();
    init_tracing(args.log_level);

    let config = SimulationConfig {
        seed: args.seed,
        start_time: 0,
        time_step: args.time_step,
        snapshot_interval: args.snapshot_interval,
        pnl_interval: args.pnl_interval,
        output_dir: args.output_dir.clone(),
    };

    let maker_config = MarketMakerConfig {
        spread: args.maker_spread,
        quantity: args.maker_quantity,
        ..Default::default()
    };
    let taker_config = TakerConfig { intensity: args.taker_intensity, ..Default::default() };
    let noise_config =
        NoiseTraderConfig { limit_intensity: args.noise_intensity, ..Default::default() };

    let mut simulator = Simulator::new(config);
    let result = simulator.run(args.steps, maker_config, taker_config, noise_config)?;

    let stats = simulator.stats();
    info!(
        events = stats.events_processed,
        trades = stats.trade_count,
        volume = stats.total_volume,
        last_price = stats.last_trade_price,
        resting_orders = stats.order_count,
        "run complete"
    );

    let spread = analysis::spread_stats(&result.snapshots);
    info!(
        vwap = analysis::vwap(&result.trades),
        twap = analysis::twap(&result.snapshots),
        volatility = analysis::realized_volatility(&result.snapshots),
        mean_spread = spread.mean,
        max_spread = spread.max,
        "market quality"
    );

    for perf in analysis::agent_performance(&result.agent_pnl, &result.trades) {
        info!(
            agent = perf.agent_id,
            pnl = perf.total_pnl,
            sharpe = perf.sharpe_ratio,
            max_drawdown = perf.max_drawdown,
            trades = perf.trade_count,
            "agent performance"
        );
    }

    info!(
        elapsed_seconds = result.elapsed_seconds,
        events_per_second = if result.elapsed_seconds > 0.0 {
            result.events_processed as f64 / result.elapsed_seconds
        } else {
            0.0
        },
        "throughput"
    );

    Ok(())
}
