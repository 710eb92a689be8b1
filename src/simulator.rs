//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the simulation driver: a fixed-step loop that pulls events from the
// agents, feeds them to the matching engine, fans trades back out, and samples market data.
//
// | Component            | Description                                                   |
// |----------------------|---------------------------------------------------------------|
// | SimulationConfig     | Seed, time grid, sampling intervals, output location          |
// | MarketDataCollector  | Accumulates trades, snapshots, agent PnL; dumps CSV           |
// | Simulator            | The fixed-step orchestrator                                   |
// | analysis             | VWAP / TWAP / volatility / spread / per-agent performance     |
//--------------------------------------------------------------------------------------------------

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::agents::{
    Agent, AgentManager, MarketMaker, MarketMakerConfig, NoiseTrader, NoiseTraderConfig, Taker,
    TakerConfig,
};
use crate::matching_engine::MatchingEngine;
use crate::types::{AgentId, MarketSnapshot, Price, Qty, Timestamp, Trade};

/// Errors surfaced by the simulation driver. The engine core itself never fails;
/// only writing results out can.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("failed to write simulation output to {}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Master random seed; per-agent streams are derived from it
    pub seed: u64,
    /// Logical start time in nanoseconds
    pub start_time: Timestamp,
    /// Logical tick length in nanoseconds
    pub time_step: Timestamp,
    /// Record a market snapshot every this many steps
    pub snapshot_interval: usize,
    /// Record agent PnL every this many steps
    pub pnl_interval: usize,
    /// Directory for CSV dumps; `None` disables them
    pub output_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_time: 0,
            time_step: 1_000,
            snapshot_interval: 100,
            pnl_interval: 1_000,
            output_dir: None,
        }
    }
}

/// One sampled PnL observation for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlRecord {
    pub agent_id: AgentId,
    pub timestamp: Timestamp,
    pub pnl: f64,
    pub inventory: Qty,
}

/// Accumulates the observable output of a run: the trade tape, sampled snapshots,
/// and sampled per-agent PnL rows.
#[derive(Debug, Clone, Default)]
pub struct MarketDataCollector {
    trades: Vec<Trade>,
    snapshots: Vec<MarketSnapshot>,
    agent_pnl: Vec<PnlRecord>,
}

impl MarketDataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn record_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn record_agent_pnl(&mut self, record: PnlRecord) {
        self.agent_pnl.push(record);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn snapshots(&self) -> &[MarketSnapshot] {
        &self.snapshots
    }

    pub fn agent_pnl(&self) -> &[PnlRecord] {
        &self.agent_pnl
    }

    pub fn clear(&mut self) {
        self.trades.clear();
        self.snapshots.clear();
        self.agent_pnl.clear();
    }

    /// Writes `trades.csv`, `market_snapshots.csv`, and `agent_pnl.csv` into `dir`,
    /// creating the directory if needed.
    pub fn save_to_csv(&self, dir: &Path) -> Result<(), SimulatorError> {
        fs::create_dir_all(dir)
            .map_err(|source| SimulatorError::OutputIo { path: dir.to_path_buf(), source })?;

        write_csv(
            &dir.join("trades.csv"),
            "timestamp,maker_id,taker_id,price,quantity",
            self.trades.iter().map(|t| {
                format!("{},{},{},{},{}", t.timestamp, t.maker_id, t.taker_id, t.price, t.quantity)
            }),
        )?;

        write_csv(
            &dir.join("market_snapshots.csv"),
            "timestamp,best_bid,best_ask,best_bid_qty,best_ask_qty,last_trade_price",
            self.snapshots.iter().map(|s| {
                format!(
                    "{},{},{},{},{},{}",
                    s.timestamp, s.best_bid, s.best_ask, s.best_bid_qty, s.best_ask_qty, s.last_trade_price
                )
            }),
        )?;

        write_csv(
            &dir.join("agent_pnl.csv"),
            "timestamp,agent_id,pnl,inventory",
            self.agent_pnl
                .iter()
                .map(|r| format!("{},{},{},{}", r.timestamp, r.agent_id, r.pnl, r.inventory)),
        )?;

        Ok(())
    }
}

fn write_csv(
    path: &Path,
    header: &str,
    rows: impl Iterator<Item = String>,
) -> Result<(), SimulatorError> {
    let render = move || -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{header}")?;
        for row in rows {
            writeln!(out, "{row}")?;
        }
        out.flush()
    };
    render().map_err(|source| SimulatorError::OutputIo { path: path.to_path_buf(), source })
}

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub trades: Vec<Trade>,
    pub snapshots: Vec<MarketSnapshot>,
    pub agent_pnl: Vec<PnlRecord>,
    pub events_processed: usize,
    pub trade_count: usize,
    /// Simulated time covered by the run, in nanoseconds
    pub simulated_duration: Timestamp,
    /// Wall-clock time the run took, for throughput reporting only
    pub elapsed_seconds: f64,
}

/// Point-in-time summary of a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub events_processed: usize,
    pub trade_count: usize,
    pub order_count: usize,
    pub total_volume: Qty,
    pub last_trade_price: Price,
    pub average_spread: f64,
    pub price_volatility: f64,
    pub simulated_duration: Timestamp,
    pub events_per_second: f64,
}

/// The fixed-step simulation orchestrator.
///
/// Each tick: step every agent in a fixed order, submit the concatenated events to
/// the engine in that order, notify every agent of every trade, then sample market
/// data on the configured intervals. Given a fixed config the whole run is
/// bit-exact reproducible.
pub struct Simulator {
    config: SimulationConfig,
    engine: MatchingEngine,
    agents: AgentManager,
    collector: MarketDataCollector,
    current_time: Timestamp,
    current_step: usize,
    events_processed: usize,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        let current_time = config.start_time;
        Self {
            config,
            engine: MatchingEngine::new(),
            agents: AgentManager::new(),
            collector: MarketDataCollector::new(),
            current_time,
            current_step: 0,
            events_processed: 0,
        }
    }

    /// Runs a simulation with the three canonical agents.
    pub fn run(
        &mut self,
        n_steps: usize,
        maker_config: MarketMakerConfig,
        taker_config: TakerConfig,
        noise_config: NoiseTraderConfig,
    ) -> Result<RunResult, SimulatorError> {
        let seed = self.config.seed;
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(MarketMaker::new(1, "MarketMaker", maker_config)),
            Box::new(Taker::new(2, "Taker", taker_config, seed + 2)),
            Box::new(NoiseTrader::new(3, "NoiseTrader", noise_config, seed + 3)),
        ];
        self.run_with_agents(n_steps, agents)
    }

    /// Runs a simulation with a caller-supplied agent list. Agents are stepped in
    /// the order given.
    pub fn run_with_agents(
        &mut self,
        n_steps: usize,
        agents: Vec<Box<dyn Agent>>,
    ) -> Result<RunResult, SimulatorError> {
        self.reset();
        let mut manager = AgentManager::new();
        for agent in agents {
            manager.add_agent(agent);
        }
        self.agents = manager;

        info!(n_steps, seed = self.config.seed, agents = self.agents.len(), "starting simulation");
        let started = Instant::now();

        for _ in 0..n_steps {
            self.process_step();
            self.current_time += self.config.time_step;
            self.current_step += 1;
        }

        let elapsed_seconds = started.elapsed().as_secs_f64();

        // Final samples so the tail of the run is visible in the output
        self.collect_market_data();
        self.collect_agent_data();

        let result = RunResult {
            trades: self.collector.trades().to_vec(),
            snapshots: self.collector.snapshots().to_vec(),
            agent_pnl: self.collector.agent_pnl().to_vec(),
            events_processed: self.events_processed,
            trade_count: self.engine.trade_count(),
            simulated_duration: self.current_time - self.config.start_time,
            elapsed_seconds,
        };

        if let Some(dir) = self.config.output_dir.clone() {
            self.collector.save_to_csv(&dir)?;
            info!(dir = %dir.display(), "simulation output written");
        }

        info!(
            trades = result.trade_count,
            events = result.events_processed,
            elapsed_seconds = result.elapsed_seconds,
            "simulation finished"
        );
        Ok(result)
    }

    fn process_step(&mut self) {
        let events = self.agents.step(self.current_time);
        let trades = self.engine.process_events(&events);
        self.events_processed += events.len();

        for trade in &trades {
            self.agents.notify_trade(trade);
            self.collector.record_trade(*trade);
        }

        if self.current_step % self.config.snapshot_interval == 0 {
            self.collect_market_data();
        }
        if self.current_step % self.config.pnl_interval == 0 {
            self.collect_agent_data();
        }
    }

    fn collect_market_data(&mut self) {
        let snapshot = self.engine.get_market_snapshot(self.current_time);
        self.collector.record_snapshot(snapshot);
    }

    fn collect_agent_data(&mut self) {
        let timestamp = self.current_time;
        for stat in self.agents.stats() {
            self.collector.record_agent_pnl(PnlRecord {
                agent_id: stat.id,
                timestamp,
                pnl: stat.pnl,
                inventory: stat.inventory,
            });
        }
    }

    /// Summary statistics of the current state.
    pub fn stats(&self) -> SimulationStats {
        let simulated_duration = self.current_time - self.config.start_time;
        let seconds = simulated_duration as f64 / 1e9;
        SimulationStats {
            events_processed: self.events_processed,
            trade_count: self.engine.trade_count(),
            order_count: self.engine.order_count(),
            total_volume: self.engine.total_volume(),
            last_trade_price: self.engine.last_trade_price(),
            average_spread: analysis::spread_stats(self.collector.snapshots()).mean,
            price_volatility: analysis::realized_volatility(self.collector.snapshots()),
            simulated_duration,
            events_per_second: if seconds > 0.0 {
                self.events_processed as f64 / seconds
            } else {
                0.0
            },
        }
    }

    /// Restores the initial state: empty book and tape, reset agents and collector,
    /// time back at the start.
    pub fn reset(&mut self) {
        self.engine.clear();
        self.agents.reset();
        self.collector.clear();
        self.current_time = self.config.start_time;
        self.current_step = 0;
        self.events_processed = 0;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn collector(&self) -> &MarketDataCollector {
        &self.collector
    }
}

/// Post-run analysis helpers over the trade tape and the sampled snapshots.
pub mod analysis {
    use serde::Serialize;

    use crate::simulator::PnlRecord;
    use crate::types::{AgentId, MarketSnapshot, Trade};

    /// Volume-weighted average price of the tape. 0.0 when empty.
    pub fn vwap(trades: &[Trade]) -> f64 {
        let mut notional = 0.0;
        let mut volume: i64 = 0;
        for trade in trades {
            notional += (trade.price * trade.quantity) as f64;
            volume += trade.quantity;
        }
        if volume > 0 {
            notional / volume as f64
        } else {
            0.0
        }
    }

    /// Time-weighted average mid price over snapshots where both sides were present.
    /// 0.0 when no snapshot qualifies.
    pub fn twap(snapshots: &[MarketSnapshot]) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for snapshot in snapshots {
            if let Some(mid) = snapshot.mid_price() {
                total += mid as f64;
                count += 1;
            }
        }
        if count > 0 {
            total / count as f64
        } else {
            0.0
        }
    }

    /// Standard deviation of log returns of the mid price across snapshots.
    pub fn realized_volatility(snapshots: &[MarketSnapshot]) -> f64 {
        let mids: Vec<f64> = snapshots
            .iter()
            .filter_map(|s| s.mid_price())
            .map(|mid| mid as f64)
            .collect();
        if mids.len() < 2 {
            return 0.0;
        }

        let returns: Vec<f64> = mids.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / returns.len() as f64;
        variance.sqrt()
    }

    /// Distribution summary of the bid-ask spread across snapshots.
    #[derive(Debug, Clone, Copy, Default, Serialize)]
    pub struct SpreadStats {
        pub mean: f64,
        pub median: f64,
        pub min: f64,
        pub max: f64,
        pub std_dev: f64,
    }

    pub fn spread_stats(snapshots: &[MarketSnapshot]) -> SpreadStats {
        let mut spreads: Vec<f64> =
            snapshots.iter().filter_map(|s| s.spread()).map(|spread| spread as f64).collect();
        if spreads.is_empty() {
            return SpreadStats::default();
        }
        spreads.sort_by(|a, b| a.total_cmp(b));

        let mean = spreads.iter().sum::<f64>() / spreads.len() as f64;
        let variance =
            spreads.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / spreads.len() as f64;

        SpreadStats {
            mean,
            median: spreads[spreads.len() / 2],
            min: spreads[0],
            max: spreads[spreads.len() - 1],
            std_dev: variance.sqrt(),
        }
    }

    /// Per-agent performance summary derived from the sampled PnL path and the tape.
    #[derive(Debug, Clone, Serialize)]
    pub struct AgentPerformance {
        pub agent_id: AgentId,
        pub total_pnl: f64,
        /// Mean PnL increment over its standard deviation; 0.0 when undefined
        pub sharpe_ratio: f64,
        pub max_drawdown: f64,
        /// Number of trades the agent participated in, either side
        pub trade_count: usize,
    }

    pub fn agent_performance(pnl_rows: &[PnlRecord], trades: &[Trade]) -> Vec<AgentPerformance> {
        use std::collections::BTreeMap;

        let mut histories: BTreeMap<AgentId, Vec<f64>> = BTreeMap::new();
        for row in pnl_rows {
            histories.entry(row.agent_id).or_default().push(row.pnl);
        }

        histories
            .into_iter()
            .map(|(agent_id, history)| {
                let total_pnl = history.last().copied().unwrap_or(0.0);

                let sharpe_ratio = if history.len() > 1 {
                    let increments: Vec<f64> = history.windows(2).map(|w| w[1] - w[0]).collect();
                    let mean = increments.iter().sum::<f64>() / increments.len() as f64;
                    let variance = increments.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>()
                        / increments.len() as f64;
                    if variance > 0.0 {
                        mean / variance.sqrt()
                    } else {
                        0.0
                    }
                } else {
                    0.0
                };

                let mut peak = f64::NEG_INFINITY;
                let mut max_drawdown: f64 = 0.0;
                for &pnl in &history {
                    peak = peak.max(pnl);
                    max_drawdown = max_drawdown.max(peak - pnl);
                }

                let trade_count = trades
                    .iter()
                    .filter(|t| owner_of(t.maker_id) == agent_id || owner_of(t.taker_id) == agent_id)
                    .count();

                AgentPerformance { agent_id, total_pnl, sharpe_ratio, max_drawdown, trade_count }
            })
            .collect()
    }

    /// Recovers the emitting agent from an order id under the stride allocation
    /// scheme used by the built-in agents.
    fn owner_of(order_id: u64) -> AgentId {
        order_id / 1_000_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(bid: Price, ask: Price, last: Price) -> MarketSnapshot {
        MarketSnapshot {
            best_bid: bid,
            best_ask: ask,
            best_bid_qty: if bid > 0 { 10 } else { 0 },
            best_ask_qty: if ask > 0 { 10 } else { 0 },
            last_trade_price: last,
            timestamp: 0,
        }
    }

    #[test]
    fn test_vwap_weighting() {
        let trades = vec![
            Trade { maker_id: 1, taker_id: 2, price: 100, quantity: 10, timestamp: 0 },
            Trade { maker_id: 3, taker_id: 4, price: 200, quantity: 30, timestamp: 1 },
        ];
        // (100*10 + 200*30) / 40 = 175
        assert_eq!(analysis::vwap(&trades), 175.0);
        assert_eq!(analysis::vwap(&[]), 0.0);
    }

    #[test]
    fn test_twap_skips_one_sided_books() {
        let snapshots = vec![
            snapshot(10_000, 10_002, 0),
            snapshot(0, 10_002, 0), // no bid: excluded
            snapshot(10_002, 10_004, 0),
        ];
        assert_eq!(analysis::twap(&snapshots), 10_002.0);
        assert_eq!(analysis::twap(&[]), 0.0);
    }

    #[test]
    fn test_spread_stats() {
        let snapshots = vec![
            snapshot(10_000, 10_002, 0), // 2
            snapshot(10_000, 10_004, 0), // 4
            snapshot(10_000, 10_006, 0), // 6
        ];
        let stats = analysis::spread_stats(&snapshots);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 6.0);
        assert!(stats.std_dev > 0.0);

        let empty = analysis::spread_stats(&[]);
        assert_eq!(empty.mean, 0.0);
    }

    #[test]
    fn test_realized_volatility_flat_tape_is_zero() {
        let flat = vec![snapshot(10_000, 10_002, 0); 10];
        assert_eq!(analysis::realized_volatility(&flat), 0.0);

        let moving = vec![
            snapshot(10_000, 10_002, 0),
            snapshot(10_010, 10_012, 0),
            snapshot(9_990, 9_992, 0),
        ];
        assert!(analysis::realized_volatility(&moving) > 0.0);
    }

    #[test]
    fn test_agent_performance_drawdown_and_attribution() {
        let rows = vec![
            PnlRecord { agent_id: 1, timestamp: 0, pnl: 0.0, inventory: 0 },
            PnlRecord { agent_id: 1, timestamp: 1, pnl: 50.0, inventory: 5 },
            PnlRecord { agent_id: 1, timestamp: 2, pnl: 20.0, inventory: 5 },
            PnlRecord { agent_id: 2, timestamp: 0, pnl: 0.0, inventory: 0 },
            PnlRecord { agent_id: 2, timestamp: 2, pnl: -10.0, inventory: -3 },
        ];
        let trades = vec![
            // maker owned by agent 1, taker owned by agent 2 under the stride scheme
            Trade {
                maker_id: 1_000_000_001,
                taker_id: 2_000_000_001,
                price: 10_000,
                quantity: 5,
                timestamp: 1,
            },
        ];

        let perf = analysis::agent_performance(&rows, &trades);
        assert_eq!(perf.len(), 2);
        assert_eq!(perf[0].agent_id, 1);
        assert_eq!(perf[0].total_pnl, 20.0);
        assert_eq!(perf[0].max_drawdown, 30.0);
        assert_eq!(perf[0].trade_count, 1);
        assert_eq!(perf[1].agent_id, 2);
        assert_eq!(perf[1].trade_count, 1);
    }

    #[test]
    fn test_collector_accumulates_and_clears() {
        let mut collector = MarketDataCollector::new();
        collector.record_trade(Trade { maker_id: 1, taker_id: 2, price: 100, quantity: 5, timestamp: 0 });
        collector.record_snapshot(snapshot(10_000, 10_002, 100));
        collector.record_agent_pnl(PnlRecord { agent_id: 1, timestamp: 0, pnl: 1.0, inventory: 2 });

        assert_eq!(collector.trades().len(), 1);
        assert_eq!(collector.snapshots().len(), 1);
        assert_eq!(collector.agent_pnl().len(), 1);

        collector.clear();
        assert!(collector.trades().is_empty());
        assert!(collector.snapshots().is_empty());
        assert!(collector.agent_pnl().is_empty());
    }

    #[test]
    fn test_simulator_run_produces_trades_and_samples() {
        let config = SimulationConfig { seed: 42, ..Default::default() };
        let mut simulator = Simulator::new(config);

        let result = match simulator.run(
            2_000,
            MarketMakerConfig::default(),
            TakerConfig::default(),
            NoiseTraderConfig::default(),
        ) {
            Ok(result) => result,
            Err(e) => panic!("simulation failed: {e}"),
        };

        assert!(result.events_processed > 0);
        assert!(!result.snapshots.is_empty());
        assert!(!result.agent_pnl.is_empty());
        assert_eq!(result.simulated_duration, 2_000 * 1_000);
        assert_eq!(result.trades.len(), result.trade_count);

        let stats = simulator.stats();
        assert_eq!(stats.events_processed, result.events_processed);
        assert_eq!(stats.trade_count, result.trade_count);
    }

    #[test]
    fn test_simulator_is_deterministic_for_a_seed() {
        let run = |seed: u64| {
            let config = SimulationConfig { seed, ..Default::default() };
            let mut simulator = Simulator::new(config);
            match simulator.run(
                1_000,
                MarketMakerConfig::default(),
                TakerConfig::default(),
                NoiseTraderConfig::default(),
            ) {
                Ok(result) => result,
                Err(e) => panic!("simulation failed: {e}"),
            }
        };

        let first = run(7);
        let second = run(7);
        assert_eq!(first.trades, second.trades);
        assert_eq!(first.snapshots, second.snapshots);
        assert_eq!(first.events_processed, second.events_processed);
    }

    #[test]
    fn test_simulator_reset_clears_state() {
        let mut simulator = Simulator::new(SimulationConfig::default());
        let _ = simulator
            .run(500, MarketMakerConfig::default(), TakerConfig::default(), NoiseTraderConfig::default());

        simulator.reset();
        assert_eq!(simulator.engine().order_count(), 0);
        assert_eq!(simulator.engine().trade_count(), 0);
        assert!(simulator.collector().trades().is_empty());
        let stats = simulator.stats();
        assert_eq!(stats.events_processed, 0);
        assert_eq!(stats.simulated_duration, 0);
    }

    #[test]
    fn test_save_to_csv_writes_all_files() {
        let mut collector = MarketDataCollector::new();
        collector.record_trade(Trade { maker_id: 1, taker_id: 2, price: 100, quantity: 5, timestamp: 3 });
        collector.record_snapshot(snapshot(10_000, 10_002, 100));
        collector.record_agent_pnl(PnlRecord { agent_id: 1, timestamp: 3, pnl: 1.5, inventory: 2 });

        let dir = std::env::temp_dir().join(format!("marketsim-test-{}", std::process::id()));
        match collector.save_to_csv(&dir) {
            Ok(()) => {}
            Err(e) => panic!("csv dump failed: {e}"),
        }

        let trades = match fs::read_to_string(dir.join("trades.csv")) {
            Ok(contents) => contents,
            Err(e) => panic!("missing trades.csv: {e}"),
        };
        assert!(trades.starts_with("timestamp,maker_id,taker_id,price,quantity"));
        assert!(trades.contains("3,1,2,100,5"));
        assert!(dir.join("market_snapshots.csv").exists());
        assert!(dir.join("agent_pnl.csv").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_run_with_custom_agents() {
        let mut simulator = Simulator::new(SimulationConfig::default());
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(MarketMaker::new(5, "solo-maker", MarketMakerConfig::default())),
            Box::new(Taker::new(6, "solo-taker", TakerConfig { side_bias: 1.0, ..Default::default() }, 11)),
        ];
        let result = match simulator.run_with_agents(1_000, agents) {
            Ok(result) => result,
            Err(e) => panic!("simulation failed: {e}"),
        };
        assert!(result.events_processed > 0);
        for trade in &result.trades {
            // Only the two custom agents ever traded
            let maker_agent = trade.maker_id / 1_000_000_000;
            assert!(maker_agent == 5 || maker_agent == 6, "unexpected maker {}", trade.maker_id);
        }
    }
}
