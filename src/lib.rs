// Expose the modules
pub mod types;
pub mod orderbook;
pub mod matching_engine;
pub mod rng;
pub mod agents;
pub mod simulator;

// Re-export key types for easier usage
pub use types::{Event, EventType, MarketSnapshot, Order, OrderId, Price, PriceLevel, Qty, Side, Timestamp, Trade};
pub use orderbook::{OrderBook, PriceLevelQueue};
pub use matching_engine::MatchingEngine;
pub use rng::SimRng;
pub use agents::{Agent, AgentManager, MarketMaker, MarketMakerConfig, NoiseTrader, NoiseTraderConfig, Taker, TakerConfig};
pub use simulator::{MarketDataCollector, RunResult, SimulationConfig, Simulator, SimulatorError};
