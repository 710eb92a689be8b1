//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the synthetic trading agents that feed the matching engine. Each agent
// produces an ordered sequence of events per tick and consumes trade notifications to keep its
// own position and PnL.
//
// | Component      | Description                                                       |
// |----------------|-------------------------------------------------------------------|
// | Agent          | Capability trait shared by every strategy                         |
// | MarketMaker    | Quotes a bid/ask pair around a reference price, refreshed on a    |
// |                | fixed interval, skewed against inventory imbalance                |
// | Taker          | Poisson arrival of aggressive orders that consume liquidity       |
// | NoiseTrader    | Poisson arrival of passive limits plus random cancellation        |
// | AgentManager   | Steps agents in a fixed order and fans out trade notifications    |
//
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::SimRng;
use crate::types::{AgentId, Event, OrderId, Price, Qty, Side, Timestamp, Trade};

/// Spacing of the per-agent order-id ranges. Agent `a` allocates ids from
/// `a * ORDER_ID_STRIDE + 1` upward, so ids are unique across agents without
/// coordination and deterministic across runs.
const ORDER_ID_STRIDE: u64 = 1_000_000_000;

/// Conversion factor for inter-arrival gaps: intensities are mean arrivals per
/// millisecond, timestamps are nanoseconds.
const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Capability set shared by every trading strategy.
///
/// The driver calls `step` once per tick in a fixed agent order, submits the
/// concatenated events to the engine, then notifies every agent of every trade.
/// Agents never observe each other's events directly.
pub trait Agent {
    /// Stable identifier carried on every event this agent emits.
    fn id(&self) -> AgentId;

    /// Human-readable strategy name, for logs and reports.
    fn name(&self) -> &str;

    /// Produces this tick's events, in submission order.
    fn step(&mut self, timestamp: Timestamp) -> Vec<Event>;

    /// Observes a trade (its own or anyone else's) and updates position state.
    fn on_trade(&mut self, trade: &Trade);

    /// Mark-to-market profit and loss: realized cash plus inventory valued at the
    /// last observed trade price.
    fn pnl(&self) -> f64;

    /// Net position: positive when long, negative when short.
    fn inventory(&self) -> Qty;

    /// Restores the agent to its initial state, including its RNG stream.
    fn reset(&mut self);
}

/// Position ledger shared by the strategies.
///
/// Convention: a buy fill moves inventory +q and cash -price*q; a sell fill moves
/// inventory -q and cash +price*q. The mark price follows every observed trade.
#[derive(Debug, Clone, Copy, Default)]
struct Blotter {
    inventory: Qty,
    cash: f64,
    mark_price: Price,
}

impl Blotter {
    fn apply_fill(&mut self, side: Side, price: Price, quantity: Qty) {
        let notional = (price * quantity) as f64;
        match side {
            Side::Buy => {
                self.inventory += quantity;
                self.cash -= notional;
            }
            Side::Sell => {
                self.inventory -= quantity;
                self.cash += notional;
            }
        }
    }

    /// Settles the legs of `trade` that belong to this agent (either side, or both
    /// when the agent crossed one of its own resting orders) and refreshes the mark.
    fn settle(&mut self, own_orders: &BTreeMap<OrderId, Side>, trade: &Trade) {
        if let Some(&side) = own_orders.get(&trade.maker_id) {
            self.apply_fill(side, trade.price, trade.quantity);
        }
        if let Some(&side) = own_orders.get(&trade.taker_id) {
            self.apply_fill(side, trade.price, trade.quantity);
        }
        self.mark_price = trade.price;
    }

    fn pnl(&self) -> f64 {
        self.cash + (self.inventory * self.mark_price) as f64
    }
}

//--------------------------------------------------------------------------------------------------
//  MARKET MAKER
//--------------------------------------------------------------------------------------------------

/// Configuration for the market maker strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerConfig {
    /// Bid-ask spread in ticks between the maker's own quotes
    pub spread: Price,
    /// Size of each quote
    pub quantity: Qty,
    /// Nanoseconds between quote refreshes
    pub refresh_interval: Timestamp,
    /// Net position cap; beyond half of it the quotes skew to unwind
    pub max_inventory: Qty,
    /// Mid price used before any trade has printed
    pub reference_price: Price,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread: 2,
            quantity: 50,
            refresh_interval: 50_000,
            max_inventory: 1_000,
            reference_price: 10_000,
        }
    }
}

/// Liquidity provider that keeps a two-sided quote alive.
///
/// On each refresh the previous quote pair is cancelled and a fresh pair is placed
/// around the current mid (last trade, or the configured reference before any trade).
/// When inventory grows past half the cap, the relevant quote shifts toward the mid
/// to encourage unwinding.
pub struct MarketMaker {
    id: AgentId,
    name: String,
    config: MarketMakerConfig,
    blotter: Blotter,
    /// Every order id this agent has ever emitted, for fill attribution
    own_orders: BTreeMap<OrderId, Side>,
    last_refresh: Option<Timestamp>,
    bid_order_id: Option<OrderId>,
    ask_order_id: Option<OrderId>,
    next_order_id: OrderId,
}

impl MarketMaker {
    pub fn new(id: AgentId, name: impl Into<String>, config: MarketMakerConfig) -> Self {
        Self {
            id,
            name: name.into(),
            config,
            blotter: Blotter::default(),
            own_orders: BTreeMap::new(),
            last_refresh: None,
            bid_order_id: None,
            ask_order_id: None,
            next_order_id: id * ORDER_ID_STRIDE + 1,
        }
    }

    fn alloc_order_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    fn mid_price(&self) -> Price {
        if self.blotter.mark_price > 0 {
            self.blotter.mark_price
        } else {
            self.config.reference_price
        }
    }

    /// Current quote pair: symmetric half-spread around the mid, skewed when the
    /// position exceeds half the inventory cap.
    fn quotes(&self) -> (Price, Price) {
        let mid = self.mid_price();
        let half_spread = (self.config.spread / 2).max(1);
        let mut bid = mid - half_spread;
        let mut ask = mid + half_spread;

        if self.blotter.inventory.abs() > self.config.max_inventory / 2 {
            if self.blotter.inventory > 0 {
                // Long: pull the ask toward the mid to encourage selling
                ask -= half_spread / 2;
            } else {
                // Short: push the bid toward the mid to encourage buying
                bid += half_spread / 2;
            }
        }

        (bid.max(1), ask.max(1))
    }
}

impl Agent for MarketMaker {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, timestamp: Timestamp) -> Vec<Event> {
        let due = match self.last_refresh {
            None => true,
            Some(last) => timestamp - last >= self.config.refresh_interval,
        };
        if !due {
            return Vec::new();
        }

        let mut events = Vec::new();

        // Pull the previous quote pair, partially filled or not, before placing the
        // new one. A cancel for an already-consumed id is a silent no-op at the engine.
        if let Some(order_id) = self.bid_order_id.take() {
            events.push(Event::cancel(order_id, timestamp, self.id));
        }
        if let Some(order_id) = self.ask_order_id.take() {
            events.push(Event::cancel(order_id, timestamp, self.id));
        }

        let (bid, ask) = self.quotes();

        let bid_id = self.alloc_order_id();
        events.push(Event::limit(bid_id, Side::Buy, bid, self.config.quantity, timestamp, self.id));
        self.own_orders.insert(bid_id, Side::Buy);
        self.bid_order_id = Some(bid_id);

        let ask_id = self.alloc_order_id();
        events.push(Event::limit(ask_id, Side::Sell, ask, self.config.quantity, timestamp, self.id));
        self.own_orders.insert(ask_id, Side::Sell);
        self.ask_order_id = Some(ask_id);

        self.last_refresh = Some(timestamp);
        debug!(agent = self.id, bid, ask, "maker refreshed quotes");
        events
    }

    fn on_trade(&mut self, trade: &Trade) {
        // The ids of a consumed quote stay tracked: a partial fill leaves a residual
        // resting that the next refresh must still cancel.
        self.blotter.settle(&self.own_orders, trade);
    }

    fn pnl(&self) -> f64 {
        self.blotter.pnl()
    }

    fn inventory(&self) -> Qty {
        self.blotter.inventory
    }

    fn reset(&mut self) {
        self.blotter = Blotter::default();
        self.own_orders.clear();
        self.last_refresh = None;
        self.bid_order_id = None;
        self.ask_order_id = None;
        self.next_order_id = self.id * ORDER_ID_STRIDE + 1;
    }
}

//--------------------------------------------------------------------------------------------------
//  TAKER
//--------------------------------------------------------------------------------------------------

/// Configuration for the liquidity taker strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerConfig {
    /// Mean order arrivals per millisecond
    pub intensity: f64,
    /// Probability of a buy order (0.5 = neutral)
    pub side_bias: f64,
    /// Mean order size
    pub quantity_mean: f64,
    /// Order size standard deviation
    pub quantity_std: f64,
    /// Pure market orders when true, crossing limit orders when false
    pub use_market_orders: bool,
    /// How far a crossing limit reaches through the touch, in ticks
    pub aggression: Price,
    /// Anchor price for crossing limits before any trade has printed
    pub reference_price: Price,
}

impl Default for TakerConfig {
    fn default() -> Self {
        Self {
            intensity: 0.8,
            side_bias: 0.5,
            quantity_mean: 40.0,
            quantity_std: 10.0,
            use_market_orders: true,
            aggression: 2,
            reference_price: 10_000,
        }
    }
}

/// Aggressor that consumes liquidity at exponentially distributed intervals.
pub struct Taker {
    id: AgentId,
    name: String,
    config: TakerConfig,
    seed: u64,
    rng: SimRng,
    blotter: Blotter,
    own_orders: BTreeMap<OrderId, Side>,
    next_order_time: Timestamp,
    next_order_id: OrderId,
}

impl Taker {
    pub fn new(id: AgentId, name: impl Into<String>, config: TakerConfig, seed: u64) -> Self {
        Self {
            id,
            name: name.into(),
            config,
            seed,
            rng: SimRng::new(seed),
            blotter: Blotter::default(),
            own_orders: BTreeMap::new(),
            next_order_time: 0,
            next_order_id: id * ORDER_ID_STRIDE + 1,
        }
    }

    fn alloc_order_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    fn draw_quantity(&mut self) -> Qty {
        let quantity = self.rng.normal(self.config.quantity_mean, self.config.quantity_std);
        (quantity.round() as Qty).max(1)
    }

    fn draw_side(&mut self) -> Side {
        if self.rng.bernoulli(self.config.side_bias) {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    fn schedule_next(&mut self, now: Timestamp) -> Timestamp {
        let gap = self.rng.exponential(self.config.intensity) * NANOS_PER_MILLI;
        now + (gap.round() as Timestamp).max(1)
    }
}

impl Agent for Taker {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, timestamp: Timestamp) -> Vec<Event> {
        if timestamp < self.next_order_time {
            return Vec::new();
        }

        let quantity = self.draw_quantity();
        let side = self.draw_side();
        let order_id = self.alloc_order_id();

        let event = if self.config.use_market_orders {
            Event::market(order_id, side, quantity, timestamp, self.id)
        } else {
            // Crossing limit anchored at the last print, reaching through the touch
            let anchor = if self.blotter.mark_price > 0 {
                self.blotter.mark_price
            } else {
                self.config.reference_price
            };
            let price = match side {
                Side::Buy => anchor + self.config.aggression,
                Side::Sell => (anchor - self.config.aggression).max(1),
            };
            Event::limit(order_id, side, price, quantity, timestamp, self.id)
        };

        self.own_orders.insert(order_id, side);
        self.next_order_time = self.schedule_next(timestamp);
        debug!(agent = self.id, %side, quantity, "taker order");
        vec![event]
    }

    fn on_trade(&mut self, trade: &Trade) {
        self.blotter.settle(&self.own_orders, trade);
    }

    fn pnl(&self) -> f64 {
        self.blotter.pnl()
    }

    fn inventory(&self) -> Qty {
        self.blotter.inventory
    }

    fn reset(&mut self) {
        self.rng.reseed(self.seed);
        self.blotter = Blotter::default();
        self.own_orders.clear();
        self.next_order_time = 0;
        self.next_order_id = self.id * ORDER_ID_STRIDE + 1;
    }
}

//--------------------------------------------------------------------------------------------------
//  NOISE TRADER
//--------------------------------------------------------------------------------------------------

/// Configuration for the noise trader strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseTraderConfig {
    /// Mean limit-order arrivals per millisecond
    pub limit_intensity: f64,
    /// Mean cancel attempts per millisecond
    pub cancel_intensity: f64,
    /// Mean order size
    pub quantity_mean: f64,
    /// Order size standard deviation
    pub quantity_std: f64,
    /// Standard deviation of the limit price offset from the reference, in ticks
    pub price_volatility: f64,
    /// Probability that a due cancel attempt actually pulls an order
    pub cancel_probability: f64,
    /// Anchor price before any trade has printed
    pub reference_price: Price,
}

impl Default for NoiseTraderConfig {
    fn default() -> Self {
        Self {
            limit_intensity: 1.5,
            cancel_intensity: 0.7,
            quantity_mean: 30.0,
            quantity_std: 8.0,
            price_volatility: 5.0,
            cancel_probability: 0.3,
            reference_price: 10_000,
        }
    }
}

/// Background flow: passive limits scattered around the reference price, plus the
/// occasional cancellation of one of its own resting orders.
pub struct NoiseTrader {
    id: AgentId,
    name: String,
    config: NoiseTraderConfig,
    seed: u64,
    rng: SimRng,
    blotter: Blotter,
    own_orders: BTreeMap<OrderId, Side>,
    /// Orders this agent believes still rest; candidates for cancellation. A stale
    /// entry (already filled) just makes the cancel a no-op at the engine.
    live_orders: BTreeSet<OrderId>,
    next_limit_time: Timestamp,
    next_cancel_time: Timestamp,
    next_order_id: OrderId,
}

impl NoiseTrader {
    pub fn new(id: AgentId, name: impl Into<String>, config: NoiseTraderConfig, seed: u64) -> Self {
        Self {
            id,
            name: name.into(),
            config,
            seed,
            rng: SimRng::new(seed),
            blotter: Blotter::default(),
            own_orders: BTreeMap::new(),
            live_orders: BTreeSet::new(),
            next_limit_time: 0,
            next_cancel_time: 0,
            next_order_id: id * ORDER_ID_STRIDE + 1,
        }
    }

    fn alloc_order_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    fn draw_quantity(&mut self) -> Qty {
        let quantity = self.rng.normal(self.config.quantity_mean, self.config.quantity_std);
        (quantity.round() as Qty).max(1)
    }

    fn draw_limit_price(&mut self) -> Price {
        let anchor = if self.blotter.mark_price > 0 {
            self.blotter.mark_price
        } else {
            self.config.reference_price
        };
        let offset = self.rng.normal(0.0, self.config.price_volatility).round() as Price;
        (anchor + offset).max(1)
    }

    fn schedule(&mut self, now: Timestamp, intensity: f64) -> Timestamp {
        let gap = self.rng.exponential(intensity) * NANOS_PER_MILLI;
        now + (gap.round() as Timestamp).max(1)
    }
}

impl Agent for NoiseTrader {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, timestamp: Timestamp) -> Vec<Event> {
        let mut events = Vec::new();

        if timestamp >= self.next_limit_time {
            let quantity = self.draw_quantity();
            let side = if self.rng.bernoulli(0.5) { Side::Buy } else { Side::Sell };
            let price = self.draw_limit_price();
            let order_id = self.alloc_order_id();

            events.push(Event::limit(order_id, side, price, quantity, timestamp, self.id));
            self.own_orders.insert(order_id, side);
            self.live_orders.insert(order_id);
            self.next_limit_time = self.schedule(timestamp, self.config.limit_intensity);
        }

        if timestamp >= self.next_cancel_time {
            if !self.live_orders.is_empty() && self.rng.bernoulli(self.config.cancel_probability) {
                let index = self.rng.uniform_int(0, self.live_orders.len() as i64 - 1) as usize;
                if let Some(order_id) = self.live_orders.iter().nth(index).copied() {
                    events.push(Event::cancel(order_id, timestamp, self.id));
                    self.live_orders.remove(&order_id);
                }
            }
            self.next_cancel_time = self.schedule(timestamp, self.config.cancel_intensity);
        }

        events
    }

    fn on_trade(&mut self, trade: &Trade) {
        self.blotter.settle(&self.own_orders, trade);
    }

    fn pnl(&self) -> f64 {
        self.blotter.pnl()
    }

    fn inventory(&self) -> Qty {
        self.blotter.inventory
    }

    fn reset(&mut self) {
        self.rng.reseed(self.seed);
        self.blotter = Blotter::default();
        self.own_orders.clear();
        self.live_orders.clear();
        self.next_limit_time = 0;
        self.next_cancel_time = 0;
        self.next_order_id = self.id * ORDER_ID_STRIDE + 1;
    }
}

//--------------------------------------------------------------------------------------------------
//  AGENT MANAGER
//--------------------------------------------------------------------------------------------------

/// Per-agent summary used by the data collector and reports.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStats {
    pub id: AgentId,
    pub name: String,
    pub pnl: f64,
    pub inventory: Qty,
}

/// Owns the agent list and coordinates the per-tick protocol: step every agent in
/// insertion order, concatenate their events, fan every trade out to every agent.
#[derive(Default)]
pub struct AgentManager {
    agents: Vec<Box<dyn Agent>>,
}

impl AgentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_agent(&mut self, agent: Box<dyn Agent>) {
        self.agents.push(agent);
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&dyn Agent> {
        self.agents.iter().find(|agent| agent.id() == id).map(|agent| agent.as_ref())
    }

    /// Steps every agent and concatenates the events in agent insertion order.
    pub fn step(&mut self, timestamp: Timestamp) -> Vec<Event> {
        let mut all_events = Vec::new();
        for agent in &mut self.agents {
            all_events.extend(agent.step(timestamp));
        }
        all_events
    }

    /// Notifies every agent of a trade.
    pub fn notify_trade(&mut self, trade: &Trade) {
        for agent in &mut self.agents {
            agent.on_trade(trade);
        }
    }

    pub fn stats(&self) -> Vec<AgentStats> {
        self.agents
            .iter()
            .map(|agent| AgentStats {
                id: agent.id(),
                name: agent.name().to_string(),
                pnl: agent.pnl(),
                inventory: agent.inventory(),
            })
            .collect()
    }

    pub fn reset(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventType;

    fn trade(maker_id: OrderId, taker_id: OrderId, price: Price, quantity: Qty) -> Trade {
        Trade { maker_id, taker_id, price, quantity, timestamp: 1_000 }
    }

    #[test]
    fn test_blotter_buy_then_sell() {
        let mut blotter = Blotter::default();
        let mut own = BTreeMap::new();
        own.insert(1, Side::Buy);
        own.insert(2, Side::Sell);

        blotter.settle(&own, &trade(1, 99, 10_000, 10));
        assert_eq!(blotter.inventory, 10);
        assert_eq!(blotter.pnl(), 0.0); // bought at the mark

        blotter.settle(&own, &trade(2, 98, 10_010, 10));
        assert_eq!(blotter.inventory, 0);
        assert_eq!(blotter.pnl(), 100.0); // 10 ticks on 10 units
    }

    #[test]
    fn test_blotter_ignores_foreign_trades() {
        let mut blotter = Blotter::default();
        let own = BTreeMap::new();
        blotter.settle(&own, &trade(1, 2, 10_000, 10));
        assert_eq!(blotter.inventory, 0);
        assert_eq!(blotter.cash, 0.0);
        // But the mark still follows the tape
        assert_eq!(blotter.mark_price, 10_000);
    }

    #[test]
    fn test_market_maker_places_quote_pair() {
        let mut maker = MarketMaker::new(1, "maker", MarketMakerConfig::default());
        let events = maker.step(0);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventType::Limit);
        assert_eq!(events[0].side, Side::Buy);
        assert_eq!(events[1].side, Side::Sell);
        assert!(events[0].price < events[1].price);
        // Symmetric around the configured reference
        assert_eq!(events[0].price, 9_999);
        assert_eq!(events[1].price, 10_001);
    }

    #[test]
    fn test_market_maker_refresh_cancels_previous_pair() {
        let config = MarketMakerConfig { refresh_interval: 50_000, ..Default::default() };
        let mut maker = MarketMaker::new(1, "maker", config);

        let first = maker.step(0);
        assert_eq!(first.len(), 2);

        // Not yet due
        assert!(maker.step(10_000).is_empty());

        let second = maker.step(50_000);
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].kind, EventType::Cancel);
        assert_eq!(second[0].order_id, first[0].order_id);
        assert_eq!(second[1].kind, EventType::Cancel);
        assert_eq!(second[1].order_id, first[1].order_id);
        assert_eq!(second[2].kind, EventType::Limit);
        assert_eq!(second[3].kind, EventType::Limit);
    }

    #[test]
    fn test_market_maker_refresh_cancels_partially_filled_quote() {
        let mut maker = MarketMaker::new(1, "maker", MarketMakerConfig::default());
        let first = maker.step(0);
        let bid_id = first[0].order_id;
        let ask_id = first[1].order_id;

        // Half of the bid is consumed; its residual still rests in the book
        maker.on_trade(&trade(bid_id, 999, 9_999, 25));
        assert_eq!(maker.inventory(), 25);

        // The next refresh must pull both prior quotes, the partial one included
        let second = maker.step(100_000);
        let cancelled: Vec<OrderId> = second
            .iter()
            .filter(|e| e.kind == EventType::Cancel)
            .map(|e| e.order_id)
            .collect();
        assert_eq!(cancelled, vec![bid_id, ask_id]);
    }

    #[test]
    fn test_market_maker_skews_when_long() {
        let config = MarketMakerConfig { spread: 4, max_inventory: 10, ..Default::default() };
        let mut maker = MarketMaker::new(1, "maker", config);
        let events = maker.step(0);
        let bid_id = events[0].order_id;

        // Fill the bid far past half the cap
        maker.on_trade(&trade(bid_id, 999, 9_998, 8));
        assert_eq!(maker.inventory(), 8);

        let events = maker.step(100_000);
        let quotes: Vec<&Event> =
            events.iter().filter(|e| e.kind == EventType::Limit).collect();
        let bid = quotes[0].price;
        let ask = quotes[1].price;
        // Long position: ask pulled below mid + half_spread
        assert_eq!(bid, 9_998 - 2);
        assert_eq!(ask, 9_998 + 2 - 1);
    }

    #[test]
    fn test_taker_emits_market_orders_on_schedule() {
        let mut taker = Taker::new(2, "taker", TakerConfig::default(), 42);

        let events = taker.step(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventType::Market);
        assert!(events[0].quantity >= 1);
        assert_eq!(events[0].agent_id, 2);

        // The next arrival is strictly in the future
        assert!(taker.step(0).is_empty());
    }

    #[test]
    fn test_taker_limit_mode_crosses_the_anchor() {
        let config = TakerConfig { use_market_orders: false, side_bias: 1.0, ..Default::default() };
        let mut taker = Taker::new(2, "taker", config, 42);

        let events = taker.step(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventType::Limit);
        assert_eq!(events[0].side, Side::Buy);
        assert_eq!(events[0].price, 10_000 + 2);
    }

    #[test]
    fn test_taker_deterministic_given_seed() {
        let mut a = Taker::new(2, "taker", TakerConfig::default(), 42);
        let mut b = Taker::new(2, "taker", TakerConfig::default(), 42);
        for step in 0..200 {
            let ts = step * 100_000;
            assert_eq!(a.step(ts), b.step(ts));
        }
    }

    #[test]
    fn test_noise_trader_places_positive_priced_limits() {
        let mut noise = NoiseTrader::new(3, "noise", NoiseTraderConfig::default(), 7);
        let events = noise.step(0);
        assert!(!events.is_empty());
        for event in &events {
            if event.kind == EventType::Limit {
                assert!(event.price > 0);
                assert!(event.quantity >= 1);
            }
        }
    }

    #[test]
    fn test_noise_trader_cancels_only_its_own_live_orders() {
        let config = NoiseTraderConfig {
            cancel_probability: 1.0,
            cancel_intensity: 1_000.0,
            limit_intensity: 1_000.0,
            ..Default::default()
        };
        let mut noise = NoiseTrader::new(3, "noise", config, 7);

        let mut placed: BTreeSet<OrderId> = BTreeSet::new();
        let mut cancelled: BTreeSet<OrderId> = BTreeSet::new();
        for step in 0..50 {
            for event in noise.step(step * 1_000) {
                match event.kind {
                    EventType::Limit => {
                        placed.insert(event.order_id);
                    }
                    EventType::Cancel => {
                        cancelled.insert(event.order_id);
                    }
                    EventType::Market => panic!("noise trader never sends market orders"),
                }
            }
        }
        assert!(!cancelled.is_empty());
        // Every cancel targets an order the agent itself placed, exactly once
        assert!(cancelled.is_subset(&placed));
    }

    #[test]
    fn test_agent_reset_restores_initial_stream() {
        let mut taker = Taker::new(2, "taker", TakerConfig::default(), 42);
        let first: Vec<Vec<Event>> = (0..20).map(|s| taker.step(s * 1_000_000)).collect();
        taker.reset();
        let second: Vec<Vec<Event>> = (0..20).map(|s| taker.step(s * 1_000_000)).collect();
        assert_eq!(first, second);
        assert_eq!(taker.pnl(), 0.0);
        assert_eq!(taker.inventory(), 0);
    }

    #[test]
    fn test_manager_steps_agents_in_insertion_order() {
        let mut manager = AgentManager::new();
        manager.add_agent(Box::new(MarketMaker::new(1, "maker", MarketMakerConfig::default())));
        manager.add_agent(Box::new(Taker::new(2, "taker", TakerConfig::default(), 42)));
        manager.add_agent(Box::new(NoiseTrader::new(3, "noise", NoiseTraderConfig::default(), 43)));

        let events = manager.step(0);
        assert!(!events.is_empty());
        // Events arrive grouped by agent, in insertion order
        let mut last_agent = 0;
        for event in &events {
            assert!(event.agent_id >= last_agent);
            last_agent = event.agent_id;
        }

        assert_eq!(manager.len(), 3);
        assert!(manager.get_agent(2).is_some());
        assert!(manager.get_agent(9).is_none());

        let stats = manager.stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].name, "maker");
    }

    #[test]
    fn test_manager_fans_out_trades() {
        let mut manager = AgentManager::new();
        manager.add_agent(Box::new(MarketMaker::new(1, "maker", MarketMakerConfig::default())));
        manager.add_agent(Box::new(Taker::new(2, "taker", TakerConfig::default(), 42)));

        let events = manager.step(0);
        let maker_bid = events[0].order_id;

        manager.notify_trade(&trade(maker_bid, 555, 9_999, 10));
        let stats = manager.stats();
        assert_eq!(stats[0].inventory, 10);
        assert_eq!(stats[1].inventory, 0);
    }
}
