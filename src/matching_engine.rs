//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the core matching engine logic for processing events and generating
// trades. The engine routes limit/market/cancel events into the order book, executes
// marketable-limit crossings, and fans results out to optional observer callbacks.
//
// | Component        | Description                                                   |
// |------------------|---------------------------------------------------------------|
// | MatchingEngine   | Event dispatcher owning the order book and the trade tape     |
// | TradeObserver    | Optional callback fired once per emitted trade                |
// | OrderObserver    | Optional callback fired once per accepted limit order         |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                    | Description                                       | Return Type      |
// |-------------------------|---------------------------------------------------|------------------|
// | process_event           | Dispatch one event by type                        | Vec<Trade>       |
// | process_events          | Dispatch a batch, concatenating outputs           | Vec<Trade>       |
// | get_market_snapshot     | Pass-through to the book's top of book            | MarketSnapshot   |
// | clear                   | Reset book and trade tape to the initial state    | ()               |
//--------------------------------------------------------------------------------------------------

use tracing::{debug, trace};

use crate::orderbook::OrderBook;
use crate::types::{Event, EventType, MarketSnapshot, Order, Price, PriceLevel, Qty, Side, Timestamp, Trade};

/// Callback invoked synchronously for every emitted trade, in emission order.
pub type TradeObserver = Box<dyn FnMut(&Trade)>;

/// Callback invoked synchronously for every accepted limit order, before its trades.
pub type OrderObserver = Box<dyn FnMut(&Order)>;

/// The matching engine: accepts a sequence of events and dispatches them into the book.
///
/// A limit event is checked for marketability against the opposite top-of-book *before*
/// admission: a crossing order matches first, bounded by its own limit price, and only
/// the unfilled residual is admitted to rest. The book therefore never shows a crossed
/// top and an order can never trade against itself.
#[derive(Default)]
pub struct MatchingEngine {
    book: OrderBook,
    /// Append-only tape of every trade emitted since the last clear
    trades: Vec<Trade>,
    trade_observer: Option<TradeObserver>,
    order_observer: Option<OrderObserver>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a single event and returns the trades it produced, in execution order.
    ///
    /// Malformed limits (non-positive price or quantity, duplicate id), markets against
    /// an empty opposite side, cancels of unknown ids, and any other degenerate input
    /// produce zero trades and leave the book unchanged. Nothing here is fatal; the
    /// engine is always ready for the next event.
    pub fn process_event(&mut self, event: &Event) -> Vec<Trade> {
        trace!(kind = %event.kind, id = event.order_id, agent = event.agent_id, "process event");
        match event.kind {
            EventType::Limit => self.process_limit_order(event),
            EventType::Market => self.process_market_order(event),
            EventType::Cancel => self.process_cancel_order(event),
        }
    }

    /// Processes events in the supplied order, returning the flat concatenation of the
    /// per-event trade outputs.
    pub fn process_events(&mut self, events: &[Event]) -> Vec<Trade> {
        let mut all_trades = Vec::new();
        for event in events {
            all_trades.extend(self.process_event(event));
        }
        all_trades
    }

    fn process_limit_order(&mut self, event: &Event) -> Vec<Trade> {
        if event.price <= 0 || event.quantity <= 0 || self.book.contains_order(event.order_id) {
            debug!(id = event.order_id, price = event.price, qty = event.quantity, "limit rejected");
            return Vec::new();
        }

        let order = Order::new(event.order_id, event.side, event.price, event.quantity, event.timestamp);
        self.notify_order(&order);

        // Marketability check against the opposite top-of-book, before admission
        let marketable = match event.side {
            Side::Buy => self.book.best_ask_price().is_some_and(|ask| event.price >= ask),
            Side::Sell => self.book.best_bid_price().is_some_and(|bid| event.price <= bid),
        };

        let trades = if marketable {
            self.book.match_against(
                event.side,
                event.quantity,
                Some(event.price),
                event.order_id,
                event.timestamp,
            )
        } else {
            Vec::new()
        };

        // Only the unfilled residual rests
        let filled: Qty = trades.iter().map(|t| t.quantity).sum();
        let residual = event.quantity - filled;
        if residual > 0 {
            let resting = Order::new(event.order_id, event.side, event.price, residual, event.timestamp);
            self.book.add_limit_order(resting);
        }

        self.record_trades(trades)
    }

    fn process_market_order(&mut self, event: &Event) -> Vec<Trade> {
        let trades =
            self.book.add_market_order(event.side, event.quantity, event.order_id, event.timestamp);
        self.record_trades(trades)
    }

    fn process_cancel_order(&mut self, event: &Event) -> Vec<Trade> {
        // Unknown ids are a silent no-op; the by_id index is authoritative
        self.book.cancel_order(event.order_id);
        Vec::new()
    }

    /// Appends trades to the tape and fires the trade observer in emission order.
    fn record_trades(&mut self, trades: Vec<Trade>) -> Vec<Trade> {
        for trade in &trades {
            if let Some(observer) = self.trade_observer.as_mut() {
                observer(trade);
            }
        }
        self.trades.extend_from_slice(&trades);
        trades
    }

    fn notify_order(&mut self, order: &Order) {
        if let Some(observer) = self.order_observer.as_mut() {
            observer(order);
        }
    }

    /// Installs a callback fired once per emitted trade. Intended for telemetry;
    /// the callback must not retain references beyond the call.
    pub fn set_trade_observer(&mut self, observer: TradeObserver) {
        self.trade_observer = Some(observer);
    }

    /// Installs a callback fired once per accepted limit order, before its trades.
    pub fn set_order_observer(&mut self, observer: OrderObserver) {
        self.order_observer = Some(observer);
    }

    /// Current top-of-book snapshot stamped with the given timestamp.
    pub fn get_market_snapshot(&self, timestamp: Timestamp) -> MarketSnapshot {
        self.book.top_of_book(timestamp)
    }

    /// Up to `levels` rows per side, bids first. See [`OrderBook::get_depth`].
    pub fn get_depth(&self, levels: usize) -> Vec<PriceLevel> {
        self.book.get_depth(levels)
    }

    /// Number of orders currently resting in the book.
    pub fn order_count(&self) -> usize {
        self.book.size()
    }

    pub fn last_trade_price(&self) -> Price {
        self.book.last_trade_price()
    }

    pub fn total_volume(&self) -> Qty {
        self.book.total_volume()
    }

    pub fn trade_count(&self) -> usize {
        self.book.trade_count()
    }

    /// Every trade emitted since the last `clear`, in emission order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Read access to the underlying book, for inspection and tests.
    pub fn order_book(&self) -> &OrderBook {
        &self.book
    }

    /// Resets the book and the trade tape to the initial empty state. Observers stay
    /// installed.
    pub fn clear(&mut self) {
        self.book.clear();
        self.trades.clear();
    }
}
