//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types used throughout the simulator: orders, trades, the
// event record agents submit to the engine, and the market-data snapshot records the engine
// produces.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ALIASES            | Integer aliases for prices, quantities, ids, time.               |
// | ENUMS              | Discrete value sets (Side, EventType).                           |
// | STRUCTS            | Order, Trade, Event, PriceLevel, MarketSnapshot.                 |
// | TESTS              | Unit tests for the defined types.                                |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Price in integer ticks. All tradable prices are strictly positive; zero is the
/// "absent" sentinel in snapshot records.
pub type Price = i64;

/// Quantity in integer units. Strictly positive on admission; decreases on partial fills.
pub type Qty = i64;

/// Unique order identifier. Never reused while the order rests.
pub type OrderId = u64;

/// Identifier of the agent that produced an event. Opaque to the engine.
pub type AgentId = u64;

/// Logical simulation time in nanoseconds.
pub type Timestamp = i64;

//--------------------------------------------------------------------------------------------------
//  ENUMS
//--------------------------------------------------------------------------------------------------

/// Represents the side of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order, resting on the bid side.
    Buy,
    /// A sell order, resting on the ask side.
    Sell,
}

impl Side {
    /// Returns the side an aggressor on `self` matches against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// The kind of instruction an event carries into the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Place a limit order; rests unless it crosses the opposite top-of-book.
    Limit,
    /// Execute immediately against the opposite side; never rests.
    Market,
    /// Remove a resting order; price and quantity fields are ignored.
    Cancel,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Limit => write!(f, "LIMIT"),
            EventType::Market => write!(f, "MARKET"),
            EventType::Cancel => write!(f, "CANCEL"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------

/// A resting limit order. Immutable after admission except for `quantity`, which holds the
/// unfilled residual while the order sits in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier, assigned by the submitting agent.
    pub id: OrderId,
    /// Side of the order.
    pub side: Side,
    /// Limit price in ticks. Strictly positive for admitted orders.
    pub price: Price,
    /// Residual quantity. Strictly positive while resting.
    pub quantity: Qty,
    /// Logical arrival time of the order.
    pub timestamp: Timestamp,
}

impl Order {
    pub fn new(id: OrderId, side: Side, price: Price, quantity: Qty, timestamp: Timestamp) -> Self {
        Self { id, side, price, quantity, timestamp }
    }

    /// True when price and quantity are both admissible.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.price > 0 && self.quantity > 0
    }
}

/// A completed match between a resting maker order and an aggressing taker.
///
/// The price is always the maker's resting price; the timestamp is the aggressor
/// event's timestamp. Trades are append-only records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the resting order that provided liquidity.
    pub maker_id: OrderId,
    /// Id of the aggressing order/event that removed liquidity.
    pub taker_id: OrderId,
    /// Execution price: the maker's resting price.
    pub price: Price,
    /// Matched quantity.
    pub quantity: Qty,
    /// Timestamp of the aggressor event.
    pub timestamp: Timestamp,
}

/// The record agents submit to the matching engine.
///
/// `price` is ignored for `Market` and `Cancel` events; `quantity` is ignored for
/// `Cancel`. `agent_id` is carried through untouched for attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventType,
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
    pub timestamp: Timestamp,
    pub agent_id: AgentId,
}

impl Event {
    /// Builds a limit-order event.
    pub fn limit(
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Qty,
        timestamp: Timestamp,
        agent_id: AgentId,
    ) -> Self {
        Self { kind: EventType::Limit, order_id, side, price, quantity, timestamp, agent_id }
    }

    /// Builds a market-order event. The price field is zeroed; the engine ignores it.
    pub fn market(
        order_id: OrderId,
        side: Side,
        quantity: Qty,
        timestamp: Timestamp,
        agent_id: AgentId,
    ) -> Self {
        Self { kind: EventType::Market, order_id, side, price: 0, quantity, timestamp, agent_id }
    }

    /// Builds a cancel event. Only `order_id` matters; the book's own index is authoritative
    /// for the order's side and price.
    pub fn cancel(order_id: OrderId, timestamp: Timestamp, agent_id: AgentId) -> Self {
        Self {
            kind: EventType::Cancel,
            order_id,
            side: Side::Buy,
            price: 0,
            quantity: 0,
            timestamp,
            agent_id,
        }
    }
}

/// One row of a depth snapshot. The side the row does not describe carries quantity 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub bid_quantity: Qty,
    pub ask_quantity: Qty,
}

impl PriceLevel {
    pub fn new(price: Price, bid_quantity: Qty, ask_quantity: Qty) -> Self {
        Self { price, bid_quantity, ask_quantity }
    }
}

/// Top-of-book snapshot. Absent sides are represented by 0 in both price and quantity;
/// `last_trade_price` is 0 before any trade has printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub best_bid: Price,
    pub best_ask: Price,
    pub best_bid_qty: Qty,
    pub best_ask_qty: Qty,
    pub last_trade_price: Price,
    pub timestamp: Timestamp,
}

impl MarketSnapshot {
    /// Midpoint of the top of book, when both sides are present.
    #[inline]
    pub fn mid_price(&self) -> Option<Price> {
        if self.best_bid > 0 && self.best_ask > 0 {
            Some((self.best_bid + self.best_ask) / 2)
        } else {
            None
        }
    }

    /// Bid-ask spread in ticks, when both sides are present.
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        if self.best_bid > 0 && self.best_ask > 0 {
            Some(self.best_ask - self.best_bid)
        } else {
            None
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
