//! Domain model
pub mod order;

pub use order::{
    items_total, parse_price, NewOrder, Order, OrderItem, Payer, PaymentConfirmation,
    PaymentResult, ShippingAddress, CASH_ON_DELIVERY,
};
