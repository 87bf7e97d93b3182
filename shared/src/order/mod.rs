//! Order lifecycle
//!
//! - [`cart`]: client-held pending order bound to one restaurant
//! - [`status`]: status enum, transition policy
//! - [`payment`]: payment methods accepted at delivery
//! - [`fee`]: delivery fee and order totals

pub mod cart;
pub mod fee;
pub mod payment;
pub mod status;

// Re-exports
pub use cart::{Cart, CartError, CartItem, CreateOrderRequest, OrderLine};
pub use fee::{DeliveryFeePolicy, OrderTotals};
pub use payment::PaymentMethod;
pub use status::{OrderStatus, StatusPolicy, Transition};
