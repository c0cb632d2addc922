mod order;
mod order_status;
mod portfolio;
mod quote;
mod side;

pub use order::{Order, OrderId};
pub use order_status::OrderStatus;
pub use portfolio::{PortfolioItem, PortfolioSummary};
pub use quote::BestPrice;
pub use side::Side;
