pub mod engine;
pub mod message;
pub mod state;

pub use engine::Broker;
pub use message::{Message, UserId};
pub use state::BrokerState;
