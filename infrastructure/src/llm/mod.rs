//! Model gateway adapters.

mod replay_gateway;

pub use replay_gateway::{ReplayError, ReplayGateway, ReplayScript, ReplayTurn};
