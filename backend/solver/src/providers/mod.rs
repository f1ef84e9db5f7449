pub mod gateway;
pub mod mock;

pub use gateway::AiGatewayProvider;
pub use mock::MockProvider;
