pub mod quantity;
pub mod rpc;
