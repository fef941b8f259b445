pub mod collection_service;
pub mod sampler;
pub mod transfer;
