pub mod collection_handler;
