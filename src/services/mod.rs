pub mod credential_store;
pub mod metadata_client;
