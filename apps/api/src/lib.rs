pub mod config;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod similarity;
pub mod state;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_support;
