pub mod client;
pub mod query;
#[cfg(test)]
pub mod stub;
