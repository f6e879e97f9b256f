pub mod build;
pub mod common;
pub mod resolve;
pub mod rules;
pub mod serve;

#[cfg(test)]
mod common_tests;
