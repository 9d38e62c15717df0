#![no_std]

mod constants;
mod contract;
mod errors;
mod events;
mod helpers;
mod risk;
mod storage;

pub use contract::{LendingPool, LendingPoolClient, RateSource};
pub use errors::Error;
pub use risk::PriceFeed;
pub use storage::{AccountSnapshot, BorrowSnapshot, Market};
