#![cfg_attr(not(test), no_std)]

pub mod hspi;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod spi;

pub use spi::{BitOrder, Config, Error, Instance, Spi, FIFO_DEPTH_BYTES, FIFO_DEPTH_WORDS};
