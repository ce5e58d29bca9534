//! # Rust peripheral access crate for DDR PHY utility blocks
//!
//! This crate contains the bit-exact register definitions for a DesignWare-style DDR PHY
//! utility block (PUB) and for a generic 32-bit free-running tick counter, which is the time
//! base used while the PHY is trained.
//!
//! The base addresses of both blocks are SoC specific, so this crate does not provide fixed
//! instances. Use the `new_mmio_at` constructors generated by [derive_mmio] with the addresses
//! supplied by the board configuration.
#![no_std]

pub mod phy;
pub mod tick;

pub use phy::{DdrPhy, MmioDdrPhy};
pub use tick::{MmioTickCounter, TickCounter};
