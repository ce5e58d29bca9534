//! # Free-running tick counter module.
//!
//! Generic 32-bit counter which is clocked from a board-specific reference clock through an
//! 8-bit prescaler. Once enabled, it counts continuously and wraps around.

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum Direction {
    Up = 0,
    Down = 1,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct TickCtrl {
    /// Counter clock is divided by this value plus one.
    #[bits(8..=15, rw)]
    prescaler: u8,
    #[bit(2, rw)]
    direction: Direction,
    /// Loads the counter with the value of the load register. Self-clearing.
    #[bit(1, rw)]
    reset: bool,
    #[bit(0, rw)]
    enable: bool,
}

/// Tick counter register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct TickCounter {
    ctrl: TickCtrl,
    /// Value loaded into the counter on reset.
    load: u32,
    #[mmio(PureRead)]
    count: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<TickCounter>(), 0x0C);
