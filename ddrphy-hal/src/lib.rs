//! # HAL for DDR PHY training
//!
//! This crate contains the **H**ardware **A**bstraction **L**ayer (HAL) for bringing up DRAM
//! behind a DesignWare-style DDR PHY. It sits on top of the [ddrphy] peripheral access crate.
//!
//! It provides two tightly coupled components:
//!
//! - [timer]: A monotonic, wrap-safe tick source on top of a free-running hardware counter.
//!   Every bounded wait is built on it.
//! - [training]: The PHY training sequencer, which kicks off write leveling, DQS gate training,
//!   bit deskew and eye training and reports the first failing phase.
//!
//! [bringup] and [memtest] contain the board initialization glue around them.
//!
//! Everything runs single-threaded and blocking. No heap allocation is performed.
#![no_std]

pub mod bringup;
pub mod log;
pub mod memtest;
pub mod time;
pub mod timer;
pub mod training;
