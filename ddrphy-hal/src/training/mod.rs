//! # DDR PHY training module
//!
//! Drives the PHY through its DRAM training handshake: write leveling, DQS gate training,
//! bit deskew and eye training.
//!
//! The PHY sequences the individual training steps internally. Software computes the union of
//! the initiate bits of all phases, writes it to the PIR register in one go and then polls the
//! PGSR0 status register until all done bits are set or the timeout expires. Afterwards, the
//! error bit of every phase is checked in table order.
//!
//! Usage for every active rank:
//!
//!  1. [prepare_training] selects the rank as write leveling and data training target.
//!  2. [run_training] kicks off the training and waits for completion.
//!
//! [crate::bringup::train_ranks] wraps this sequence.
use ddrphy::phy::{
    PGSR0_DIDONE, PGSR0_DIERR, PGSR0_IDONE, PGSR0_QSGDONE, PGSR0_QSGERR, PGSR0_RDDONE,
    PGSR0_RDERR, PGSR0_REDONE, PGSR0_REERR, PGSR0_WDDONE, PGSR0_WDERR, PGSR0_WEDONE,
    PGSR0_WEERR, PGSR0_WLADONE, PGSR0_WLAERR, PGSR0_WLDONE, PGSR0_WLERR, PIR_DRAMINIT,
    PIR_DRAMRST, PIR_INIT, PIR_QSGATE, PIR_RDDSKW, PIR_RDEYE, PIR_WL, PIR_WLADJ, PIR_WRDSKW,
    PIR_WREYE, Pgsr0,
};

use crate::{
    time::Microseconds,
    timer::{FreeRunningCounter, Timer},
};

pub mod ll;

pub use ll::{DdrPhy, InvalidLaneCount, PhyRegisters, Rank, rank_select};

/// One step of the PHY training pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPhase {
    pub name: &'static str,
    /// PIR bits which kick off this phase.
    pub init_mask: u32,
    /// PGSR0 bits which signal completion.
    pub done_mask: u32,
    /// PGSR0 bits which signal failure.
    pub err_mask: u32,
}

impl TrainingPhase {
    pub const fn new(name: &'static str, init_mask: u32, done_mask: u32, err_mask: u32) -> Self {
        Self {
            name,
            init_mask,
            done_mask,
            err_mask,
        }
    }
}

/// The training phases in hardware dependency order.
///
/// The order is significant: errors are reported for the first failing phase in this order.
pub const INIT_SEQUENCE: [TrainingPhase; 8] = [
    TrainingPhase::new(
        "DRAM Reset",
        PIR_DRAMRST | PIR_DRAMINIT,
        PGSR0_DIDONE,
        PGSR0_DIERR,
    ),
    TrainingPhase::new("Write Leveling", PIR_WL, PGSR0_WLDONE, PGSR0_WLERR),
    TrainingPhase::new(
        "Read DQS Gate Training",
        PIR_QSGATE,
        PGSR0_QSGDONE,
        PGSR0_QSGERR,
    ),
    TrainingPhase::new(
        "Write Leveling Adjustment",
        PIR_WLADJ,
        PGSR0_WLADONE,
        PGSR0_WLAERR,
    ),
    TrainingPhase::new("Read Bit Deskew", PIR_RDDSKW, PGSR0_RDDONE, PGSR0_RDERR),
    TrainingPhase::new("Write Bit Deskew", PIR_WRDSKW, PGSR0_WDDONE, PGSR0_WDERR),
    TrainingPhase::new("Read Eye Training", PIR_RDEYE, PGSR0_REDONE, PGSR0_REERR),
    TrainingPhase::new("Write Eye Training", PIR_WREYE, PGSR0_WEDONE, PGSR0_WEERR),
];

/// Union of the initiate and done masks of a phase table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeMasks {
    /// Value written to PIR. Always contains [PIR_INIT].
    pub init: u32,
    /// PGSR0 bits which must all be set. Always contains [PGSR0_IDONE].
    pub done: u32,
}

pub const fn cumulative_masks(phases: &[TrainingPhase]) -> CumulativeMasks {
    let mut init = PIR_INIT;
    let mut done = PGSR0_IDONE;
    let mut i = 0;
    while i < phases.len() {
        init |= phases[i].init_mask;
        done |= phases[i].done_mask;
        i += 1;
    }
    CumulativeMasks { init, done }
}

/// First phase in table order whose error bits are set in the given PGSR0 value.
pub fn first_failed_phase(phases: &[TrainingPhase], status: u32) -> Option<&TrainingPhase> {
    phases.iter().find(|phase| status & phase.err_mask != 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Wall-clock budget for the whole training pipeline.
    pub timeout: Microseconds,
    /// Delay between two status register reads.
    pub poll_interval: Microseconds,
}

impl TrainingConfig {
    /// 50 ms timeout, status polled every microsecond.
    pub const DEFAULT: Self = Self::new(
        Microseconds::from_ticks(50_000),
        Microseconds::from_ticks(1),
    );

    pub const fn new(timeout: Microseconds, poll_interval: Microseconds) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrainingError {
    #[error("timeout during DDR training, PGSR0: {last_status:#010x}")]
    Timeout { last_status: u32 },
    #[error("{phase} failed, PGSR0: {status:#010x}")]
    PhaseFailed { phase: &'static str, status: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VtControlError {
    #[error("timeout waiting for VT compensation to stop")]
    Timeout,
}

/// Select the rank which is write leveled and used for data training.
///
/// The write leveling rank enable field of every active byte lane and the rank fields of the
/// data training configuration register are set for `rank` only. All other bits keep their
/// value, so calling this repeatedly with the same rank yields the same register state.
/// This does not start training.
pub fn prepare_training(phy: &mut impl PhyRegisters, rank: Rank) {
    let select = rank_select(rank);
    for lane in 0..phy.byte_lanes() {
        phy.modify_dx_gcr(lane, |mut val| {
            val.set_wl_rank_enable(select);
            val
        });
    }
    phy.modify_dtcr(|mut val| {
        // Rank used during data bit deskew and eye centering.
        val.set_training_rank(rank);
        // DQS gate training uses the multi-purpose register of the DRAM.
        val.set_use_mpr(true);
        val.set_rank_enable(select);
        val
    });
}

/// Run the full [INIT_SEQUENCE] training pipeline.
///
/// The rank must have been configured with [prepare_training] before. Failure means that no
/// usable DRAM is available.
pub fn run_training<C: FreeRunningCounter>(
    phy: &mut impl PhyRegisters,
    timer: &mut Timer<C>,
    config: &TrainingConfig,
) -> Result<(), TrainingError> {
    run_training_sequence(phy, timer, &INIT_SEQUENCE, config)
}

/// Run the training pipeline described by an arbitrary ordered phase table.
pub fn run_training_sequence<C: FreeRunningCounter>(
    phy: &mut impl PhyRegisters,
    timer: &mut Timer<C>,
    phases: &[TrainingPhase],
    config: &TrainingConfig,
) -> Result<(), TrainingError> {
    let masks = cumulative_masks(phases);
    log::debug!(
        "DDR PHY training, PIR: {:#010x}, done mask: {:#010x}",
        masks.init,
        masks.done
    );
    phy.write_pir(masks.init);

    let budget = timer.us_to_ticks(config.timeout.ticks());
    let start = timer.get_ticks();
    let status = loop {
        timer.udelay(config.poll_interval.ticks());
        let status = phy.read_pgsr0().raw_value();
        if status & masks.done == masks.done {
            break status;
        }
        if timer.get_timer(start) >= budget {
            log::error!("timeout during DDR training, PGSR0: {:#010x}", status);
            return Err(TrainingError::Timeout {
                last_status: status,
            });
        }
    };

    if let Some(phase) = first_failed_phase(phases, status) {
        log::error!(
            "{} failed, data training error status: {}",
            phase.name,
            Pgsr0::new_with_raw_value(status).data_training_error().value()
        );
        return Err(TrainingError::PhaseFailed {
            phase: phase.name,
            status,
        });
    }
    let elapsed = timer.get_timer(start);
    log::debug!(
        "DDR PHY training done after {} us",
        timer.ticks_to_us(elapsed)
    );
    Ok(())
}

/// Enable or inhibit VT drift compensation of the PHY delay lines.
///
/// Delay line values can only be changed safely while the compensation is inhibited. When
/// inhibiting, this waits until the PHY reports that the compensation has stopped.
pub fn set_vt_compensation<C: FreeRunningCounter>(
    phy: &mut impl PhyRegisters,
    timer: &mut Timer<C>,
    enable: bool,
    timeout: Microseconds,
) -> Result<(), VtControlError> {
    phy.modify_pgcr1(|mut val| {
        val.set_inhibit_vt(!enable);
        val
    });
    if enable {
        return Ok(());
    }
    let budget = timer.us_to_ticks(timeout.ticks());
    let start = timer.get_ticks();
    while !phy.read_pgsr1().vt_stop() {
        if timer.get_timer(start) >= budget {
            log::error!("timeout waiting for VT compensation to stop");
            return Err(VtControlError::Timeout);
        }
        core::hint::spin_loop();
    }
    Ok(())
}
