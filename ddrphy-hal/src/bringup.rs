//! # DRAM bring-up
//!
//! Board initialization entry point for the PHY training. Each active rank is selected with
//! [prepare_training] and then trained with [run_training].
//!
//! A training failure means there is no usable DRAM. The caller decides whether to halt, to
//! retry with a different timing parameter set or to keep running from on-chip SRAM.
use crate::{
    timer::{FreeRunningCounter, Timer},
    training::{PhyRegisters, Rank, TrainingConfig, TrainingError, prepare_training, run_training},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("DRAM training of rank {} failed", .rank.value())]
pub struct BringUpError {
    pub rank: Rank,
    #[source]
    pub source: TrainingError,
}

/// Train all given ranks, in order.
///
/// Stops at the first rank which fails to train. No retries are performed.
pub fn train_ranks<C: FreeRunningCounter>(
    phy: &mut impl PhyRegisters,
    timer: &mut Timer<C>,
    ranks: &[Rank],
    config: &TrainingConfig,
) -> Result<(), BringUpError> {
    if ranks.is_empty() {
        log::warn!("no DRAM rank selected for training");
    }
    for &rank in ranks {
        prepare_training(phy, rank);
        run_training(phy, timer, config).map_err(|source| BringUpError { rank, source })?;
        log::info!("DRAM rank {} trained", rank.value());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        timer::tests::{ONE_MHZ, SteppingCounter},
        training::tests::MockPhy,
    };
    use arbitrary_int::{u2, u4};
    use ddrphy::phy::{PGSR0_DIDONE, PGSR0_IDONE, PGSR0_WLERR};

    const ALL_DONE: u32 = 0x0000_0FF1;

    fn timer() -> Timer<SteppingCounter> {
        let mut timer = Timer::new(SteppingCounter::new(0, 1), ONE_MHZ);
        timer.timer_init().unwrap();
        timer
    }

    #[test]
    fn test_two_ranks() {
        let mut phy = MockPhy::new(ALL_DONE);
        let mut timer = timer();
        let ranks = [u2::new(0), u2::new(1)];
        assert_eq!(
            train_ranks(&mut phy, &mut timer, &ranks, &TrainingConfig::DEFAULT),
            Ok(())
        );
        assert_eq!(phy.pir_writes, 2);
        // Each kickoff happens with its own rank selected.
        assert_eq!(
            phy.kickoff_ranks,
            [Some(u4::new(0b0001)), Some(u4::new(0b0010)), None, None]
        );
        // The last prepared rank stays selected.
        assert_eq!(phy.dtcr.rank_enable(), u4::new(0b0010));
    }

    #[test]
    fn test_failure_reports_rank() {
        let status = ALL_DONE | PGSR0_WLERR;
        let mut phy = MockPhy::new(status);
        let mut timer = timer();
        let ranks = [u2::new(1), u2::new(0)];
        assert_eq!(
            train_ranks(&mut phy, &mut timer, &ranks, &TrainingConfig::DEFAULT),
            Err(BringUpError {
                rank: u2::new(1),
                source: TrainingError::PhaseFailed {
                    phase: "Write Leveling",
                    status
                }
            })
        );
        // Second rank was never attempted.
        assert_eq!(phy.pir_writes, 1);
    }

    #[test]
    fn test_timeout_propagates() {
        let mut phy = MockPhy::new(PGSR0_IDONE | PGSR0_DIDONE);
        let mut timer = timer();
        let config = TrainingConfig::new(
            crate::time::Microseconds::from_ticks(200),
            crate::time::Microseconds::from_ticks(1),
        );
        let err = train_ranks(&mut phy, &mut timer, &[u2::new(3)], &config).unwrap_err();
        assert_eq!(err.rank, u2::new(3));
        assert!(matches!(err.source, TrainingError::Timeout { .. }));
    }

    #[test]
    fn test_no_ranks() {
        let mut phy = MockPhy::new(0);
        let mut timer = timer();
        assert!(train_ranks(&mut phy, &mut timer, &[], &TrainingConfig::DEFAULT).is_ok());
        assert!(phy.pir.is_none());
    }

    #[test]
    fn test_error_chain() {
        extern crate std;
        use core::error::Error;
        use std::string::ToString;

        let err = BringUpError {
            rank: u2::new(2),
            source: TrainingError::Timeout { last_status: 0x11 },
        };
        assert_eq!(err.to_string(), "DRAM training of rank 2 failed");
        assert_eq!(
            err.source().map(|source| source.to_string()).as_deref(),
            Some("timeout during DDR training, PGSR0: 0x00000011")
        );
    }
}
