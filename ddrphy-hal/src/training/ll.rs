//! Low-level DDR PHY register access used by the training sequencer.
use arbitrary_int::{u2, u4};
use ddrphy::phy::{DxGcr, Dtcr, MmioDdrPhy, NUM_BYTE_LANES, Pgcr1, Pgsr0, Pgsr1};

/// DRAM rank. The PHY supports up to four ranks.
pub type Rank = u2;

/// One-hot rank selection as used by the write leveling and data training rank enable fields.
#[inline]
pub const fn rank_select(rank: Rank) -> u4 {
    u4::new(1 << rank.value())
}

/// Register interface of the PHY which is required for training.
///
/// This is implemented by [DdrPhy] for the memory-mapped register block.
pub trait PhyRegisters {
    /// Number of active DATX8 byte lanes.
    fn byte_lanes(&self) -> usize;

    fn write_pir(&mut self, value: u32);

    fn read_pgsr0(&mut self) -> Pgsr0;

    fn read_pgsr1(&mut self) -> Pgsr1;

    fn modify_dx_gcr(&mut self, lane: usize, f: impl FnOnce(DxGcr) -> DxGcr);

    fn modify_dtcr(&mut self, f: impl FnOnce(Dtcr) -> Dtcr);

    fn modify_pgcr1(&mut self, f: impl FnOnce(Pgcr1) -> Pgcr1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid number of byte lanes {0}, must be between 1 and {NUM_BYTE_LANES}")]
pub struct InvalidLaneCount(pub usize);

/// DDR PHY driver.
///
/// Borrows the register block for its lifetime. The training code assumes that nothing else
/// accesses the PHY while it runs.
pub struct DdrPhy<'a> {
    regs: MmioDdrPhy<'a>,
    byte_lanes: usize,
}

impl<'a> DdrPhy<'a> {
    /// Create a new driver for a PHY with `byte_lanes` active DATX8 lanes.
    pub fn new(regs: MmioDdrPhy<'a>, byte_lanes: usize) -> Result<Self, InvalidLaneCount> {
        if byte_lanes == 0 || byte_lanes > NUM_BYTE_LANES {
            return Err(InvalidLaneCount(byte_lanes));
        }
        Ok(Self { regs, byte_lanes })
    }

    /// Direct register access.
    #[inline]
    pub fn regs(&mut self) -> &mut MmioDdrPhy<'a> {
        &mut self.regs
    }

    #[inline]
    pub fn release(self) -> MmioDdrPhy<'a> {
        self.regs
    }
}

impl PhyRegisters for DdrPhy<'_> {
    #[inline]
    fn byte_lanes(&self) -> usize {
        self.byte_lanes
    }

    #[inline]
    fn write_pir(&mut self, value: u32) {
        self.regs.write_pir(value);
    }

    #[inline]
    fn read_pgsr0(&mut self) -> Pgsr0 {
        self.regs.read_pgsr0()
    }

    #[inline]
    fn read_pgsr1(&mut self) -> Pgsr1 {
        self.regs.read_pgsr1()
    }

    fn modify_dx_gcr(&mut self, lane: usize, f: impl FnOnce(DxGcr) -> DxGcr) {
        if lane >= self.byte_lanes {
            return;
        }
        if let Some(mut dx) = self.regs.dx(lane) {
            dx.modify_gcr(f);
        }
    }

    #[inline]
    fn modify_dtcr(&mut self, f: impl FnOnce(Dtcr) -> Dtcr) {
        self.regs.modify_dtcr(f);
    }

    #[inline]
    fn modify_pgcr1(&mut self, f: impl FnOnce(Pgcr1) -> Pgcr1) {
        self.regs.modify_pgcr1(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::prepare_training;
    use ddrphy::phy::{DdrPhy as DdrPhyBlock, PIR_INIT, PIR_WL};

    #[test]
    fn test_rank_select_is_one_hot() {
        assert_eq!(rank_select(u2::new(0)), u4::new(0b0001));
        assert_eq!(rank_select(u2::new(3)), u4::new(0b1000));
    }

    #[test]
    fn test_lane_count_checked() {
        let mut block: DdrPhyBlock = unsafe { core::mem::zeroed() };
        let regs = unsafe { DdrPhyBlock::new_mmio(&mut block) };
        assert!(matches!(DdrPhy::new(regs, 0), Err(InvalidLaneCount(0))));
        let regs = unsafe { DdrPhyBlock::new_mmio(&mut block) };
        assert!(matches!(
            DdrPhy::new(regs, NUM_BYTE_LANES + 1),
            Err(InvalidLaneCount(10))
        ));
        let regs = unsafe { DdrPhyBlock::new_mmio(&mut block) };
        assert!(DdrPhy::new(regs, NUM_BYTE_LANES).is_ok());
    }

    #[test]
    fn test_prepare_on_register_block() {
        let mut block: DdrPhyBlock = unsafe { core::mem::zeroed() };
        let regs = unsafe { DdrPhyBlock::new_mmio(&mut block) };
        let mut phy = DdrPhy::new(regs, 2).unwrap();
        prepare_training(&mut phy, u2::new(2));

        let regs = phy.regs();
        for lane in 0..2 {
            let gcr = regs.dx(lane).unwrap().read_gcr();
            assert_eq!(gcr.wl_rank_enable(), u4::new(0b0100));
        }
        assert_eq!(regs.dx(2).unwrap().read_gcr().raw_value(), 0);
        assert!(regs.dx(NUM_BYTE_LANES).is_none());
        let dtcr = regs.read_dtcr();
        assert_eq!(dtcr.training_rank(), u2::new(2));
        assert!(dtcr.use_mpr());
        assert_eq!(dtcr.rank_enable(), u4::new(0b0100));
        assert_eq!(regs.read_pir(), 0);
    }

    #[test]
    fn test_pir_write_reaches_register() {
        let mut block: DdrPhyBlock = unsafe { core::mem::zeroed() };
        let regs = unsafe { DdrPhyBlock::new_mmio(&mut block) };
        let mut phy = DdrPhy::new(regs, 1).unwrap();
        phy.write_pir(PIR_INIT | PIR_WL);
        assert_eq!(phy.release().read_pir(), PIR_INIT | PIR_WL);
    }
}
