//! # DDR PHY utility block (PUB) registers
//!
//! Register layout and bit definitions of the PHY command and status interface which drives
//! the DRAM training state machine. All offsets and bit positions are taken from the PHY IP
//! datasheet and must not be changed.
use arbitrary_int::{u2, u3, u4};

/// Number of DATX8 byte lane blocks contained in the register block.
pub const NUM_BYTE_LANES: usize = 9;

/// Offset of the first DATX8 byte lane block.
pub const DX_BASE_OFFSET: usize = 0x1C0;
/// Address stride between two DATX8 byte lane blocks.
pub const DX_STRIDE: usize = 0x40;

// PHY Initialization Register (PIR) bits.

/// Initialization trigger.
pub const PIR_INIT: u32 = 1 << 0;
/// Impedance calibration.
pub const PIR_ZCAL: u32 = 1 << 1;
/// PLL initialization.
pub const PIR_PLLINIT: u32 = 1 << 4;
/// DDL calibration.
pub const PIR_DCAL: u32 = 1 << 5;
/// PHY reset.
pub const PIR_PHYRST: u32 = 1 << 6;
/// DRAM reset.
pub const PIR_DRAMRST: u32 = 1 << 7;
/// DRAM initialization.
pub const PIR_DRAMINIT: u32 = 1 << 8;
/// Write leveling.
pub const PIR_WL: u32 = 1 << 9;
/// Read DQS gate training.
pub const PIR_QSGATE: u32 = 1 << 10;
/// Write leveling adjust.
pub const PIR_WLADJ: u32 = 1 << 11;
/// Read data bit deskew.
pub const PIR_RDDSKW: u32 = 1 << 12;
/// Write data bit deskew.
pub const PIR_WRDSKW: u32 = 1 << 13;
/// Read data eye training.
pub const PIR_RDEYE: u32 = 1 << 14;
/// Write data eye training.
pub const PIR_WREYE: u32 = 1 << 15;
/// Impedance calibration bypass.
pub const PIR_ZCALBYP: u32 = 1 << 30;
/// Initialization bypass.
pub const PIR_INITBYP: u32 = 1 << 31;

// PHY General Status Register 0 (PGSR0) bits.

pub const PGSR0_IDONE: u32 = 1 << 0;
pub const PGSR0_PLDONE: u32 = 1 << 1;
pub const PGSR0_DCDONE: u32 = 1 << 2;
pub const PGSR0_ZCDONE: u32 = 1 << 3;
pub const PGSR0_DIDONE: u32 = 1 << 4;
pub const PGSR0_WLDONE: u32 = 1 << 5;
pub const PGSR0_QSGDONE: u32 = 1 << 6;
pub const PGSR0_WLADONE: u32 = 1 << 7;
pub const PGSR0_RDDONE: u32 = 1 << 8;
pub const PGSR0_WDDONE: u32 = 1 << 9;
pub const PGSR0_REDONE: u32 = 1 << 10;
pub const PGSR0_WEDONE: u32 = 1 << 11;
pub const PGSR0_IERR: u32 = 1 << 16;
pub const PGSR0_PLERR: u32 = 1 << 17;
pub const PGSR0_DCERR: u32 = 1 << 18;
pub const PGSR0_ZCERR: u32 = 1 << 19;
pub const PGSR0_DIERR: u32 = 1 << 20;
pub const PGSR0_WLERR: u32 = 1 << 21;
pub const PGSR0_QSGERR: u32 = 1 << 22;
pub const PGSR0_WLAERR: u32 = 1 << 23;
pub const PGSR0_RDERR: u32 = 1 << 24;
pub const PGSR0_WDERR: u32 = 1 << 25;
pub const PGSR0_REERR: u32 = 1 << 26;
pub const PGSR0_WEERR: u32 = 1 << 27;
pub const PGSR0_DTERR_SHIFT: u32 = 28;
pub const PGSR0_DTERR: u32 = 0b111 << PGSR0_DTERR_SHIFT;
pub const PGSR0_APLOCK: u32 = 1 << 31;

/// PHY General Status Register 0.
///
/// The raw value is what the training sequencer compares against its done and error masks.
/// The bitfield accessors exist for diagnostics.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Pgsr0 {
    /// AC PLL lock.
    #[bit(31, r)]
    ac_pll_lock: bool,
    /// Data training error status, only valid if one of the training error bits is set.
    #[bits(28..=30, r)]
    data_training_error: u3,
    #[bit(27, r)]
    write_eye_error: bool,
    #[bit(26, r)]
    read_eye_error: bool,
    #[bit(25, r)]
    write_deskew_error: bool,
    #[bit(24, r)]
    read_deskew_error: bool,
    #[bit(23, r)]
    write_leveling_adjust_error: bool,
    #[bit(22, r)]
    qs_gate_error: bool,
    #[bit(21, r)]
    write_leveling_error: bool,
    #[bit(20, r)]
    dram_init_error: bool,
    #[bit(19, r)]
    impedance_calib_error: bool,
    #[bit(18, r)]
    ddl_calib_error: bool,
    #[bit(17, r)]
    pll_lock_error: bool,
    #[bit(16, r)]
    init_error: bool,
    #[bit(11, r)]
    write_eye_done: bool,
    #[bit(10, r)]
    read_eye_done: bool,
    #[bit(9, r)]
    write_deskew_done: bool,
    #[bit(8, r)]
    read_deskew_done: bool,
    #[bit(7, r)]
    write_leveling_adjust_done: bool,
    #[bit(6, r)]
    qs_gate_done: bool,
    #[bit(5, r)]
    write_leveling_done: bool,
    #[bit(4, r)]
    dram_init_done: bool,
    #[bit(3, r)]
    impedance_calib_done: bool,
    #[bit(2, r)]
    ddl_calib_done: bool,
    #[bit(1, r)]
    pll_lock_done: bool,
    #[bit(0, r)]
    init_done: bool,
}

/// PHY General Status Register 1.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Pgsr1 {
    /// VT drift compensation has stopped after [Pgcr1::inhibit_vt] was set.
    #[bit(30, r)]
    vt_stop: bool,
    #[bit(0, r)]
    delay_line_test_done: bool,
}

/// PHY General Configuration Register 1.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Pgcr1 {
    /// Inhibits VT drift compensation of the delay lines.
    #[bit(26, rw)]
    inhibit_vt: bool,
    #[bit(25, rw)]
    io_loopback: bool,
    #[bits(7..=8, rw)]
    write_leveling_step: u2,
}

/// DATX8 General Configuration Register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct DxGcr {
    #[bit(31, rw)]
    calibration_bypass: bool,
    #[bit(30, rw)]
    master_delay_line_enable: bool,
    /// One-hot rank selection for write leveling.
    #[bits(26..=29, rw)]
    wl_rank_enable: u4,
    #[bit(0, rw)]
    lane_enable: bool,
}

/// Data Training Configuration Register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Dtcr {
    /// One-hot rank selection for data training.
    #[bits(24..=27, rw)]
    rank_enable: u4,
    /// Compare data during read data eye training.
    #[bit(7, rw)]
    compare_data: bool,
    /// Use the multi-purpose register of the DRAM for DQS gate training.
    #[bit(6, rw)]
    use_mpr: bool,
    /// Rank used during data bit deskew and eye centering.
    #[bits(4..=5, rw)]
    training_rank: u2,
    #[bits(0..=3, rw)]
    repeat_count: u4,
}

/// DATX8 byte lane register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct DataByteLane {
    gcr: DxGcr,
    #[mmio(PureRead)]
    gsr0: u32,
    #[mmio(PureRead)]
    gsr1: u32,
    /// Bit delay line registers.
    bdlr: [u32; 7],
    /// Local calibrated delay line registers.
    lcdlr: [u32; 3],
    /// Master delay line register.
    mdlr: u32,
    /// General timing register.
    gtr: u32,
    #[mmio(PureRead)]
    gsr2: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<DataByteLane>(), DX_STRIDE);

/// DDR PHY utility block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct DdrPhy {
    #[mmio(PureRead)]
    ridr: u32,
    /// Initiate register. Writing a mask kicks off all selected steps at once.
    pir: u32,
    pgcr0: u32,
    pgcr1: Pgcr1,
    #[mmio(PureRead)]
    pgsr0: Pgsr0,
    #[mmio(PureRead)]
    pgsr1: Pgsr1,
    pllcr: u32,
    /// PHY timing registers.
    ptr: [u32; 5],
    acmdlr: u32,
    acbdlr: u32,
    aciocr: u32,
    dxccr: u32,
    dsgcr: u32,
    dcr: u32,
    /// DRAM timing parameter registers.
    dtpr: [u32; 3],
    /// DRAM mode registers.
    mr: [u32; 4],
    odtcr: u32,
    dtcr: Dtcr,
    // Data training address/data, ZQ control and general purpose registers are not
    // used by the training code.
    _reserved0: [u32; 0x55],
    #[mmio(Inner)]
    dx0: DataByteLane,
    #[mmio(Inner)]
    dx1: DataByteLane,
    #[mmio(Inner)]
    dx2: DataByteLane,
    #[mmio(Inner)]
    dx3: DataByteLane,
    #[mmio(Inner)]
    dx4: DataByteLane,
    #[mmio(Inner)]
    dx5: DataByteLane,
    #[mmio(Inner)]
    dx6: DataByteLane,
    #[mmio(Inner)]
    dx7: DataByteLane,
    #[mmio(Inner)]
    dx8: DataByteLane,
}

static_assertions::const_assert_eq!(core::mem::offset_of!(DdrPhy, pir), 0x04);
static_assertions::const_assert_eq!(core::mem::offset_of!(DdrPhy, pgsr0), 0x10);
static_assertions::const_assert_eq!(core::mem::offset_of!(DdrPhy, dtcr), 0x68);
static_assertions::const_assert_eq!(core::mem::offset_of!(DdrPhy, dx0), DX_BASE_OFFSET);
static_assertions::const_assert_eq!(
    core::mem::offset_of!(DdrPhy, dx8),
    DX_BASE_OFFSET + 8 * DX_STRIDE
);
static_assertions::const_assert_eq!(core::mem::size_of::<DdrPhy>(), 0x400);

impl MmioDdrPhy<'_> {
    /// Access the DATX8 block of the given byte lane.
    ///
    /// Returns [None] if the lane index is larger than or equal to [NUM_BYTE_LANES].
    pub fn dx(&mut self, lane: usize) -> Option<MmioDataByteLane<'_>> {
        Some(match lane {
            0 => self.dx0(),
            1 => self.dx1(),
            2 => self.dx2(),
            3 => self.dx3(),
            4 => self.dx4(),
            5 => self.dx5(),
            6 => self.dx6(),
            7 => self.dx7(),
            8 => self.dx8(),
            _ => return None,
        })
    }
}
