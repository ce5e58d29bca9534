//! # Post-training memory tests
//!
//! Simple pattern tests which can be run on a small DRAM window after training succeeded.
//! They detect stuck or shorted data lines, not marginal timing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemTestError {
    #[error("memory address is not aligned to 4 bytes")]
    AddrNotAligned,
    #[error("memory test error at {addr:#010x}, expected {expected:#010x}, found {found:#010x}")]
    Memory {
        addr: usize,
        expected: u32,
        found: u32,
    },
}

/// # Safety
///
/// This tests writes and reads on a memory block starting at the base address
/// with the size `words` times 4.
pub unsafe fn walking_zero_test(base_addr: usize, words: usize) -> Result<(), MemTestError> {
    unsafe { walking_value_test(true, base_addr, words) }
}

/// # Safety
///
/// This tests writes and reads on a memory block starting at the base address
/// with the size `words` times 4.
pub unsafe fn walking_one_test(base_addr: usize, words: usize) -> Result<(), MemTestError> {
    unsafe { walking_value_test(false, base_addr, words) }
}

/// Writes a walking bit pattern to the whole block and verifies it, once for each of the
/// 32 bit positions.
///
/// # Safety
///
/// This tests writes and reads on a memory block starting at the base address
/// with the size `words` times 4.
pub unsafe fn walking_value_test(
    walking_zero: bool,
    base_addr: usize,
    words: usize,
) -> Result<(), MemTestError> {
    check_addr(base_addr)?;
    for bit in 0..32 {
        let pattern = if walking_zero {
            !(1u32 << bit)
        } else {
            1u32 << bit
        };
        unsafe { fill_and_verify(base_addr, words, |_| pattern)? };
    }
    Ok(())
}

/// # Safety
///
/// This tests writes and reads on a memory block starting at the base address
/// with the size `words` times 4.
pub unsafe fn checkerboard_test(base_addr: usize, words: usize) -> Result<(), MemTestError> {
    check_addr(base_addr)?;
    for pattern in [0xAAAA_AAAAu32, 0x5555_5555u32] {
        unsafe {
            fill_and_verify(base_addr, words, |i| {
                if i % 2 == 0 { pattern } else { !pattern }
            })?
        };
    }
    Ok(())
}

fn check_addr(base_addr: usize) -> Result<(), MemTestError> {
    if !base_addr.is_multiple_of(4) {
        return Err(MemTestError::AddrNotAligned);
    }
    Ok(())
}

/// # Safety
///
/// See the public test functions.
unsafe fn fill_and_verify(
    base_addr: usize,
    words: usize,
    pattern: impl Fn(usize) -> u32,
) -> Result<(), MemTestError> {
    let base_ptr = base_addr as *mut u32;
    for i in 0..words {
        unsafe { core::ptr::write_volatile(base_ptr.add(i), pattern(i)) };
    }
    for i in 0..words {
        let expected = pattern(i);
        let found = unsafe { core::ptr::read_volatile(base_ptr.add(i)) };
        if found != expected {
            return Err(MemTestError::Memory {
                addr: base_addr + i * 4,
                expected,
                found,
            });
        }
    }
    Ok(())
}
