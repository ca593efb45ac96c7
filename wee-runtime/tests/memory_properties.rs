//! Property tests for linear memory.

use proptest::prelude::*;
use wee_foundation::{FloatBits32, FloatBits64, MemoryType, PAGE_SIZE};
use wee_runtime::MemoryInstance;

proptest! {
    #[test]
    fn prop_growth_is_all_or_nothing(
        min in 0u32..4,
        max in proptest::option::of(0u32..8),
        requests in proptest::collection::vec(0u32..6, 1..8),
    ) {
        prop_assume!(max.map_or(true, |max| min <= max));
        let mut memory = MemoryInstance::new(MemoryType::new(min, max)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        for n in requests {
            let before = memory.data().to_vec();
            let pages = memory.page_count();
            match memory.grow_page(n) {
                Ok(()) => {
                    prop_assert_eq!(memory.page_count(), pages + n);
                    prop_assert_eq!(memory.data_size(), memory.page_count() as usize * PAGE_SIZE);
                }
                Err(_) => {
                    prop_assert_eq!(memory.page_count(), pages);
                    prop_assert_eq!(memory.data(), &before[..]);
                }
            }
        }
    }

    #[test]
    fn prop_full_width_round_trip(offset in 0usize..(PAGE_SIZE - 8), a in any::<u32>(), b in any::<u64>()) {
        let mut memory = MemoryInstance::new(MemoryType::new(1, None)).map_err(|e| TestCaseError::fail(e.to_string()))?;

        memory.store_value(offset, 4, a).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<u32>(offset, 4).ok(), Some(a));

        memory.store_value(offset, 8, b).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<u64>(offset, 8).ok(), Some(b));

        let fa = FloatBits32(a);
        memory.store_value(offset, 4, fa).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<FloatBits32>(offset, 4).ok(), Some(fa));

        let fb = FloatBits64(b);
        memory.store_value(offset, 8, fb).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<FloatBits64>(offset, 8).ok(), Some(fb));
    }

    #[test]
    fn prop_narrow_round_trip(offset in 0usize..(PAGE_SIZE - 2), v in any::<u16>(), byte in any::<u8>()) {
        let mut memory = MemoryInstance::new(MemoryType::new(1, None)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        memory.store_value(offset, 2, u32::from(v)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<u32>(offset, 2).ok(), Some(u32::from(v)));
        memory.store_value(offset, 1, u64::from(byte)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(memory.load_value::<u64>(offset, 1).ok(), Some(u64::from(byte)));
    }

    #[test]
    fn prop_out_of_bounds_writes_nothing(offset in (PAGE_SIZE - 7)..(PAGE_SIZE + 16), v in any::<u64>()) {
        let mut memory = MemoryInstance::new(MemoryType::new(1, None)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(memory.store_value(offset, 8, v).is_err());
        prop_assert!(memory.data().iter().all(|b| *b == 0));
        prop_assert!(memory.load_value::<u64>(offset, 8).is_err());
    }
}
