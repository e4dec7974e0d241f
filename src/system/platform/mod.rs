/// Page size assumed when the OS cannot be asked.
pub const FALLBACK_PAGE_SIZE_KB: u64 = 4;

pub trait PlatformExtensions {
    fn page_size_kb() -> u64;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;

/// Size of one memory page in KiB, as used to scale resident page counts.
pub fn page_size_kb() -> u64 {
    platform_impl::Platform::page_size_kb()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_a_positive_power_of_two() {
        let kb = page_size_kb();
        assert!(kb > 0);
        assert!(kb.is_power_of_two());
    }
}
