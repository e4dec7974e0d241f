use super::{FALLBACK_PAGE_SIZE_KB, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn page_size_kb() -> u64 {
        // SAFETY: sysconf has no preconditions; -1 signals an unknown value.
        let bytes = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if bytes >= 1024 {
            bytes as u64 / 1024
        } else {
            FALLBACK_PAGE_SIZE_KB
        }
    }
}
