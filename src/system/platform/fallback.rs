use super::{FALLBACK_PAGE_SIZE_KB, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn page_size_kb() -> u64 {
        FALLBACK_PAGE_SIZE_KB
    }
}
