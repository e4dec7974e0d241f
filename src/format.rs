use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1}{}", UNITS[unit])
}

pub fn format_kb(kb: u64) -> String {
    format_bytes(kb.saturating_mul(1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_scale_through_units() {
        assert_eq!(format_bytes(512), "512.0B");
        assert_eq!(format_bytes(1536), "1.5KB");
        assert_eq!(format_kb(2048), "2.0MB");
        assert_eq!(format_kb(16 * 1024 * 1024), "16.0GB");
        assert_eq!(format_kb(u64::MAX), "16777216.0TB");
    }

    #[test]
    fn truncation_respects_width() {
        assert_eq!(truncate_unicode("systemd", 18), "systemd");
        assert_eq!(truncate_unicode("gnome-shell-calendar-server", 10), "gnome-she\u{2026}");
    }
}
