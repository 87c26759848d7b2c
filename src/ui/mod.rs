//! Small egui helpers shared by the host panels.

use eframe::egui;

/// Accent fill for nav items, tuned per theme.
pub fn accent(dark: bool) -> egui::Color32 {
    if dark {
        egui::Color32::from_rgb(90, 130, 255)
    } else {
        egui::Color32::from_rgb(40, 90, 210)
    }
}

/// Truncate to `max_chars` characters, ending in "..." when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("こんにちは世界です", 6), "こんに...");
        assert_eq!(truncate_str("abcdef", 3), "...");
    }
}
