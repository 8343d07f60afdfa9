use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Insert `c` before the character at index `idx` (or at the end)
pub fn insert_char_at(s: &str, idx: usize, c: char) -> String {
    let mut out = String::with_capacity(s.len() + c.len_utf8());
    let mut inserted = false;
    for (i, ch) in s.chars().enumerate() {
        if i == idx {
            out.push(c);
            inserted = true;
        }
        out.push(ch);
    }
    if !inserted {
        out.push(c);
    }
    out
}

/// Remove the character at index `idx`; out of range leaves `s` as is
pub fn remove_char_at(s: &str, idx: usize) -> String {
    s.chars()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .map(|(_, c)| c)
        .collect()
}

/// Terminal columns taken by `s`
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max` terminal columns, marking the cut with `…`
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if display_width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_editing() {
        assert_eq!(insert_char_at("ac", 1, 'b'), "abc");
        assert_eq!(insert_char_at("ab", 9, 'c'), "abc");
        assert_eq!(insert_char_at("°C", 0, '-'), "-°C");
        assert_eq!(remove_char_at("a°c", 1), "ac");
        assert_eq!(remove_char_at("ab", 5), "ab");
        assert_eq!(char_count("°C"), 2);
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("Tags"), 4);
        assert_eq!(display_width("温度"), 4);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Pump_1", 10), "Pump_1");
        assert_eq!(truncate_to_width("Pump_Station_1", 6), "Pump_…");
        assert_eq!(truncate_to_width("温度温度", 5), "温度…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
