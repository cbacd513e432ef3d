use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

/// Break `text` into display rows no wider than `width` columns.
///
/// Empty source lines are kept as empty rows. A `width` of zero disables
/// wrapping and only splits on newlines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.replace('\t', &" ".repeat(TAB_WIDTH));
        if width == 0 {
            rows.push(line);
            continue;
        }
        wrap_line(&line, width, &mut rows);
    }
    rows
}

fn wrap_line(line: &str, width: usize, rows: &mut Vec<String>) {
    if line.is_empty() {
        rows.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        rows.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lines_untouched() {
        assert_eq!(wrap_text("one\ntwo", 10), vec!["one", "two"]);
    }

    #[test]
    fn test_long_line_split() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_empty_lines_kept() {
        assert_eq!(wrap_text("a\n\nb", 5), vec!["a", "", "b"]);
    }

    #[test]
    fn test_wide_chars_count_double() {
        // each of these occupies two columns
        assert_eq!(wrap_text("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn test_zero_width_disables_wrapping() {
        assert_eq!(wrap_text("abcdefgh", 0), vec!["abcdefgh"]);
    }

    #[test]
    fn test_tabs_expanded() {
        assert_eq!(wrap_text("\tx", 0), vec!["    x"]);
    }
}
