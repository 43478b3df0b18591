use serde::Serialize;

/// Page geometry and type metrics, letter format in millimeters. Text is
/// measured with a fixed average glyph width, which is what the downstream
/// renderer assumes as well.
#[derive(Clone, Debug, Serialize)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub line_height: f64,
    pub char_width: f64,
    /// Running header redrawn at the top of every page.
    pub header_height: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            width: 216.0,
            height: 279.0,
            margin: 20.0,
            line_height: 5.0,
            char_width: 2.1,
            header_height: 12.0,
        }
    }
}

impl PageSpec {
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest cursor position a block may still end at.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin
    }

    pub fn chars_for_width(&self, width: f64) -> usize {
        (width / self.char_width).floor().max(1.0) as usize
    }
}

/// Greedy word wrap against a character budget. Words longer than a whole
/// line are hard-broken rather than overflowing their box.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len <= max_chars {
            current.push_str(word);
            current_len = word_len;
        } else {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                if chunk.len() == max_chars {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines
}

/// Elides labels that would overflow their box, on character boundaries.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut elided: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    elided.push('…');
    elided
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_budget() {
        let lines = wrap_text("visita a empresa de mantenimiento industrial", 12);

        assert!(lines.iter().all(|line| line.chars().count() <= 12));
        assert_eq!(lines.join(" "), "visita a empresa de mantenimiento industrial");
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let lines = wrap_text("electroencefalografista", 8);

        assert!(lines.iter().all(|line| line.chars().count() <= 8));
        assert_eq!(lines.concat(), "electroencefalografista");
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_ellipsize_short_label_untouched() {
        assert_eq!(ellipsize("Taller", 10), "Taller");
    }

    #[test]
    fn test_ellipsize_cuts_on_char_boundary() {
        // Multibyte names must not split mid-character
        let elided = ellipsize("Peñalolén Maestranza Ferroviaria", 12);

        assert_eq!(elided.chars().count(), 12);
        assert!(elided.ends_with('…'));
        assert_eq!(elided, "Peñalolén M…");
    }

    #[test]
    fn test_chars_for_width_never_zero() {
        let spec = PageSpec::default();

        assert_eq!(spec.chars_for_width(0.5), 1);
    }
}
