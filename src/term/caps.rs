//! Terminal capability detection from the environment.

/// What the host terminal can render. Detected once at startup and passed to
/// every formatting function so rendering can degrade to ASCII cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCaps {
    /// Basic 16-color SGR support.
    pub color: bool,
    /// 256-color palette support.
    pub color256: bool,
    /// 24-bit true-color support.
    pub truecolor: bool,
    /// UTF-8 output (box drawing, block progress bars, ellipsis glyph).
    pub unicode: bool,
}

impl TermCaps {
    /// Inspect the process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_with(|name| std::env::var(name).ok())
    }

    /// Detection against an arbitrary environment lookup, split out so tests
    /// do not have to mutate process globals.
    #[must_use]
    pub fn detect_with(get: impl Fn(&str) -> Option<String>) -> Self {
        let term = get("TERM").unwrap_or_default().to_ascii_lowercase();
        let colorterm = get("COLORTERM").unwrap_or_default().to_ascii_lowercase();

        let truecolor = colorterm.contains("truecolor") || colorterm.contains("24bit");
        let color256 = truecolor || term.contains("256color");
        let color = if get("NO_COLOR").is_some() {
            false
        } else {
            color256 || (!term.is_empty() && term != "dumb")
        };

        let locale = get("LC_ALL")
            .or_else(|| get("LANG"))
            .unwrap_or_default()
            .to_ascii_lowercase();
        let unicode = locale.contains("utf-8") || locale.contains("utf8");

        Self {
            color,
            color256,
            truecolor,
            unicode,
        }
    }

    /// Force color off (e.g. `--no-color`), keeping Unicode detection.
    #[must_use]
    pub fn without_color(self) -> Self {
        Self {
            color: false,
            color256: false,
            truecolor: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn truecolor_implies_256_and_basic() {
        let caps = TermCaps::detect_with(env(&[
            ("TERM", "xterm"),
            ("COLORTERM", "truecolor"),
            ("LANG", "en_US.UTF-8"),
        ]));
        assert!(caps.truecolor);
        assert!(caps.color256);
        assert!(caps.color);
        assert!(caps.unicode);
    }

    #[test]
    fn dumb_terminal_gets_nothing() {
        let caps = TermCaps::detect_with(env(&[("TERM", "dumb"), ("LANG", "C")]));
        assert!(!caps.color);
        assert!(!caps.unicode);
    }

    #[test]
    fn no_color_wins_over_term() {
        let caps = TermCaps::detect_with(env(&[("TERM", "xterm-256color"), ("NO_COLOR", "1")]));
        assert!(!caps.color);
        // Palette knowledge is still detected; rendering just won't use it.
        assert!(caps.color256);
    }

    #[test]
    fn lc_all_takes_precedence_over_lang() {
        let caps = TermCaps::detect_with(env(&[("LC_ALL", "C"), ("LANG", "en_US.UTF-8")]));
        assert!(!caps.unicode);
    }
}
