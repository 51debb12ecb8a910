//! Terminal capability detection

use is_terminal::IsTerminal;

use super::cli::ColorWhen;

/// Whether to color stdout for this run
pub fn use_color(when: Option<ColorWhen>) -> bool {
    use_color_impl(
        when,
        |key| std::env::var(key).ok(),
        std::io::stdout().is_terminal(),
    )
}

fn use_color_impl(
    when: Option<ColorWhen>,
    get_env: impl Fn(&str) -> Option<String>,
    is_tty: bool,
) -> bool {
    match when {
        Some(ColorWhen::Always) => true,
        Some(ColorWhen::Never) => false,
        Some(ColorWhen::Auto) | None => {
            let term = get_env("TERM").unwrap_or_default();
            is_tty && !term.eq_ignore_ascii_case("dumb") && get_env("NO_COLOR").is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn auto(env: &[(&str, &str)], is_tty: bool) -> bool {
        let map: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        use_color_impl(None, |k| map.get(k).cloned(), is_tty)
    }

    #[test]
    fn detect_respects_no_color() {
        assert!(!auto(&[("NO_COLOR", "1"), ("TERM", "xterm-256color")], true));
    }

    #[test]
    fn detect_term_dumb_disables_color() {
        assert!(!auto(&[("TERM", "dumb")], true));
    }

    #[test]
    fn detect_pipe_disables_color() {
        assert!(!auto(&[("TERM", "xterm")], false));
        assert!(auto(&[("TERM", "xterm")], true));
    }

    #[test]
    fn explicit_choice_wins() {
        assert!(use_color_impl(Some(ColorWhen::Always), |_| None, false));
        assert!(!use_color_impl(Some(ColorWhen::Never), |_| None, true));
    }
}
