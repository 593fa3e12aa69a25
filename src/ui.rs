//! Terminal output helpers for the CLI
//!
//! Styled markers on a terminal, bracketed plain text otherwise (CI, pipes).

use console::{style, Style};
use std::io::{self, BufRead, IsTerminal, Write};

/// Whether output goes to a person or a pipe
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
    auto_yes: bool,
}

impl UiContext {
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            auto_yes: false,
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Answer every confirmation with yes
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Progress bars only make sense on a terminal
    pub fn show_progress(&self) -> bool {
        self.interactive && io::stderr().is_terminal()
    }

    fn detect_interactive() -> bool {
        if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
            return false;
        }
        std::env::var_os("CI").is_none()
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.interactive {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.interactive {
        println!("  {} {}", style("✓").green(), message);
    } else {
        println!("  [OK] {}", message);
    }
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.interactive {
        println!("  {} {} ({})", style("✓").green(), message, style(detail).dim());
    } else {
        println!("  [OK] {} ({})", message, detail);
    }
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.interactive {
        println!("  {} {}", style("!").yellow(), message);
    } else {
        println!("  [WARN] {}", message);
    }
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.interactive {
        println!("  {} {} - {}", style("!").yellow(), message, style(hint).dim());
    } else {
        println!("  [WARN] {} - {}", message, hint);
    }
}

pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.interactive {
        println!("  {} {}: {}", style("✗").red(), message, style(detail).red());
    } else {
        println!("  [FAIL] {}: {}", message, detail);
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.interactive {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Key-value line colored by `ok`
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.interactive {
        let value_style = if ok {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let prefix = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", prefix, key, value);
    }
}

/// Ask a yes/no question on stdin.
///
/// Non-interactive sessions take `default` unless auto-yes is set.
pub fn confirm(ctx: &UiContext, prompt: &str, default: bool) -> bool {
    if ctx.auto_yes {
        return true;
    }
    if !ctx.interactive {
        return default;
    }

    let choices = if default { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", prompt, style(choices).dim());
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return default;
    }
    parse_answer(&line, default)
}

fn parse_answer(line: &str, default: bool) -> bool {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
