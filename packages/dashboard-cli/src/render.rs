//! Terminal rendering of the dashboard.

use colored::{ColoredString, Colorize};
use proposals::{Category, CategorySummary, ClassifiedProposal};

const BAR_WIDTH: usize = 40;

pub fn print_banner(total: usize) {
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║   Dashboard de Indicações Legislativas ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    println!("{} {}", "Total de indicações:".bold(), total);
    println!();
}

/// Horizontal bar chart, one line per category.
pub fn print_summary(summary: &[CategorySummary]) {
    println!("{}", "Indicações por categoria".bold().underline());
    let label_width = summary
        .iter()
        .map(|s| s.category.label().chars().count())
        .max()
        .unwrap_or(0);

    for entry in summary {
        let label = entry.category.label();
        let padding = " ".repeat(label_width - label.chars().count());
        println!(
            "  {}{}  {} {:>3} ({:.1}%)",
            label,
            padding,
            paint(&"█".repeat(bar_len(entry.percentage)), entry.category),
            entry.count,
            entry.percentage
        );
    }
    println!();
}

pub fn print_proposals(proposals: &[&ClassifiedProposal], filter: Option<Category>) {
    match filter {
        Some(category) => println!(
            "{} {}",
            "Indicações em".bold().underline(),
            paint(category.label(), category).bold()
        ),
        None => println!("{}", "Todas as indicações".bold().underline()),
    }

    if proposals.is_empty() {
        println!("  {}", "Nenhuma indicação nesta categoria.".dimmed());
        return;
    }

    for proposal in proposals {
        println!(
            "  {} {} {}",
            proposal.id().bold(),
            proposal.proposal.protocol_date.dimmed(),
            paint(&format!("[{}]", proposal.category.label()), proposal.category)
        );
        println!("    {}", proposal.proposal.description);
        if !proposal.locations.is_empty() {
            println!(
                "    {} {}",
                "Locais:".dimmed(),
                proposal.locations.join(", ")
            );
        }
        println!("    {} {}", "PDF:".dimmed(), proposal.proposal.pdf_url.blue());
    }
}

fn paint(text: &str, category: Category) -> ColoredString {
    let (r, g, b) = hex_rgb(category.color()).unwrap_or((128, 128, 128));
    text.truecolor(r, g, b)
}

/// Width of a bar for a percentage, at least one cell for any non-zero share.
fn bar_len(percentage: f64) -> usize {
    let cells = (percentage / 100.0 * BAR_WIDTH as f64).round() as usize;
    if percentage > 0.0 {
        cells.clamp(1, BAR_WIDTH)
    } else {
        0
    }
}

/// `#rrggbb` to components.
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#3b82f6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(hex_rgb("3b82f6"), None);
        assert_eq!(hex_rgb("#zzzzzz"), None);
    }

    #[test]
    fn test_every_category_color_parses() {
        for category in Category::ALL {
            assert!(hex_rgb(category.color()).is_some(), "{}", category);
        }
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(0.0), 0);
        assert_eq!(bar_len(0.1), 1);
        assert_eq!(bar_len(50.0), BAR_WIDTH / 2);
        assert_eq!(bar_len(100.0), BAR_WIDTH);
    }
}
