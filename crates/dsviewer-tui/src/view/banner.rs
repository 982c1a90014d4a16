use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::theme::Theme;
use crate::view::help::centered_rect;

const BANNER_ART: &[&str] = &[
    r"     _           _                        ",
    r"  __| |_____   _(_) _____      _____ _ __ ",
    r" / _` / __\ \ / / |/ _ \ \ /\ / / _ \ '__|",
    r"| (_| \__ \\ V /| |  __/\ V  V /  __/ |   ",
    r" \__,_|___/ \_/ |_|\___| \_/\_/ \___|_|   ",
];

/// Render the startup banner shown until the first dataset is loaded.
pub fn render(f: &mut Frame, theme: &Theme, tick: usize) {
    let area = f.area();

    // Don't render if terminal too narrow
    if area.width < 50 || area.height < 12 {
        return;
    }

    let popup = centered_rect(50, 10, area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for art_line in BANNER_ART {
        lines.push(Line::from(Span::styled(
            format!("   {}", art_line),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));

    let dots = ".".repeat((tick % 4) + 1);
    lines.push(Line::from(Span::styled(
        format!("    Loading dataset{:<4}", dots),
        Style::default().fg(theme.dim),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active)),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
