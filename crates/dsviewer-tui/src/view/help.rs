use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;

type KeySection = (&'static str, &'static [(&'static str, &'static str)]);

const SECTIONS: &[KeySection] = &[
    (
        "Options sidebar",
        &[
            ("j / \u{2193} / Tab", "Next control"),
            ("k / \u{2191}", "Previous control"),
            ("h / \u{2190}", "Previous value (type, split, index, image)"),
            ("l / \u{2192}", "Next value"),
            ("H / L", "Index -10 / +10"),
            ("Enter / Space", "Edit text field / toggle checkbox"),
        ],
    ),
    (
        "Editing",
        &[
            ("Enter", "Confirm and reload"),
            ("Esc", "Cancel"),
            ("\u{2190} / \u{2192}", "Move cursor"),
        ],
    ),
    (
        "Content",
        &[
            ("J / K", "Scroll line"),
            ("PgDn / Ctrl+d", "Page down"),
            ("PgUp / Ctrl+u", "Page up"),
            ("g / G", "Top / bottom"),
        ],
    ),
    (
        "Global",
        &[
            ("r", "Reload (drop cached data)"),
            ("Ctrl+s", "Save settings to config file"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
            ("Ctrl+c", "Force quit"),
        ],
    ),
];

const KEY_COLUMN: usize = 18;

/// Key bindings popup, drawn over the current frame.
pub fn render(f: &mut Frame, theme: &Theme) {
    let mut lines = vec![Line::from(Span::styled(" Keys ", theme.header_style()))];
    for (title, keys) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {title}"), theme.section_style())));
        for (key, desc) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("   {key:<width$}", width = KEY_COLUMN),
                    Style::default().fg(theme.text),
                ),
                Span::styled(*desc, Style::default().fg(theme.dim)),
            ]));
        }
    }

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let popup = centered_rect(66, height, f.area());
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" ? "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

/// A `width` x `height` rectangle centred in `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
