use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::model::controls::Control;
use crate::view::truncate;

/// Render the "Options" sidebar: one label line and one value line per control.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let controls = &app.plan.controls;
    let value_width = area.width.saturating_sub(6) as usize;

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (i, control) in app.visible_controls().into_iter().enumerate() {
        let focused = i == app.focus;
        let editing = app.editing == Some(control);

        let cursor = if focused { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{}{}", cursor, control.label(controls.kind)),
            if focused {
                theme.section_style()
            } else {
                Style::default().fg(theme.text)
            },
        )));

        let value_line = if editing {
            let (before, after) = app.edit.split();
            Line::from(vec![
                Span::raw("    "),
                Span::styled(before.to_string(), Style::default().fg(theme.active)),
                Span::styled("\u{2588}", Style::default().fg(theme.active)),
                Span::styled(after.to_string(), Style::default().fg(theme.active)),
            ])
        } else {
            let style = if focused {
                theme.highlight_style().fg(theme.text)
            } else {
                Style::default().fg(theme.dim)
            };
            Line::from(vec![
                Span::raw("    "),
                Span::styled(truncate(&display_value(app, control), value_width), style),
            ])
        };
        lines.push(value_line);
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(Span::styled(
                " Options ",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(paragraph, area);
}

fn display_value(app: &App, control: Control) -> String {
    let controls = &app.plan.controls;
    match control {
        Control::Kind => format!("\u{2039} {} \u{203A}", controls.kind.label()),
        Control::Name => controls.name.clone(),
        Control::Split => {
            let split = controls.split.as_deref().unwrap_or("-");
            let pos = controls
                .splits
                .iter()
                .position(|s| Some(s.as_str()) == controls.split.as_deref())
                .map_or(0, |p| p + 1);
            format!("\u{2039} {} \u{203A}  ({}/{})", split, pos, controls.splits.len())
        }
        Control::Index => match controls.max_index {
            Some(max) => format!("{}  (0-{})", controls.index, max),
            None => controls.index.to_string(),
        },
        Control::WordCloud => {
            if controls.wordcloud {
                "[\u{2713}]".to_string()
            } else {
                "[ ]".to_string()
            }
        }
        Control::ImageFolder => {
            if controls.image_folder.is_empty() {
                "(not set)".to_string()
            } else {
                controls.image_folder.clone()
            }
        }
        Control::Image => {
            let name = controls
                .images
                .get(controls.image_index)
                .map(String::as_str)
                .unwrap_or("-");
            format!(
                "\u{2039} {} \u{203A}  ({}/{})",
                name,
                controls.image_index + 1,
                controls.images.len()
            )
        }
    }
}
