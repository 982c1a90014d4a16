use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as Pane, Borders, Paragraph, Wrap};

use dsviewer_core::{Block, Message, MultimodalRecord};

use crate::app::App;
use crate::theme::Theme;

/// Rows given to the word cloud or image panel below the text.
const PANEL_MIN_ROWS: u16 = 10;

/// Render the main pane: scrollable text blocks, then the word cloud or
/// image panel when the plan carries one.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let has_cloud = app.plan.wordcloud().is_some();
    let image = app.plan.blocks.iter().find_map(|b| match b {
        Block::Image { path, name } => Some((path.clone(), name.clone())),
        _ => None,
    });

    let (text_area, panel_area) = if has_cloud || image.is_some() {
        let panel = (area.height / 2).max(PANEL_MIN_ROWS).min(area.height);
        let [top, bottom] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(panel)]).areas(area);
        (top, Some(bottom))
    } else {
        (area, None)
    };

    let lines = block_lines(&app.plan.blocks, &app.theme);
    // clamp scroll so GoBottom lands on the last page
    let inner_width = text_area.width.saturating_sub(2).max(1) as usize;
    let wrapped_rows: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let inner_height = text_area.height.saturating_sub(2);
    let max_scroll = u16::try_from(wrapped_rows)
        .unwrap_or(u16::MAX)
        .saturating_sub(inner_height);
    app.content_scroll = app.content_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(
            Pane::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style()),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0));
    f.render_widget(paragraph, text_area);

    let Some(panel) = panel_area else {
        return;
    };
    if let Some(cloud) = app.plan.wordcloud() {
        crate::view::wordcloud::render(f, panel, cloud, &app.theme);
    } else if let Some((path, name)) = image {
        let cols = panel.width.saturating_sub(2);
        let rows = panel.height.saturating_sub(2);
        app.ensure_preview(&path, cols, rows);
        crate::view::image::render(f, panel, &name, app.preview.as_ref(), &app.theme);
    }
}

/// Text lines for every block, in plan order.
pub fn block_lines(blocks: &[Block], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let label = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);
    let plain = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.dim);

    for block in blocks {
        match block {
            Block::Title(title) => {
                lines.push(Line::from(Span::styled(title.clone(), theme.section_style())));
                lines.push(Line::from(""));
            }
            Block::Error(msg) => lines.push(Line::from(Span::styled(
                format!("\u{2716} {}", msg),
                Style::default().fg(theme.error),
            ))),
            Block::Warning(msg) => lines.push(Line::from(Span::styled(
                format!("\u{26A0} {}", msg),
                Style::default().fg(theme.warning),
            ))),
            Block::DatasetSize { len, total_rows } => {
                let mut spans = vec![
                    Span::styled("Dataset Size: ", label),
                    Span::styled(len.to_string(), plain),
                ];
                if total_rows > len {
                    spans.push(Span::styled(
                        format!("  (first {} of {} rows)", len, total_rows),
                        dim,
                    ));
                }
                lines.push(Line::from(spans));
            }
            Block::Keys(keys) => lines.push(Line::from(vec![
                Span::styled("Dataset Keys: ", label),
                Span::styled(format!("{:?}", keys), plain),
            ])),
            Block::Context(context) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Context", label)));
                for text in context.lines() {
                    lines.push(Line::from(Span::styled(text.to_string(), plain)));
                }
                lines.push(Line::from(Span::styled("---", dim)));
            }
            Block::Options(options) => {
                lines.push(Line::from(Span::styled("Options:", label)));
                for opt in options {
                    lines.push(Line::from(Span::styled(format!("  {}", opt), plain)));
                }
            }
            Block::Chat(message) => chat_lines(&mut lines, message, theme),
            Block::WordCloud(cloud) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Word cloud of {} words below.", cloud.words.len()),
                    dim,
                )));
            }
            Block::Fields(record) => field_lines(&mut lines, record, theme),
            Block::Image { name, .. } => {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Image: ", label),
                    Span::styled(name.clone(), plain),
                ]));
            }
        }
    }
    lines
}

fn chat_lines(lines: &mut Vec<Line<'static>>, message: &Message, theme: &Theme) {
    let color = theme.role_color(message.role);
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw(format!("{} ", message.avatar)),
        Span::styled(
            message.role.as_str().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]));
    let body = if message.content.is_empty() {
        vec![""]
    } else {
        message.content.lines().collect()
    };
    for text in body {
        lines.push(Line::from(vec![
            Span::styled("\u{2502} ", Style::default().fg(color)),
            Span::styled(text.to_string(), Style::default().fg(theme.text)),
        ]));
    }
}

fn field_lines(lines: &mut Vec<Line<'static>>, record: &MultimodalRecord, theme: &Theme) {
    let key = Style::default().fg(theme.active);
    let plain = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.dim);

    lines.push(Line::from(""));
    for (name, value) in &record.text_fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", name), key),
            Span::styled(value.clone(), plain),
        ]));
    }
    for image in &record.images {
        let size = match (image.width, image.height) {
            (Some(w), Some(h)) => format!("  ({}x{})", w, h),
            _ => String::new(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", image.field), key),
            Span::styled(image.location.clone(), plain),
            Span::styled(size, dim),
        ]));
    }
    for (name, value) in &record.other_fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", name), key),
            Span::styled(value.clone(), dim),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsviewer_core::Role;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn qa_blocks_render_in_order() {
        let blocks = vec![
            Block::DatasetSize { len: 3, total_rows: 10 },
            Block::Keys(vec!["context".into(), "query".into()]),
            Block::Options(vec!["1. Paris".into(), "2. London".into()]),
            Block::Chat(Message::new(Role::User, "What sat?")),
            Block::Chat(Message::new(Role::Robot, "A cat")),
        ];
        let out = text(&block_lines(&blocks, &Theme::hacker()));
        assert_eq!(out[0], "Dataset Size: 3  (first 3 of 10 rows)");
        assert_eq!(out[1], r#"Dataset Keys: ["context", "query"]"#);
        assert_eq!(out[2], "Options:");
        assert_eq!(out[4], "  2. London");
        assert!(out.contains(&"\u{2502} What sat?".to_string()));
        assert_eq!(out.last().unwrap(), "\u{2502} A cat");
    }

    #[test]
    fn empty_answer_still_draws_a_bubble() {
        let blocks = vec![Block::Chat(Message::new(Role::Robot, ""))];
        let out = text(&block_lines(&blocks, &Theme::modern()));
        assert_eq!(out.len(), 3);
        assert!(out[1].ends_with("robot"));
    }
}
