use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use dsviewer_core::preview::ImagePreview;

use crate::app::PreviewEntry;
use crate::theme::Theme;

const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Render the selected image as half-block colour cells, or the decode error.
pub fn render(f: &mut Frame, area: Rect, name: &str, entry: Option<&PreviewEntry>, theme: &Theme) {
    let title = match entry.map(|e| &e.result) {
        Some(Ok(p)) => format!(" {} ({}x{} px) ", name, p.source_width, p.source_height),
        _ => format!(" {} ", name),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match entry.map(|e| &e.result) {
        Some(Ok(preview)) => draw_preview(f, inner, preview),
        Some(Err(msg)) => {
            let warning = Paragraph::new(Line::from(Span::styled(
                format!("\u{26A0} {}", msg),
                Style::default().fg(theme.warning),
            )))
            .wrap(Wrap { trim: false });
            f.render_widget(warning, inner);
        }
        None => {}
    }
}

fn draw_preview(f: &mut Frame, area: Rect, preview: &ImagePreview) {
    // centre horizontally
    let x0 = area.x + area.width.saturating_sub(preview.cols) / 2;
    let buf = f.buffer_mut();
    for row in 0..preview.rows.min(area.height) {
        for col in 0..preview.cols.min(area.width) {
            if let Some((top, bottom)) = preview.cell(col, row) {
                buf[(x0 + col, area.y + row)]
                    .set_char(UPPER_HALF_BLOCK)
                    .set_fg(Color::Rgb(top[0], top[1], top[2]))
                    .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
            }
        }
    }
}
