//! Draws a pixel-space [`WordCloud`] onto a grid of terminal cells.
//!
//! Terminal text has a single size, so each word is printed once at the cell
//! nearest its centre, biggest words first. A word whose cells are already
//! taken (or that does not fit the row) is skipped.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use dsviewer_core::WordCloud;

use crate::theme::Theme;

/// Font size from which a word is drawn bold.
const BOLD_FONT_SIZE: f32 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: (u8, u8, u8),
    pub bold: bool,
}

/// Map words to non-overlapping cell positions in a `cols x rows` grid.
pub fn layout_labels(cloud: &WordCloud, cols: u16, rows: u16) -> Vec<Label> {
    if cols == 0 || rows == 0 || cloud.width == 0 || cloud.height == 0 {
        return Vec::new();
    }
    let mut taken = vec![false; cols as usize * rows as usize];
    let mut labels = Vec::new();

    for word in &cloud.words {
        // terminal cells, so wide (CJK) characters count twice
        let len = u16::try_from(Span::raw(word.text.as_str()).width()).unwrap_or(u16::MAX);
        if len == 0 || len > cols {
            continue;
        }
        let cx = (word.x + word.width / 2) as u64;
        let cy = (word.y + word.height / 2) as u64;
        let col = (cx * cols as u64 / cloud.width as u64) as u16;
        let row = ((cy * rows as u64 / cloud.height as u64) as u16).min(rows - 1);
        let start = col.saturating_sub(len / 2).min(cols - len);

        // keep one blank cell on each side so neighbours stay readable
        let lo = start.saturating_sub(1) as usize;
        let hi = ((start + len + 1).min(cols)) as usize;
        let base = row as usize * cols as usize;
        if taken[base + lo..base + hi].iter().any(|t| *t) {
            continue;
        }
        for cell in &mut taken[base + start as usize..base + (start + len) as usize] {
            *cell = true;
        }

        labels.push(Label {
            col: start,
            row,
            text: word.text.clone(),
            color: word.color(),
            bold: word.font_size >= BOLD_FONT_SIZE,
        });
    }
    labels
}

pub fn render(f: &mut Frame, area: Rect, cloud: &WordCloud, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(format!(" Word Cloud ({} words) ", cloud.words.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let buf = f.buffer_mut();
    for label in layout_labels(cloud, inner.width, inner.height) {
        let (r, g, b) = label.color;
        let mut style = Style::default().fg(Color::Rgb(r, g, b));
        if label.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        buf.set_string(inner.x + label.col, inner.y + label.row, &label.text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsviewer_core::WordCloudOptions;

    fn cloud() -> WordCloud {
        let text = "dataset dataset dataset dataset question question question answer \
                    answer context model viewer split record split";
        WordCloud::generate(text, &WordCloudOptions::default())
    }

    #[test]
    fn labels_fit_and_never_overlap() {
        let (cols, rows) = (60u16, 12u16);
        let labels = layout_labels(&cloud(), cols, rows);
        assert!(!labels.is_empty());

        let mut seen = vec![false; cols as usize * rows as usize];
        for label in &labels {
            let len = Span::raw(label.text.as_str()).width() as u16;
            assert!(label.col + len <= cols);
            assert!(label.row < rows);
            for c in label.col..label.col + len {
                let idx = label.row as usize * cols as usize + c as usize;
                assert!(!seen[idx], "overlap at {:?}", label);
                seen[idx] = true;
            }
        }
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let freqs: Vec<(String, usize)> = ["数据集", "问题", "答案", "上下文", "模型", "记录"]
            .iter()
            .enumerate()
            .map(|(i, w)| (w.to_string(), 12 - i))
            .collect();
        let cloud = WordCloud::from_frequencies(&freqs, &WordCloudOptions::default());
        let (cols, rows) = (24u16, 6u16);
        let labels = layout_labels(&cloud, cols, rows);
        assert!(!labels.is_empty());

        let mut seen = vec![false; cols as usize * rows as usize];
        for label in &labels {
            let width = Span::raw(label.text.as_str()).width() as u16;
            assert_eq!(width as usize, label.text.chars().count() * 2);
            assert!(label.col + width <= cols, "{:?} runs off the row", label);
            for c in label.col..label.col + width {
                let idx = label.row as usize * cols as usize + c as usize;
                assert!(!seen[idx], "overlap at {:?}", label);
                seen[idx] = true;
            }
        }
    }

    #[test]
    fn most_frequent_word_is_drawn_bold() {
        let labels = layout_labels(&cloud(), 80, 20);
        assert_eq!(labels[0].text, "dataset");
        assert!(labels[0].bold);
    }

    #[test]
    fn tiny_area_draws_nothing() {
        assert!(layout_labels(&cloud(), 0, 5).is_empty());
        assert!(layout_labels(&cloud(), 3, 1).iter().all(|l| l.text.len() <= 3));
    }
}
