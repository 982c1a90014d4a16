use dsviewer_core::{Controls, DatasetKind};

/// One sidebar control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Kind,
    Name,
    Split,
    Index,
    WordCloud,
    ImageFolder,
    Image,
}

impl Control {
    pub fn label(self, kind: DatasetKind) -> &'static str {
        match self {
            Control::Kind => "Select Dataset Type",
            Control::Name => match kind {
                DatasetKind::QuestionAnswering => "Enter QA Dataset Name",
                DatasetKind::Multimodal => "Enter Multimodal Dataset Name",
            },
            Control::Split => "Select Dataset Split",
            Control::Index => "Index",
            Control::WordCloud => "Show Word Cloud",
            Control::ImageFolder => "Image Folder",
            Control::Image => "Select Image",
        }
    }

    /// Controls edited through a text buffer.
    pub fn is_text(self) -> bool {
        matches!(self, Control::Name | Control::Index | Control::ImageFolder)
    }

    /// Controls shown for the current sidebar state, top to bottom.
    pub fn visible(controls: &Controls) -> Vec<Control> {
        let mut out = vec![Control::Kind, Control::Name];
        if !controls.splits.is_empty() {
            out.push(Control::Split);
        }
        if controls.max_index.is_some() {
            out.push(Control::Index);
        }
        if controls.wordcloud_available {
            out.push(Control::WordCloud);
        }
        if controls.image_folder_available {
            out.push(Control::ImageFolder);
            if !controls.images.is_empty() {
                out.push(Control::Image);
            }
        }
        out
    }
}

/// Single-line text buffer with a byte cursor on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEdit {
    pub buffer: String,
    pub cursor: usize,
}

impl TextEdit {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: initial.to_string(),
            cursor: initial.len(),
        }
    }

    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.buffer.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn left(&mut self) {
        if let Some((i, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = i;
        }
    }

    pub fn right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Buffer split at the cursor, for drawing a caret between the halves.
    pub fn split(&self) -> (&str, &str) {
        self.buffer.split_at(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_controls_follow_plan() {
        let mut controls = Controls {
            wordcloud_available: true,
            ..Controls::default()
        };
        assert_eq!(
            Control::visible(&controls),
            vec![Control::Kind, Control::Name, Control::WordCloud]
        );

        controls.splits = vec!["train".into()];
        controls.max_index = Some(3);
        controls.wordcloud_available = false;
        controls.image_folder_available = true;
        controls.images = vec!["a.jpg".into()];
        assert_eq!(
            Control::visible(&controls),
            vec![
                Control::Kind,
                Control::Name,
                Control::Split,
                Control::Index,
                Control::ImageFolder,
                Control::Image
            ]
        );
    }

    #[test]
    fn text_edit_handles_multibyte() {
        let mut edit = TextEdit::new("sq");
        edit.insert('é');
        edit.left();
        edit.insert('u');
        assert_eq!(edit.buffer, "squé");
        edit.end();
        edit.backspace();
        assert_eq!(edit.buffer, "squ");
        edit.home();
        edit.backspace();
        assert_eq!(edit.buffer, "squ");
        edit.right();
        assert_eq!(edit.split(), ("s", "qu"));
    }
}
