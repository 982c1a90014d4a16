mod update;

use std::path::{Path, PathBuf};

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use dsviewer_core::config_file::Settings;
use dsviewer_core::preview::ImagePreview;
use dsviewer_core::{DatasetSource, Event, RenderPlan, Session};

use crate::model::controls::{Control, TextEdit};
use crate::theme::Theme;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextInput,
}

/// A decoded image preview, keyed by what it was decoded for.
pub struct PreviewEntry {
    pub path: PathBuf,
    pub cols: u16,
    pub rows: u16,
    pub result: Result<ImagePreview, String>,
}

/// Main application state.
pub struct App {
    pub session: Session,
    pub settings: Settings,
    /// Plan produced by the last render pass.
    pub plan: RenderPlan,
    /// Events waiting for the next render pass.
    pub pending: Vec<Event>,
    pub loading: bool,
    pub source_name: String,
    pub theme: Theme,
    pub input_mode: InputMode,
    /// Index into [`App::visible_controls`].
    pub focus: usize,
    /// Control being edited in text-input mode.
    pub editing: Option<Control>,
    pub edit: TextEdit,
    pub content_scroll: u16,
    /// Height of the content pane (set on resize, used for page up/down).
    pub visible_rows: u16,
    pub tick: usize,
    pub show_help: bool,
    pub should_quit: bool,
    /// One-line message shown in the footer until the next key press.
    pub status: Option<String>,
    pub preview: Option<PreviewEntry>,
}

impl App {
    pub fn new(settings: Settings, theme: Theme, source_name: impl Into<String>) -> Self {
        Self {
            session: Session::new(&settings),
            settings,
            plan: RenderPlan::default(),
            pending: vec![Event::Refresh],
            loading: false,
            source_name: source_name.into(),
            theme,
            input_mode: InputMode::Normal,
            focus: 0,
            editing: None,
            edit: TextEdit::default(),
            content_scroll: 0,
            visible_rows: 20,
            tick: 0,
            show_help: false,
            should_quit: false,
            status: None,
            preview: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Queue a session event for the next render pass.
    pub fn push_event(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Handle every queued event, then run one render pass.
    pub async fn dispatch(&mut self, source: &dyn DatasetSource) {
        if self.pending.is_empty() {
            return;
        }
        for event in self.pending.drain(..) {
            self.session.handle(event);
        }
        let plan = self.session.render(source).await;
        self.set_plan(plan);
        self.loading = false;
    }

    pub fn set_plan(&mut self, plan: RenderPlan) {
        let prev = &self.plan.controls;
        let moved = prev.name != plan.controls.name
            || prev.split != plan.controls.split
            || prev.index != plan.controls.index
            || prev.kind != plan.controls.kind;
        if moved {
            self.content_scroll = 0;
        }
        self.plan = plan;
        let count = self.visible_controls().len();
        self.focus = self.focus.min(count.saturating_sub(1));
    }

    pub fn visible_controls(&self) -> Vec<Control> {
        Control::visible(&self.plan.controls)
    }

    pub fn focused_control(&self) -> Option<Control> {
        self.visible_controls().get(self.focus).copied()
    }

    /// Decode (or reuse) the preview of `path` sized for `cols x rows`.
    pub fn ensure_preview(&mut self, path: &Path, cols: u16, rows: u16) {
        let fresh = self
            .preview
            .as_ref()
            .is_some_and(|p| p.path == path && p.cols == cols && p.rows == rows);
        if !fresh {
            let result = ImagePreview::load(path, cols, rows).map_err(|e| {
                tracing::warn!("cannot preview {}: {}", path.display(), e);
                format!("Cannot display image: {}", e)
            });
            self.preview = Some(PreviewEntry {
                path: path.to_path_buf(),
                cols,
                rows,
                result,
            });
        }
    }

    /// Render the full UI.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        if self.plan.blocks.is_empty() {
            crate::view::banner::render(f, &self.theme, self.tick);
            return;
        }

        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(f, header_area);

        let [sidebar_area, content_area] =
            Layout::horizontal([Constraint::Length(36), Constraint::Min(20)]).areas(body_area);
        crate::view::sidebar::render(f, self, sidebar_area);
        crate::view::content::render(f, self, content_area);

        self.render_footer(f, footer_area);

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }

    fn render_header(&self, f: &mut ratatui::Frame, area: Rect) {
        let theme = &self.theme;
        let mut spans = vec![
            Span::styled(" DSVIEWER ", theme.header_style()),
            Span::styled(
                format!("  source: {}", self.source_name),
                ratatui::style::Style::default().fg(theme.dim),
            ),
        ];
        if let Some(split) = &self.plan.controls.split {
            spans.push(Span::styled(
                format!("  {}[{}]", self.plan.controls.name, split),
                ratatui::style::Style::default().fg(theme.text),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_footer(&self, f: &mut ratatui::Frame, area: Rect) {
        let style = self.theme.footer_style();
        let footer = if self.loading {
            Line::from(vec![
                Span::styled(
                    format!(" {}", crate::view::spinner_char(self.tick)),
                    style.fg(self.theme.spinner),
                ),
                Span::styled(format!(" Loading {}...", self.session.name()), style),
            ])
        } else if let Some(status) = &self.status {
            Line::from(Span::styled(format!(" {}", status), style))
        } else if self.input_mode == InputMode::TextInput {
            Line::from(Span::styled(" Type value, Enter:confirm, Esc:cancel", style))
        } else {
            Line::from(Span::styled(
                " j/k:control  h/l:change  Enter:edit/toggle  PgUp/PgDn:scroll  Ctrl+S:save  ?:help  q:quit",
                style,
            ))
        };
        f.render_widget(Paragraph::new(footer), area);
    }
}
