use dsviewer_core::Event;
use dsviewer_core::config_file;

use super::{App, InputMode};
use crate::action::Action;
use crate::model::controls::{Control, TextEdit};

/// Index step for `H` / `L`.
const BIG_STEP: usize = 10;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                return false;
            }
            Action::Resize(_w, h) => {
                self.visible_rows = h.saturating_sub(4);
                return false;
            }
            Action::None => return false,
            _ => {}
        }

        if action == Action::Quit {
            self.should_quit = true;
            return true;
        }
        self.status = None;

        // Help overlay swallows everything but its own toggles
        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::NavigateBack) {
                self.show_help = false;
            }
            return false;
        }

        if self.input_mode == InputMode::TextInput {
            self.update_text_input(action);
            return false;
        }

        match action {
            Action::MoveDown => {
                let count = self.visible_controls().len();
                if count > 0 {
                    self.focus = (self.focus + 1) % count;
                }
            }
            Action::MoveUp => {
                let count = self.visible_controls().len();
                if count > 0 {
                    self.focus = (self.focus + count - 1) % count;
                }
            }
            Action::Decrease => self.step_focused(-1),
            Action::Increase => self.step_focused(1),
            Action::DecreaseMore => self.step_focused(-(BIG_STEP as i64)),
            Action::IncreaseMore => self.step_focused(BIG_STEP as i64),
            Action::Activate => self.activate_focused(),
            Action::ScrollDown => self.content_scroll = self.content_scroll.saturating_add(1),
            Action::ScrollUp => self.content_scroll = self.content_scroll.saturating_sub(1),
            Action::PageDown => {
                self.content_scroll = self.content_scroll.saturating_add(self.page());
            }
            Action::PageUp => {
                self.content_scroll = self.content_scroll.saturating_sub(self.page());
            }
            Action::GoTop => self.content_scroll = 0,
            Action::GoBottom => self.content_scroll = u16::MAX,
            Action::ToggleHelp => self.show_help = true,
            Action::Reload => self.push_event(Event::Reload),
            Action::SaveConfig => self.save_config(),
            _ => {}
        }
        false
    }

    fn page(&self) -> u16 {
        self.visible_rows.saturating_sub(2).max(1)
    }

    /// Move the focused control's value by `delta` steps.
    fn step_focused(&mut self, delta: i64) {
        let Some(control) = self.focused_control() else {
            return;
        };
        let controls = &self.plan.controls;
        match control {
            Control::Kind => {
                let kind = controls.kind.next();
                self.push_event(Event::SetKind(kind));
            }
            Control::Split => {
                let current = controls
                    .split
                    .as_ref()
                    .and_then(|s| controls.splits.iter().position(|x| x == s))
                    .unwrap_or(0);
                let last = controls.splits.len().saturating_sub(1);
                let next = offset(current, delta.signum(), last);
                if next != current
                    && let Some(split) = controls.splits.get(next)
                {
                    let split = split.clone();
                    self.push_event(Event::SetSplit(split));
                }
            }
            Control::Index => {
                let Some(max) = controls.max_index else {
                    return;
                };
                let next = offset(controls.index, delta, max);
                if next != controls.index {
                    self.push_event(Event::SetIndex(next));
                }
            }
            Control::WordCloud => {
                let on = !controls.wordcloud;
                self.push_event(Event::SetWordCloud(on));
            }
            Control::Image => {
                let last = controls.images.len().saturating_sub(1);
                let next = offset(controls.image_index, delta.signum(), last);
                if next != controls.image_index {
                    self.push_event(Event::SetImageIndex(next));
                }
            }
            Control::Name | Control::ImageFolder => {}
        }
    }

    fn activate_focused(&mut self) {
        let Some(control) = self.focused_control() else {
            return;
        };
        if control.is_text() {
            let controls = &self.plan.controls;
            let initial = match control {
                Control::Name => controls.name.clone(),
                Control::Index => controls.index.to_string(),
                Control::ImageFolder => controls.image_folder.clone(),
                _ => String::new(),
            };
            self.edit = TextEdit::new(&initial);
            self.editing = Some(control);
            self.input_mode = InputMode::TextInput;
            return;
        }
        match control {
            Control::Kind | Control::WordCloud => self.step_focused(1),
            _ => {}
        }
    }

    fn update_text_input(&mut self, action: Action) {
        match action {
            Action::SearchCancel => self.stop_editing(),
            Action::SearchConfirm => {
                if let Some(control) = self.editing {
                    self.commit_edit(control);
                }
                self.stop_editing();
            }
            Action::SearchInput('\x08') => self.edit.backspace(),
            Action::SearchInput(ch) => self.edit.insert(ch),
            Action::CursorLeft => self.edit.left(),
            Action::CursorRight => self.edit.right(),
            Action::CursorHome => self.edit.home(),
            Action::CursorEnd => self.edit.end(),
            _ => {}
        }
    }

    fn commit_edit(&mut self, control: Control) {
        let value = self.edit.buffer.trim().to_string();
        match control {
            Control::Name => {
                if value.is_empty() {
                    self.status = Some("Dataset name cannot be empty".to_string());
                } else if value != self.plan.controls.name {
                    self.push_event(Event::SetName(value));
                }
            }
            Control::Index => match value.parse::<usize>() {
                Ok(index) => {
                    let max = self.plan.controls.max_index.unwrap_or(0);
                    self.push_event(Event::SetIndex(index.min(max)));
                }
                Err(_) => {
                    self.status = Some(format!("Not a valid index: '{}'", value));
                }
            },
            Control::ImageFolder => self.push_event(Event::SetImageFolder(value)),
            _ => {}
        }
    }

    fn stop_editing(&mut self) {
        self.editing = None;
        self.input_mode = InputMode::Normal;
    }

    /// Persist the current dataset names, image folder and theme.
    fn save_config(&mut self) {
        let controls = &self.plan.controls;
        match controls.kind {
            dsviewer_core::DatasetKind::QuestionAnswering => {
                self.settings.qa_dataset = controls.name.clone();
            }
            dsviewer_core::DatasetKind::Multimodal => {
                self.settings.multimodal_dataset = controls.name.clone();
            }
        }
        self.settings.image_folder = controls.image_folder.clone();
        self.settings.theme = self.theme.name.to_string();

        self.status = Some(match config_file::save_config(&self.settings.to_config_file()) {
            Ok(path) => {
                tracing::info!("saved config to {}", path.display());
                format!("Config saved to {}", path.display())
            }
            Err(e) => {
                tracing::warn!("saving config failed: {}", e);
                format!("Save failed: {}", e)
            }
        });
    }
}

/// `current + delta`, clamped to `[0, max]`.
fn offset(current: usize, delta: i64, max: usize) -> usize {
    let next = current as i64 + delta;
    next.clamp(0, max as i64) as usize
}
