/// Everything the user can ask the TUI to do, decoupled from key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Focus the next / previous sidebar control.
    MoveDown,
    MoveUp,
    /// Change the focused control's value.
    Decrease,
    Increase,
    /// Large step for numeric controls.
    DecreaseMore,
    IncreaseMore,
    /// Edit a text control or toggle a checkbox.
    Activate,
    NavigateBack,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    ToggleHelp,
    Reload,
    SaveConfig,
    /// Text entry; `'\x08'` is backspace.
    SearchInput(char),
    SearchConfirm,
    SearchCancel,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Tick,
    Resize(u16, u16),
    None,
}
