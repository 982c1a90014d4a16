use ratatui::style::{Color, Modifier, Style};

use dsviewer_core::Role;

/// Palette for the viewer. Chat roles and diagnostics get their own colors.
pub struct Theme {
    pub name: &'static str,

    pub error: Color,
    pub warning: Color,
    pub user: Color,
    pub robot: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Green-on-black, the default.
    pub fn hacker() -> Self {
        Self {
            name: "hacker",
            error: Color::LightRed,
            warning: Color::Yellow,
            user: Color::LightCyan,
            robot: Color::LightGreen,

            header_fg: Color::Black,
            header_bg: Color::Green,
            border: Color::Rgb(40, 90, 40),
            text: Color::Rgb(200, 255, 200),
            dim: Color::Rgb(90, 130, 90),
            highlight_bg: Color::Rgb(20, 60, 20),
            active: Color::LightGreen,
            spinner: Color::LightGreen,
            footer_fg: Color::Rgb(90, 130, 90),
            footer_bg: Color::Reset,
        }
    }

    /// Slate background accents with amber highlights.
    pub fn modern() -> Self {
        Self {
            name: "modern",
            error: Color::Rgb(240, 90, 90),
            warning: Color::Rgb(250, 180, 40),
            user: Color::Rgb(110, 170, 250),
            robot: Color::Rgb(120, 210, 140),

            header_fg: Color::Rgb(20, 24, 32),
            header_bg: Color::Rgb(250, 180, 40),
            border: Color::Rgb(70, 78, 96),
            text: Color::Rgb(225, 228, 235),
            dim: Color::Rgb(130, 138, 155),
            highlight_bg: Color::Rgb(44, 52, 70),
            active: Color::Rgb(250, 180, 40),
            spinner: Color::Rgb(110, 170, 250),
            footer_fg: Color::Rgb(130, 138, 155),
            footer_bg: Color::Reset,
        }
    }

    /// Look a theme up by name, falling back to `hacker`.
    pub fn by_name(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    pub fn role_color(&self, role: Role) -> Color {
        match role {
            Role::User => self.user,
            Role::Robot => self.robot,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }

    pub fn section_style(&self) -> Style {
        Style::default().fg(self.active).add_modifier(Modifier::BOLD)
    }
}
