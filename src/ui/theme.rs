use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub title_fg: Color,
    pub title_accent: Color,
    pub label_fg: Color,
    pub bar_filled: Color,
    pub border: Color,
    pub header_fg: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub state_ok: Color,
    pub state_blocked: Color,
    pub state_zombie: Color,
    pub user_fg: Color,
    pub memory_fg: Color,
    pub selection_bg: Color,
    pub statusbar_bg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
}

impl Theme {
    /// `show_colors = false` always wins over the named theme.
    pub fn from_config(theme_name: &str, show_colors: bool) -> Self {
        if !show_colors {
            return Self::mono();
        }
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::default_theme(),
        }
    }

    /// Colour for a single-letter process state code.
    pub fn state_color(&self, state: char) -> Color {
        match state {
            'Z' => self.state_zombie,
            'D' => self.state_blocked,
            _ => self.state_ok,
        }
    }

    pub fn default_theme() -> Self {
        Theme {
            name: "default",
            title_fg: Color::LightCyan,
            title_accent: Color::LightMagenta,
            label_fg: Color::LightYellow,
            bar_filled: Color::LightGreen,
            border: Color::LightBlue,
            header_fg: Color::LightBlue,
            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            state_ok: Color::LightGreen,
            state_blocked: Color::LightYellow,
            state_zombie: Color::LightRed,
            user_fg: Color::LightCyan,
            memory_fg: Color::LightMagenta,
            selection_bg: Color::Rgb(49, 50, 68),
            statusbar_bg: Color::Reset,
            pill_key_bg: Color::LightYellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::Gray,
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            title_fg: Color::Blue,
            title_accent: Color::Magenta,
            label_fg: Color::Rgb(150, 100, 0),
            bar_filled: Color::Rgb(0, 120, 0),
            border: Color::Rgb(150, 150, 150),
            header_fg: Color::Blue,
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            state_ok: Color::Rgb(0, 120, 0),
            state_blocked: Color::Rgb(200, 100, 0),
            state_zombie: Color::Red,
            user_fg: Color::Rgb(0, 110, 140),
            memory_fg: Color::Magenta,
            selection_bg: Color::Rgb(220, 220, 220),
            statusbar_bg: Color::Reset,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            title_fg: Color::Reset,
            title_accent: Color::Reset,
            label_fg: Color::Reset,
            bar_filled: Color::Reset,
            border: Color::Reset,
            header_fg: Color::Reset,
            text_primary: Color::Reset,
            text_secondary: Color::Reset,
            state_ok: Color::Reset,
            state_blocked: Color::Reset,
            state_zombie: Color::Reset,
            user_fg: Color::Reset,
            memory_fg: Color::Reset,
            selection_bg: Color::Reset,
            statusbar_bg: Color::Reset,
            pill_key_bg: Color::Reset,
            pill_key_fg: Color::Reset,
            pill_desc_fg: Color::Reset,
        }
    }
}
