//! ANSI control sequences and foreground colours.

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const CLEAR_LINE: &str = "\x1b[2K";
pub const CARRIAGE: &str = "\r";
pub const RESET: &str = "\x1b[0m";

/// A terminal foreground colour.
///
/// Displays as the SGR sequence that selects it:
///
/// ```rust,ignore
/// assert_eq!(Color::Green.to_string(), "\x1b[32m");
/// assert_eq!(Color::BrightRed.to_string(), "\x1b[91m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    Black,
    Red,
    #[default]
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// Raw SGR parameter, e.g. `Ansi(38)` is emitted as `ESC[38m`.
    Ansi(u8),
}

impl Color {
    /// The SGR parameter for this colour.
    pub fn code(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::White => 37,
            Color::BrightBlack => 90,
            Color::BrightRed => 91,
            Color::BrightGreen => 92,
            Color::BrightYellow => 93,
            Color::BrightBlue => 94,
            Color::BrightMagenta => 95,
            Color::BrightCyan => 96,
            Color::BrightWhite => 97,
            Color::Ansi(code) => code,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[{}m", self.code())
    }
}

/// Wraps a value in a colour and a trailing reset.
pub(crate) struct Painted<T>(pub Color, pub T);

impl<T: std::fmt::Display> std::fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{RESET}", self.0, self.1)
    }
}
