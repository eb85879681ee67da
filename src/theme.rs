use crate::ansi::Color;

/// The frames a [`crate::Spinner`] cycles through.
///
/// Always holds at least one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTheme {
    frames: &'static [&'static str],
}

impl AnimationTheme {
    /// Custom frames.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty.
    pub fn custom(frames: &'static [&'static str]) -> Self {
        assert!(!frames.is_empty(), "an animation theme needs at least one frame");
        Self { frames }
    }

    pub fn frames(&self) -> &'static [&'static str] {
        self.frames
    }

    /// Frame for the given tick, wrapping around the frame list.
    pub fn frame(&self, index: usize) -> &'static str {
        self.frames[index % self.frames.len()]
    }
}

impl Default for AnimationTheme {
    fn default() -> Self {
        SpinnerStyle::Dots.theme()
    }
}

impl From<SpinnerStyle> for AnimationTheme {
    fn from(style: SpinnerStyle) -> Self {
        style.theme()
    }
}

/// Named spinner animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpinnerStyle {
    /// Braille dot spinner (the most common choice).
    #[default]
    Dots,
    Line,
    Arrow,
    Earth,
    Clock,
    /// Rising and falling block.
    Wave,
}

impl SpinnerStyle {
    pub const ALL: [SpinnerStyle; 6] = [
        SpinnerStyle::Dots,
        SpinnerStyle::Line,
        SpinnerStyle::Arrow,
        SpinnerStyle::Earth,
        SpinnerStyle::Clock,
        SpinnerStyle::Wave,
    ];

    pub fn theme(self) -> AnimationTheme {
        let frames: &'static [&'static str] = match self {
            SpinnerStyle::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            SpinnerStyle::Line => &["-", "\\", "|", "/"],
            SpinnerStyle::Arrow => &["→", "↘", "↓", "↙", "←", "↖", "↑", "↗"],
            SpinnerStyle::Earth => &["🌍", "🌎", "🌏"],
            SpinnerStyle::Clock => &[
                "🕛", "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚",
            ],
            SpinnerStyle::Wave => &[
                "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█", "▇", "▆", "▅", "▄", "▃", "▂", "▁",
            ],
        };
        AnimationTheme { frames }
    }
}

/// Glyphs and colour of a [`crate::ProgressBar`].
///
/// ```rust,ignore
/// let theme = BarTheme { width: 10, ..BarStyle::Hash.theme() };
/// // => [#####.....]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarTheme {
    /// Number of fill/empty cells between the borders.
    pub width: usize,
    pub fill: &'static str,
    pub empty: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub color: Color,
}

impl Default for BarTheme {
    fn default() -> Self {
        BarStyle::Classic.theme()
    }
}

impl From<BarStyle> for BarTheme {
    fn from(style: BarStyle) -> Self {
        style.theme()
    }
}

/// Named progress bar looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BarStyle {
    #[default]
    Classic,
    Bold,
    Minimal,
    Hash,
    Emoji,
    Rounded,
    Striped,
    Dot,
    Heart,
    Music,
    Dna,
    Pixel,
}

impl BarStyle {
    pub const ALL: [BarStyle; 12] = [
        BarStyle::Classic,
        BarStyle::Bold,
        BarStyle::Minimal,
        BarStyle::Hash,
        BarStyle::Emoji,
        BarStyle::Rounded,
        BarStyle::Striped,
        BarStyle::Dot,
        BarStyle::Heart,
        BarStyle::Music,
        BarStyle::Dna,
        BarStyle::Pixel,
    ];

    pub fn theme(self) -> BarTheme {
        let (width, fill, empty, left, right, color) = match self {
            BarStyle::Classic => (30, "=", "-", "[", "]", Color::Blue),
            BarStyle::Bold => (50, "■", " ", "❮", "❯", Color::Magenta),
            BarStyle::Minimal => (20, "*", " ", "", "", Color::Cyan),
            BarStyle::Hash => (40, "#", ".", "[", "]", Color::Green),
            BarStyle::Emoji => (25, "🚀", "✨", "🚩", "🎯", Color::Yellow),
            BarStyle::Rounded => (30, "●", "○", "(", ")", Color::BrightCyan),
            BarStyle::Striped => (40, "▉", "▏", "[", "]", Color::BrightRed),
            BarStyle::Dot => (35, "•", "·", "{", "}", Color::BrightBlue),
            BarStyle::Heart => (25, "❤", "♡", "❤", "❤", Color::Red),
            BarStyle::Music => (35, "♫", "♩", "♪", "♪", Color::BrightMagenta),
            BarStyle::Dna => (30, "▰", "▱", "⎡", "⎤", Color::BrightGreen),
            BarStyle::Pixel => (40, "█", " ░", "▐", "▌", Color::BrightBlack),
        };
        BarTheme {
            width,
            fill,
            empty,
            left,
            right,
            color,
        }
    }
}
