use ratatui::style::Color;

pub const GRID_SETTINGS: GridSettings = GridSettings {
    window_days: 365,
    max_weeks: 53,
    days_per_week: 7,
};

pub const FILE_PATHS: FilePaths = FilePaths {
    default_data_file: "data/activities.json",
    data_file_name: "activities.json",
};

pub const ENV_VARS: EnvVars = EnvVars {
    data_file: "TESSERA_DATA_FILE",
    glyphs: "TESSERA_GLYPHS",
    log: "TESSERA_LOG",
};

pub const DAY_LABELS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// Index is the intensity level. Level 4 is drawable but no scorer emits it.
pub const ASCII_GLYPHS: GlyphSet = GlyphSet {
    levels: [".", "-", "+", "#", "#"],
    blank: " ",
};

pub const EXTENDED_GLYPHS: GlyphSet = GlyphSet {
    levels: ["░", "▒", "▓", "█", "█"],
    blank: " ",
};

pub const UNICODE_GLYPHS: GlyphSet = GlyphSet {
    levels: ["○", "◐", "◑", "●", "●"],
    blank: " ",
};

pub const LEVEL_COLORS: [Color; 5] = [
    Color::DarkGray,
    Color::Rgb(14, 68, 41),
    Color::Rgb(0, 109, 50),
    Color::Rgb(38, 166, 65),
    Color::Rgb(57, 211, 83),
];

pub const NAMED_COLORS: [(&str, Color); 8] = [
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("gray", Color::DarkGray),
    ("white", Color::White),
];

pub const DEFAULT_ACTIVITY_COLOR: Color = Color::Green;

pub const TIME_SETTINGS: TimeSettings = TimeSettings { poll_ms: 250 };

pub struct GridSettings {
    pub window_days: i64,
    /// Fixed column count of the classic contributions layout.
    pub max_weeks: usize,
    pub days_per_week: usize,
}

pub struct FilePaths {
    pub default_data_file: &'static str,
    pub data_file_name: &'static str,
}

pub struct EnvVars {
    pub data_file: &'static str,
    pub glyphs: &'static str,
    pub log: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct GlyphSet {
    pub levels: [&'static str; 5],
    pub blank: &'static str,
}

pub struct TimeSettings {
    pub poll_ms: u64,
}
