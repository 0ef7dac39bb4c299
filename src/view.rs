use std::env;

use chrono::NaiveDate;
use clap::ValueEnum;
use ratatui::{
    prelude::{Line, Span},
    style::{Color, Modifier, Style},
};

use crate::{
    calendar::{
        ContributionsGrid, DateRange, build_grid, build_grid_with_capacity, contributions_date_range,
        date_range_ending, format_date,
    },
    constants::{
        ASCII_GLYPHS, DAY_LABELS, DEFAULT_ACTIVITY_COLOR, ENV_VARS, EXTENDED_GLYPHS, GRID_SETTINGS,
        GlyphSet, LEVEL_COLORS, NAMED_COLORS, UNICODE_GLYPHS,
    },
    domain::{ProcessedActivity, completion_for, level_for_aggregate, level_for_single},
};

const LABEL_WIDTH: usize = 2;
const CELL_WIDTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GlyphMode {
    Ascii,
    Extended,
    Unicode,
}

impl GlyphMode {
    pub fn glyphs(self) -> &'static GlyphSet {
        match self {
            GlyphMode::Ascii => &ASCII_GLYPHS,
            GlyphMode::Extended => &EXTENDED_GLYPHS,
            GlyphMode::Unicode => &UNICODE_GLYPHS,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ascii" => Some(GlyphMode::Ascii),
            "extended" | "ascii-extended" => Some(GlyphMode::Extended),
            "unicode" => Some(GlyphMode::Unicode),
            _ => None,
        }
    }

    /// Guess from the terminal name and locale.
    pub fn detect(term: &str, lang: &str, lc_all: &str) -> Self {
        let term = term.to_lowercase();
        let utf8 = [lang, lc_all]
            .iter()
            .any(|value| value.to_uppercase().replace('-', "").contains("UTF8"));

        const MODERN: [&str; 7] = [
            "256color",
            "alacritty",
            "kitty",
            "iterm",
            "gnome",
            "wezterm",
            "foot",
        ];
        const BOX_CAPABLE: [&str; 6] = ["xterm", "screen", "tmux", "ansi", "vt1", "vt2"];

        if utf8 && MODERN.iter().any(|name| term.contains(name)) {
            GlyphMode::Unicode
        } else if BOX_CAPABLE.iter().any(|name| term.contains(name)) {
            GlyphMode::Extended
        } else {
            GlyphMode::Ascii
        }
    }

    pub fn resolve(flag: Option<GlyphMode>) -> Self {
        if let Some(mode) = flag {
            return mode;
        }
        if let Some(mode) = env::var(ENV_VARS.glyphs)
            .ok()
            .and_then(|value| Self::from_name(&value))
        {
            return mode;
        }
        let var = |name: &str| env::var(name).unwrap_or_default();
        Self::detect(&var("TERM"), &var("LANG"), &var("LC_ALL"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Timeline {
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "12m", alias = "1y")]
    TwelveMonths,
}

impl Timeline {
    pub fn days(self) -> i64 {
        match self {
            Timeline::ThreeMonths => 90,
            Timeline::SixMonths => 180,
            Timeline::TwelveMonths => GRID_SETTINGS.window_days,
        }
    }

    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            Timeline::TwelveMonths => contributions_date_range(today),
            _ => date_range_ending(today, self.days()),
        }
    }

    /// The yearly view keeps the fixed 53-week layout.
    pub fn grid(self, today: NaiveDate) -> ContributionsGrid {
        let range = self.range(today);
        match self {
            Timeline::TwelveMonths => {
                build_grid_with_capacity(&range, GRID_SETTINGS.max_weeks)
            }
            _ => build_grid(&range),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeline::ThreeMonths => "3 months",
            Timeline::SixMonths => "6 months",
            Timeline::TwelveMonths => "12 months",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Timeline::ThreeMonths => Timeline::SixMonths,
            Timeline::SixMonths => Timeline::TwelveMonths,
            Timeline::TwelveMonths => Timeline::ThreeMonths,
        }
    }
}

pub fn color_for_name(name: Option<&str>) -> Color {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return DEFAULT_ACTIVITY_COLOR;
    };

    if let Some((_, color)) = NAMED_COLORS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
    {
        return *color;
    }

    parse_hex_color(name).unwrap_or(Color::White)
}

fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// What a grid cell is shaded by.
#[derive(Clone, Copy)]
pub enum CellSource<'a> {
    Single(&'a ProcessedActivity),
    Aggregate(&'a [&'a ProcessedActivity]),
}

impl CellSource<'_> {
    pub fn level(&self, date_key: &str) -> u8 {
        match self {
            CellSource::Single(activity) if activity.target_per_day > 1 => {
                completion_for(date_key, activity).level()
            }
            CellSource::Single(activity) => level_for_single(date_key, activity),
            CellSource::Aggregate(activities) => level_for_aggregate(date_key, activities),
        }
    }

    fn color(&self, level: u8) -> Color {
        if level == 0 {
            return LEVEL_COLORS[0];
        }
        match self {
            CellSource::Single(activity) => color_for_name(activity.color.as_deref()),
            CellSource::Aggregate(_) => LEVEL_COLORS[(level as usize).min(LEVEL_COLORS.len() - 1)],
        }
    }
}

pub fn month_header_line(grid: &ContributionsGrid) -> Line<'static> {
    let width = LABEL_WIDTH + grid.weeks() * CELL_WIDTH;
    let mut header = vec![' '; width];

    let mut next_free = 0usize;
    for (week, name) in grid.month_labels() {
        let at = LABEL_WIDTH + week * CELL_WIDTH;
        if at < next_free || at + name.len() > width {
            continue;
        }
        for (offset, ch) in name.chars().enumerate() {
            header[at + offset] = ch;
        }
        next_free = at + name.len() + 1;
    }

    Line::from(Span::styled(
        header.into_iter().collect::<String>().trim_end().to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

/// Seven rows, Sunday first, one glyph per week column.
pub fn grid_lines(
    grid: &ContributionsGrid,
    source: CellSource<'_>,
    glyphs: &GlyphSet,
    cursor: Option<(usize, usize)>,
) -> Vec<Line<'static>> {
    DAY_LABELS
        .iter()
        .enumerate()
        .map(|(day, label)| {
            let mut spans = vec![Span::styled(
                format!("{:<width$}", label, width = LABEL_WIDTH),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )];

            for week in 0..grid.weeks() {
                let Some(date) = grid.cell(week, day) else {
                    spans.push(Span::raw(format!("{} ", glyphs.blank)));
                    continue;
                };

                let level = source.level(&format_date(date));
                let glyph = glyphs.levels[(level as usize).min(glyphs.levels.len() - 1)];
                let mut style = Style::default().fg(source.color(level));
                if cursor == Some((week, day)) {
                    style = Style::default().fg(Color::Black).bg(Color::Cyan);
                }
                spans.push(Span::styled(glyph, style));
                spans.push(Span::raw(" "));
            }

            Line::from(spans)
        })
        .collect()
}

pub fn activity_title_line(number: Option<usize>, activity: &ProcessedActivity) -> Line<'static> {
    let text = match number {
        Some(n) => format!("[{}] {} ({} activities)", n, activity.name, activity.total_count),
        None => format!("{} ({} activities)", activity.name, activity.total_count),
    };
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(color_for_name(activity.color.as_deref()))
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn legend_line(glyphs: &GlyphSet) -> Line<'static> {
    let mut spans = vec![
        Span::raw(" ".repeat(LABEL_WIDTH)),
        Span::styled("Less ", Style::default().fg(Color::DarkGray)),
    ];
    for (level, glyph) in glyphs.levels.iter().enumerate() {
        spans.push(Span::styled(
            *glyph,
            Style::default().fg(LEVEL_COLORS[level]),
        ));
    }
    spans.push(Span::styled(" More", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::{
        calendar::{build_grid, contributions_date_range, parse_date},
        domain::{Activity, ProcessedActivity},
    };

    use super::*;

    fn activity(color: Option<&str>, dates: &[&str]) -> ProcessedActivity {
        ProcessedActivity::from_raw(&Activity {
            name: "Run".to_string(),
            color: color.map(str::to_string),
            dates: dates.iter().map(|d| d.to_string()).collect(),
            target_per_day: None,
        })
    }

    #[test]
    fn test_detect_glyph_mode() {
        assert_eq!(
            GlyphMode::detect("xterm-256color", "en_US.UTF-8", ""),
            GlyphMode::Unicode
        );
        assert_eq!(GlyphMode::detect("xterm", "C", ""), GlyphMode::Extended);
        assert_eq!(GlyphMode::detect("dumb", "", ""), GlyphMode::Ascii);
        assert_eq!(GlyphMode::from_name(" ASCII "), Some(GlyphMode::Ascii));
        assert_eq!(GlyphMode::from_name("emoji"), None);
    }

    #[test]
    fn test_color_for_name() {
        assert_eq!(color_for_name(Some("Red")), Color::Red);
        assert_eq!(color_for_name(None), DEFAULT_ACTIVITY_COLOR);
        assert_eq!(color_for_name(Some("#ff8000")), Color::Rgb(255, 128, 0));
        assert_eq!(color_for_name(Some("chartreuse")), Color::White);
    }

    #[test]
    fn test_timeline_cycles() {
        assert_eq!(Timeline::TwelveMonths.next(), Timeline::ThreeMonths);
        assert_eq!(Timeline::ThreeMonths.next().days(), 180);

        let today = parse_date("2024-06-12").unwrap();
        assert_eq!(Timeline::TwelveMonths.range(today), contributions_date_range(today));
        assert_eq!(Timeline::ThreeMonths.range(today).len_days(), 90);
        assert_eq!(Timeline::ThreeMonths.range(today).end, today);
        assert_eq!(Timeline::TwelveMonths.grid(today).weeks(), 53);
        assert_eq!(
            Timeline::TwelveMonths.grid(today),
            build_grid(&contributions_date_range(today))
        );
    }

    #[test]
    fn test_grid_lines_mark_active_days() {
        let today = parse_date("2024-06-09").unwrap();
        let grid = build_grid(&contributions_date_range(today));
        let run = activity(Some("green"), &["2024-06-09"]);

        let lines = grid_lines(&grid, CellSource::Single(&run), &ASCII_GLYPHS, None);
        assert_eq!(lines.len(), 7);

        let text = plain_text(&lines);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("S ."));
        assert!(rows[0].ends_with('-'));
        assert!(!rows[1].contains('-'));
        assert_eq!(rows[0].chars().count(), 2 + 53 * 2 - 1);
    }

    #[test]
    fn test_single_source_uses_target_when_set() {
        let day = "2024-06-09";
        let once = activity(None, &[day]);
        assert_eq!(CellSource::Single(&once).level(day), 1);

        let mut twice = activity(None, &[day]);
        twice.target_per_day = 2;
        assert_eq!(CellSource::Single(&twice).level(day), 2);
        assert_eq!(CellSource::Single(&twice).level("2024-06-10"), 0);
    }

    #[test]
    fn test_aggregate_source_never_draws_level_four() {
        let day = "2024-06-09";
        let a = activity(None, &[day]);
        let b = activity(None, &[day]);
        let c = activity(None, &[day]);
        let d = activity(None, &[day]);
        let all = [&a, &b, &c, &d];
        let source = CellSource::Aggregate(&all);

        assert_eq!(source.level(day), 3);
        assert_eq!(source.color(3), LEVEL_COLORS[3]);
    }

    #[test]
    fn test_month_header_and_legend() {
        let grid = build_grid(&contributions_date_range(parse_date("2024-06-12").unwrap()));
        let header = plain_text(&[month_header_line(&grid)]);
        assert!(header.contains("Jul"));
        assert!(header.contains("Jun"));

        let legend = plain_text(&[legend_line(&ASCII_GLYPHS)]);
        assert_eq!(legend, "  Less .-+## More");
    }
}
