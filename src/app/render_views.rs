use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::{
    calendar::format_date,
    view::{self, CellSource},
};

use super::{App, ui_helpers};

impl App {
    pub(super) fn title_text(&self) -> String {
        let timeline = self.timeline.label();
        match self.snapshot.activities.by_index(self.selected_index) {
            Some((_, activity)) if self.in_single_view() => {
                format!("Activity Tracker - {} ({})", activity.name, timeline)
            }
            _ => format!("Activity Tracker - All Activities ({})", timeline),
        }
    }

    pub(super) fn body_lines(&self) -> Vec<Line<'static>> {
        let grid = &self.snapshot.grid;
        let glyphs = self.glyph_mode.glyphs();
        let mut lines = Vec::new();

        if self.in_single_view() {
            if let Some((_, activity)) = self.snapshot.activities.by_index(self.selected_index) {
                lines.push(view::activity_title_line(None, activity));
                lines.push(view::month_header_line(grid));
                lines.extend(view::grid_lines(
                    grid,
                    CellSource::Single(activity),
                    glyphs,
                    self.cursor,
                ));
                lines.push(Line::from(""));
                lines.push(self.selected_day_line());
            }
        } else {
            let all = self.snapshot.activities.all();
            lines.push(Line::from(Span::styled(
                "Overview",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(view::month_header_line(grid));
            lines.extend(view::grid_lines(grid, CellSource::Aggregate(&all), glyphs, None));

            for (i, (_, activity)) in self.snapshot.activities.iter().enumerate() {
                lines.push(Line::from(""));
                lines.push(view::activity_title_line(Some(i + 1), activity));
                lines.extend(view::grid_lines(grid, CellSource::Single(activity), glyphs, None));
            }
        }

        if self.show_legend {
            lines.push(Line::from(""));
            lines.push(view::legend_line(glyphs));
        }

        lines
    }

    fn selected_day_line(&self) -> Line<'static> {
        let Some(((week, day), (_, activity))) = self
            .cursor
            .zip(self.snapshot.activities.by_index(self.selected_index))
        else {
            return Line::from("");
        };
        let Some(date) = self.snapshot.grid.cell(week, day) else {
            return Line::from("");
        };

        let count = activity
            .date_counts
            .get(&format_date(date))
            .copied()
            .unwrap_or(0);
        let status = if count == 0 {
            "no entries".to_string()
        } else {
            format!("{}/{} done", count, activity.target_per_day)
        };

        Line::from(vec![
            Span::styled(
                date.format("%a %b %-d, %Y").to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", status), Style::default().fg(Color::Gray)),
        ])
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let style = Style::default().fg(Color::DarkGray);
        if self.show_help {
            ui_helpers::FULL_HELP
                .iter()
                .map(|text| Line::from(Span::styled(*text, style)))
                .collect()
        } else {
            vec![Line::from(Span::styled(
                ui_helpers::short_help(self.in_single_view()),
                style,
            ))]
        }
    }

    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();

        if self.snapshot.activities.is_empty() {
            let message = Paragraph::new(Line::from(Span::styled(
                format!(
                    "ERROR: No activities found. Please check {}",
                    self.snapshot.data_path.display()
                ),
                Style::default().fg(Color::Red),
            )))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Red)),
            );
            f.render_widget(message, size);
            return;
        }

        let footer = self.footer_lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(footer.len() as u16)])
            .split(size);

        let body = self.body_lines();
        let max_scroll = (body.len() as u16).saturating_sub(chunks[0].height.saturating_sub(2));
        self.scroll = self.scroll.min(max_scroll);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    self.title_text(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(
                Line::from(Span::styled(
                    format!("{} .. {}", self.snapshot.grid.range().start, self.snapshot.today),
                    Style::default().fg(Color::White),
                ))
                .alignment(Alignment::Right),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let paragraph = Paragraph::new(body).block(block).scroll((self.scroll, 0));
        f.render_widget(paragraph, chunks[0]);
        f.render_widget(Paragraph::new(footer), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{
        app::{App, UiOptions},
        calendar::parse_date,
        cli::Snapshot,
        domain::{ActivitiesData, Activity, process},
        view::{GlyphMode, Timeline, plain_text},
    };

    fn app() -> App {
        let raw = ActivitiesData {
            activities: vec![
                (
                    "run".to_string(),
                    Activity {
                        name: "Run".to_string(),
                        color: Some("green".to_string()),
                        dates: vec!["2024-06-12".to_string(), "2024-06-12".to_string()],
                        target_per_day: Some(2),
                    },
                ),
                (
                    "read".to_string(),
                    Activity {
                        name: "Read".to_string(),
                        color: Some("blue".to_string()),
                        dates: vec!["2024-06-11".to_string()],
                        target_per_day: None,
                    },
                ),
            ],
        };
        let snapshot = Snapshot::from_parts(
            PathBuf::from("data/activities.json"),
            process(&raw),
            Timeline::TwelveMonths,
            parse_date("2024-06-12").unwrap(),
        );
        App::new(
            snapshot,
            UiOptions {
                timeline: Timeline::TwelveMonths,
                show_legend: true,
                glyph_mode: GlyphMode::Ascii,
            },
        )
    }

    #[test]
    fn test_overview_lists_every_activity() {
        let app = app();
        let text = plain_text(&app.body_lines());

        assert!(text.starts_with("Overview"));
        assert!(text.contains("[1] Run (2 activities)"));
        assert!(text.contains("[2] Read (1 activities)"));
        assert!(text.ends_with("Less .-+## More"));
        assert_eq!(app.title_text(), "Activity Tracker - All Activities (12 months)");
    }

    #[test]
    fn test_single_view_shows_selected_day() {
        let mut app = app();
        app.open_single(0);

        let text = plain_text(&app.body_lines());
        assert!(text.starts_with("Run (2 activities)"));
        assert!(text.contains("Wed Jun 12, 2024  2/2 done"));
        assert_eq!(app.title_text(), "Activity Tracker - Run (12 months)");

        app.show_legend = false;
        assert!(!plain_text(&app.body_lines()).contains("More"));
    }
}
