use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::RoundSummary;
use crate::store::schema::StatsData;

pub struct SummaryCard<'a> {
    summary: &'a RoundSummary,
    stats: &'a StatsData,
}

impl<'a> SummaryCard<'a> {
    pub fn new(summary: &'a RoundSummary, stats: &'a StatsData) -> Self {
        Self { summary, stats }
    }
}

impl Widget for SummaryCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" Round Complete ")
            .border_style(Style::default().fg(Color::Green));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().add_modifier(Modifier::BOLD);
        let highlight = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let best_marker = |new_best: bool| {
            if new_best {
                Span::styled("  new best!", highlight)
            } else {
                Span::raw("")
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Time      ", label),
                Span::styled(format!("{:.1}s", self.summary.elapsed_secs), value),
                best_marker(self.summary.new_best_overall),
            ]),
            Line::from(vec![
                Span::styled("Level     ", label),
                Span::styled(self.summary.level_key.clone(), value),
                best_marker(self.summary.new_best_for_level && !self.summary.new_best_overall),
            ]),
            Line::from(vec![
                Span::styled("Tiles     ", label),
                Span::styled(format!("{}", self.summary.tiles_completed), value),
            ]),
            Line::from(vec![
                Span::styled("Misses    ", label),
                Span::styled(format!("{}", self.summary.misses), value),
            ]),
            Line::from(vec![
                Span::styled("Accuracy  ", label),
                Span::styled(format!("{:.0}%", self.summary.accuracy * 100.0), value),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Streak    ", label),
                Span::styled(
                    format!(
                        "{} kana (best {}), {} days",
                        self.stats.kana_streak, self.stats.best_kana_streak, self.stats.daily_streak
                    ),
                    value,
                ),
            ]),
            Line::from(vec![
                Span::styled("Next      ", label),
                Span::styled(self.summary.next_level.key(), value),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "[Enter] next round  [q] menu",
                Style::default().fg(Color::Cyan),
            )),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}
