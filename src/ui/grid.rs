use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::round::Round;

const CELL_WIDTH: u16 = 4;

/// The playing field: prompt strip, kana tiles grouped by derived row, and
/// the input line.
pub struct KanaGrid<'a> {
    round: &'a Round,
    input: &'a str,
    rejected: bool,
}

impl<'a> KanaGrid<'a> {
    pub fn new(round: &'a Round, input: &'a str, rejected: bool) -> Self {
        Self {
            round,
            input,
            rejected,
        }
    }
}

impl Widget for KanaGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(" kanadr ");
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < CELL_WIDTH || inner.height < 4 {
            return;
        }

        let mut y = inner.y;

        // Prompt strip: one cell per prompt, dimmed once completed.
        let mut x = inner.x;
        for prompt in &self.round.prompts {
            if x + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let romaji = prompt
                .slots
                .get(&crate::catalog::ScriptKind::Romaji)
                .map(|slot| slot.character.as_str())
                .or_else(|| {
                    prompt
                        .slots
                        .values()
                        .next()
                        .and_then(|slot| crate::catalog::romaji_for(&slot.character))
                })
                .unwrap_or("");
            let style = if prompt.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            };
            buf.set_string(x, y, format!("{romaji:^4}"), style);
            x += CELL_WIDTH;
        }
        y += 2;

        // Tiles in presented order, one line per derived row.
        let active = self.round.active.as_ref();
        let mut current_row: Option<u8> = None;
        let mut x = inner.x;
        for tile in &self.round.tiles {
            if current_row != Some(tile.row) {
                if current_row.is_some() {
                    y += 1;
                }
                current_row = Some(tile.row);
                x = inner.x;
            }
            if y >= inner.y + inner.height - 1 || x + CELL_WIDTH > inner.x + inner.width {
                continue;
            }

            let is_active =
                active.is_some_and(|a| a.tile_id == tile.id && a.kind == tile.kind && !tile.filled);
            let style = if is_active && self.rejected {
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if is_active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if tile.fading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            buf.set_string(x, y, format!("{:^4}", tile.character), style);
            x += CELL_WIDTH;
        }

        // Input line pinned to the bottom of the grid.
        let input_y = inner.y + inner.height - 1;
        let prompt_style = if self.rejected {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        buf.set_string(inner.x, input_y, format!("> {}", self.input), prompt_style);
        let remaining = format!("{} left", self.round.remaining());
        let rx = inner.x + inner.width.saturating_sub(remaining.len() as u16);
        buf.set_string(rx, input_y, remaining, Style::default().fg(Color::DarkGray));
    }
}
