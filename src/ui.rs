#![allow(
    // Allow truncation when casting from usize to u16 since field dimensions are always small
    clippy::cast_possible_truncation
)]

use crate::app::App;
use crate::components::SessionState;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

// Each cell is 2 characters wide, 1 tall
const CELL_WIDTH: u16 = 2;
const INFO_WIDTH: u16 = 24;

/// Anything the simulation's view can be drawn onto, one cell at a time.
pub trait CellSurface {
    fn draw_cell(&mut self, column: usize, row: usize, color: Option<Color>);
}

/// Retained grid of what has been drawn so far. Only changed cells are
/// written into it; the terminal frame is painted from it every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn color_at(&self, column: usize, row: usize) -> Option<Color> {
        self.cells[row * self.width + column]
    }
}

impl CellSurface for Canvas {
    fn draw_cell(&mut self, column: usize, row: usize, color: Option<Color>) {
        if column < self.width && row < self.height {
            self.cells[row * self.width + column] = color;
        }
    }
}

pub fn render(f: &mut Frame, canvas: &Canvas, app: &App) {
    let board_width = canvas.width() as u16 * CELL_WIDTH + 2; // +2 for borders
    let board_height = canvas.height() as u16 + 2;
    let min_total_width = board_width + INFO_WIDTH;

    // Check if the terminal is too small to render the field properly
    if f.area().width < min_total_width || f.area().height < board_height {
        let warning_text = Paragraph::new(
            "Terminal too small!\nPlease resize your terminal\nto continue playing.",
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Blockfall"));

        let warning_area = centered_rect(50, 30, f.area());
        f.render_widget(warning_text, warning_area);
        return;
    }

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(board_width),
            Constraint::Length(INFO_WIDTH),
            Constraint::Fill(1),
        ])
        .split(f.area());

    let board_area = Rect {
        height: board_height,
        ..main_layout[0]
    };
    render_field(f, canvas, board_area);
    render_info(f, app, main_layout[1]);
}

fn render_field(f: &mut Frame, canvas: &Canvas, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("BLOCKFALL");
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    for row in 0..canvas.height() {
        for column in 0..canvas.width() {
            let x = inner_area.left() + column as u16 * CELL_WIDTH;
            let y = inner_area.top() + row as u16;

            if x + CELL_WIDTH > inner_area.right() || y >= inner_area.bottom() {
                continue;
            }

            let (symbol, color) = match canvas.color_at(column, row) {
                Some(color) => ("█", color),
                None => (" ", Color::Black),
            };

            // Make the block two cells wide for better proportions
            for dx in 0..CELL_WIDTH {
                if let Some(cell) = f.buffer_mut().cell_mut((x + dx, y)) {
                    cell.set_symbol(symbol);
                    cell.set_fg(color);
                    cell.set_bg(Color::Black);
                }
            }
        }
    }
}

fn render_info(f: &mut Frame, app: &App, area: Rect) {
    let info_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(7)])
        .split(area);

    let status = if app.session_state() == SessionState::Ended {
        Paragraph::new("SESSION ENDED\nPress Enter to restart")
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Paragraph::new("")
    };
    f.render_widget(status.wrap(Wrap { trim: true }), info_layout[0]);

    let controls = Paragraph::new(
        "Controls:\n\
        ←/→: Move left/right\n\
        ↓: Move down\n\
        ↑: Rotate clockwise\n\
        Z: Rotate counter-clockwise\n\
        Q/Esc: Quit\n\
        ",
    )
    .block(Block::default().borders(Borders::TOP))
    .wrap(Wrap { trim: true });
    f.render_widget(controls, info_layout[1]);
}

/// Helper function to create a centered rect using up certain percentage of the available rect
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
