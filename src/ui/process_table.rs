use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::format::{format_kb, truncate_unicode};
use crate::system::process::ProcessEntry;
use crate::ui::theme::Theme;

const NAME_WIDTH: u16 = 18;
const USER_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub state: bool,
    pub user: bool,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessEntry],
    columns: Columns,
    selected: Option<usize>,
    theme: &Theme,
) {
    let header_style = Style::default()
        .fg(theme.header_fg)
        .add_modifier(Modifier::BOLD);

    let mut header = vec![
        Cell::from(Text::from("PID").right_aligned()),
        Cell::from("NAME"),
    ];
    let mut widths = vec![Constraint::Length(7), Constraint::Length(NAME_WIDTH)];
    if columns.state {
        header.push(Cell::from("STATE"));
        widths.push(Constraint::Length(5));
    }
    if columns.user {
        header.push(Cell::from("USER"));
        widths.push(Constraint::Length(USER_WIDTH));
    }
    header.push(Cell::from(Text::from("MEMORY").right_aligned()));
    widths.push(Constraint::Length(12));

    let rows = processes.iter().map(|p| row(p, columns, theme));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(header_style))
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(theme.selection_bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border)),
        );

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn row<'a>(p: &'a ProcessEntry, columns: Columns, theme: &Theme) -> Row<'a> {
    let mut cells = vec![
        Cell::from(Text::from(p.pid.to_string()).right_aligned()),
        Cell::from(truncate_unicode(&p.name, NAME_WIDTH as usize))
            .style(Style::default().fg(theme.text_primary)),
    ];
    if columns.state {
        cells.push(
            Cell::from(p.state.to_string()).style(Style::default().fg(theme.state_color(p.state))),
        );
    }
    if columns.user {
        cells.push(
            Cell::from(truncate_unicode(&p.user, USER_WIDTH as usize))
                .style(Style::default().fg(theme.user_fg)),
        );
    }
    cells.push(
        Cell::from(Text::from(format_kb(p.memory_kb)).right_aligned())
            .style(Style::default().fg(theme.memory_fg)),
    );
    Row::new(cells)
}
