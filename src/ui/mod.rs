pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::system::users::UserResolver;
use crate::ui::process_table::Columns;

pub fn draw<U: UserResolver>(frame: &mut Frame, app: &App<U>) {
    let title_height = if app.display.header {
        header::TITLE_HEIGHT
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(title_height),
            Constraint::Length(header::STATS_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if app.display.header {
        header::render_title(frame, chunks[0], &app.theme);
    }
    header::render_stats(frame, chunks[1], &app.snapshot, &app.display, &app.theme);

    let selected = (!app.snapshot.processes.is_empty()).then_some(app.selected_index);
    process_table::render(
        frame,
        chunks[2],
        &app.snapshot.processes,
        Columns {
            state: app.show_process_state,
            user: app.show_process_user,
        },
        selected,
        &app.theme,
    );

    statusbar::render(
        frame,
        chunks[3],
        app.policy.order,
        app.policy.show_kernel_threads,
        app.tick_rate().as_secs(),
        &app.theme,
    );

    // Help overlay last so it sits on top
    if app.show_help {
        let area = frame.area();
        help::render(frame, area, &app.help_entries(), &app.theme);
    }
}
