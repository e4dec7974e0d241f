use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::config::DisplayConfig;
use crate::format::format_kb;
use crate::system::snapshot::Snapshot;
use crate::ui::theme::Theme;

pub const TITLE_HEIGHT: u16 = 3;
pub const STATS_HEIGHT: u16 = 3;

pub fn render_title(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.title_fg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bold = Modifier::BOLD;
    let line = Line::from(vec![
        Span::styled(
            "mtop",
            Style::default().fg(theme.title_accent).add_modifier(bold),
        ),
        Span::styled(
            " - minimal top",
            Style::default().fg(theme.title_fg).add_modifier(bold),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

/// CPU and memory bars followed by the load / process count line.
pub fn render_stats(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    display: &DisplayConfig,
    theme: &Theme,
) {
    let lines = vec![
        cpu_line(snapshot, display, theme),
        memory_line(snapshot, display, theme),
        load_line(snapshot, display, theme),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn label(text: &'static str, theme: &Theme) -> Span<'static> {
    Span::styled(
        text,
        Style::default()
            .fg(theme.label_fg)
            .add_modifier(Modifier::BOLD),
    )
}

fn cpu_line(snapshot: &Snapshot, display: &DisplayConfig, theme: &Theme) -> Line<'static> {
    let mut spans = vec![label("CPU: ", theme)];
    if display.show_cpu_bar {
        spans.push(bar_span(snapshot.cpu_percent, display.progress_bar_width, theme));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(format!("{:.1}%", snapshot.cpu_percent)));
    Line::from(spans)
}

fn memory_line(snapshot: &Snapshot, display: &DisplayConfig, theme: &Theme) -> Line<'static> {
    let percent = snapshot.memory.used_ratio() * 100.0;
    let mut spans = vec![label("MEM: ", theme)];
    if display.show_memory_bar {
        spans.push(bar_span(percent, display.progress_bar_width, theme));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(format!(
        "{percent:.1}% ({}/{})",
        format_kb(snapshot.memory.used_kb),
        format_kb(snapshot.memory.total_kb)
    )));
    Line::from(spans)
}

fn load_line(snapshot: &Snapshot, display: &DisplayConfig, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    if display.show_load_avg {
        let [one, five, fifteen] = snapshot.load_average.0;
        let style = if snapshot.load_stale {
            Style::default().fg(theme.text_secondary)
        } else {
            Style::default()
                .fg(theme.state_ok)
                .add_modifier(Modifier::BOLD)
        };
        spans.push(label("Load: ", theme));
        spans.push(Span::styled(
            format!("{one:.2} {five:.2} {fifteen:.2}"),
            style,
        ));
        if snapshot.load_stale {
            spans.push(Span::styled(
                " (stale)",
                Style::default().fg(theme.text_secondary),
            ));
        }
        spans.push(Span::raw("  "));
    }
    spans.push(label("Processes: ", theme));
    spans.push(Span::styled(
        snapshot.process_count.to_string(),
        Style::default()
            .fg(theme.state_ok)
            .add_modifier(Modifier::BOLD),
    ));
    Line::from(spans)
}

fn bar_span(percent: f64, width: u16, theme: &Theme) -> Span<'static> {
    Span::styled(
        progress_bar(percent, width),
        Style::default().fg(theme.bar_filled),
    )
}

/// `[████      ]` with `width` cells between the brackets.
pub fn progress_bar(percent: f64, width: u16) -> String {
    let width = width as usize;
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64) as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}]",
        "\u{2588}".repeat(filled),
        " ".repeat(width - filled)
    )
}
