use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::system::policy::SortOrder;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    order: SortOrder,
    show_kernel_threads: bool,
    update_interval: u64,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let sort_label = if order.reverse {
        format!("Sort: {} (rev)", order.key.label())
    } else {
        format!("Sort: {}", order.key.label())
    };
    let kthreads = if show_kernel_threads {
        "Kthreads: on"
    } else {
        "Kthreads: off"
    };

    let mut spans = Vec::new();
    spans.extend(pill_spans("q", "Quit".to_string(), theme));
    spans.extend(pill_spans("s", sort_label, theme));
    spans.extend(pill_spans("r", "Reverse".to_string(), theme));
    spans.extend(pill_spans("k", kthreads.to_string(), theme));
    spans.extend(pill_spans("?", "Help".to_string(), theme));
    spans.push(Span::styled(
        format!("  every {update_interval}s"),
        Style::default().fg(theme.text_secondary),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: String, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {desc}"), Style::default().fg(theme.pill_desc_fg)),
    ]
}
