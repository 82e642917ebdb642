use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{App, ScreenRegions};
use crate::model::PrimaryView;
use crate::resolver::is_selected_row;

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_body(frame, root[1], app);
    render_footer(frame, root[2], app);

    if app.show_help() {
        render_help_modal(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            " kubedeck ",
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.context().to_string(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(app.cluster().to_string(), Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let panel_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(columns[1]);

    let mut regions = ScreenRegions::default();
    for view in PrimaryView::ALL {
        let area = panel_areas[view.index()];
        let inner = panel_block(view, app.focused() == view).inner(area);
        app.sync_panel_viewport(view, usize::from(inner.height.saturating_sub(1)));
        regions.panels[view.index()] = inner;
        render_panel(frame, area, app, view);
    }

    regions.strip = render_strip(frame, right[0], app);
    render_detail(frame, right[1], app);
    app.set_regions(regions);
}

fn panel_block(view: PrimaryView, focused: bool) -> Block<'static> {
    Block::default()
        .title(format!("[{}] {}", view.index() + 1, view.title()))
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(MUTED)
        })
        .style(Style::default().bg(PANEL))
}

fn render_panel(frame: &mut Frame, area: Rect, app: &App, view: PrimaryView) {
    let focused = app.focused() == view;
    let listing = app.panel(view);
    let visible = usize::from(area.height.saturating_sub(3));

    let mut lines = Vec::new();
    if let Some(header) = listing.content().lines().next() {
        lines.push(Line::styled(
            header.to_string(),
            Style::default().fg(MUTED).add_modifier(Modifier::BOLD),
        ));
    }
    let offset = app.panel_offset(view);
    for (index, row) in listing
        .rows()
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(visible)
    {
        let mut style = Style::default().fg(Color::White);
        if is_selected_row(view, app.store(), row) {
            style = style.fg(ACCENT).add_modifier(Modifier::BOLD);
        }
        if focused && index == listing.cursor() {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::styled(row.to_string(), style));
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel_block(view, focused)),
        area,
    );
}

fn render_strip(frame: &mut Frame, area: Rect, app: &App) -> Rect {
    let title = app
        .nav()
        .active_view()
        .map(|view| view.title())
        .unwrap_or("Options");
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .style(Style::default().bg(PANEL));
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(app.nav().render()).block(block), area);
    Rect::new(inner.x, inner.y, inner.width, inner.height.min(1))
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let title = app
        .nav()
        .active_path()
        .map(|path| {
            let lines = app.detail().content().lines().count();
            format!("{path} ({lines} lines)")
        })
        .unwrap_or_default();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));
    let (x, y) = app.detail().origin();
    let paragraph = Paragraph::new(app.detail().text())
        .block(block)
        .style(Style::default().fg(Color::White))
        .scroll((y, x));

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let refreshed = app
        .last_refresh()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let status_color = if app.status().to_ascii_lowercase().contains("error") {
        WARN
    } else {
        Color::White
    };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", app.status()), Style::default().fg(status_color)),
        Span::styled(format!(" refreshed {refreshed} "), Style::default().fg(MUTED)),
        Span::styled(" ? help  q quit ", Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_help_modal(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let lines = help_lines()
        .into_iter()
        .map(|(keys, text)| {
            Line::from(vec![
                Span::styled(format!("{keys:<16}"), Style::default().fg(ACCENT)),
                Span::raw(text),
            ])
        })
        .collect::<Vec<_>>();

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(modal, area);
}

fn help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Tab / S-Tab", "next / previous panel"),
        ("1-5", "focus panel"),
        ("j k / arrows", "move cursor"),
        ("Enter / Space", "select row"),
        ("Esc", "clear selection in focused panel"),
        ("[ ] / h l", "previous / next option"),
        ("PgUp / PgDn", "scroll detail"),
        ("r", "refresh"),
        ("mouse", "click panels, rows and options; wheel scrolls detail"),
        ("? / Esc", "close help"),
        ("q / C-c", "quit"),
    ]
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
