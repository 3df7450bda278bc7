use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table,
        TableState as TableCursor, Wrap,
    },
};
use stmtview_core::{Analysis, Column, PieChart, Rgb, statement_facts, summary_cards};

use super::{App, Focus, InputMode};

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).title(title).border_style(style)
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.state.analysis() {
        Some(analysis) => draw_analysis(f, app, analysis, chunks[1]),
        None => draw_placeholder(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let file = app
        .state
        .selected_file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "no file selected".to_string());

    let mut first = vec![
        Span::styled(
            "stmtview",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(file, Style::default().fg(Color::Cyan)),
    ];
    if app.state.is_analyzing() {
        first.push(Span::styled("  analyzing...", Style::default().fg(Color::Magenta)));
    }

    let second = match app.state.statement() {
        Some(statement) => Line::raw(
            statement_facts(statement)
                .into_iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect::<Vec<_>>()
                .join("  |  "),
        ),
        None => Line::styled(format!("server {}", app.server), Style::default().fg(Color::Gray)),
    };

    let header = Paragraph::new(Text::from(vec![Line::from(first), second]))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_placeholder(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if let Some(err) = app.state.error() {
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
        lines.push(Line::raw(""));
    }
    let hint = if app.state.selected_file().is_none() {
        "Press o to choose a PDF statement."
    } else if app.state.is_analyzing() {
        "Waiting for the analysis service..."
    } else {
        "Press a to analyze the selected statement."
    };
    lines.push(Line::styled(hint, Style::default().fg(Color::Gray)));

    let body = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("dashboard"))
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn draw_analysis(f: &mut Frame, app: &App, analysis: &Analysis, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(5),
        ])
        .split(area);

    draw_cards(f, analysis, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);
    draw_chart(f, analysis, middle[0]);
    draw_recurring(f, app, middle[1]);

    let summary = Paragraph::new(analysis.statement.summary.trim())
        .block(Block::default().borders(Borders::ALL).title("summary"))
        .wrap(Wrap { trim: true });
    f.render_widget(summary, middle[2]);

    draw_table(f, app, rows[2]);
}

fn draw_cards(f: &mut Frame, analysis: &Analysis, area: Rect) {
    let cards = summary_cards(&analysis.statistics);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);

    for (card, col) in cards.iter().zip(cols.iter()) {
        let widget = Paragraph::new(Span::styled(
            card.value.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .block(Block::default().borders(Borders::ALL).title(card.label));
        f.render_widget(widget, *col);
    }
}

/// Proportional colour bar with a legend underneath.
fn draw_chart(f: &mut Frame, analysis: &Analysis, area: Rect) {
    let chart = PieChart::from_categories(&analysis.statement.top_categories);
    let block = Block::default().borders(Borders::ALL).title("spending categories");

    if chart.is_empty() {
        let empty = Paragraph::new(Line::styled("(none reported)", Style::default().fg(Color::Gray)))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let mut bar = Vec::new();
    for (share, rgb) in chart.shares().iter().zip(&chart.colors) {
        let cells = (share * width as f64).round() as usize;
        bar.push(Span::styled(" ".repeat(cells), Style::default().bg(color(*rgb))));
    }

    let mut lines = vec![Line::from(bar), Line::raw("")];
    for (i, rgb) in chart.colors.iter().enumerate() {
        if let Some(tip) = chart.tooltip(i) {
            lines.push(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color(*rgb))),
                Span::raw(tip),
            ]));
        }
    }

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn draw_recurring(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .recurring()
        .iter()
        .map(|r| ListItem::new(r.as_str()))
        .collect();
    let empty = items.is_empty();

    let list = List::new(items)
        .block(focus_block("recurring (Enter)", app.focus == Focus::Recurring))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !empty && app.focus == Focus::Recurring {
        state.select(Some(app.recurring_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let transactions = app.transactions();
    let visible = app.visible_rows();

    let header = Row::new(Column::ALL.iter().enumerate().map(|(i, c)| {
        Cell::from(format!("{} {}", i + 1, app.table.header_label(*c)))
    }))
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = visible.iter().map(|id| {
        let t = &transactions[id.0];
        let row = Row::new(Column::ALL.iter().map(|c| Cell::from(c.value(t))));
        if app.highlighted == Some(*id) {
            row.style(Style::default().bg(Color::DarkGray).fg(Color::Yellow))
        } else {
            row
        }
    });

    let title = format!("transactions ({} of {})", visible.len(), transactions.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(focus_block(&title, app.focus == Focus::Table))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut cursor = TableCursor::default();
    if !visible.is_empty() && app.focus == Focus::Table {
        cursor.select(Some(app.cursor));
    }
    f.render_stateful_widget(table, area, &mut cursor);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (title, line) = match app.mode {
        InputMode::Search => ("search", Line::raw(format!("{}_", app.table.query()))),
        InputMode::OpenFile => ("open PDF", Line::raw(format!("{}_", app.path_input))),
        InputMode::Normal => {
            let status = app.status.clone().unwrap_or_else(|| {
                "o open  a analyze  1-4 sort  0 unsort  / search  Tab focus  e export  q quit"
                    .to_string()
            });
            ("status", Line::styled(status, Style::default().fg(Color::Gray)))
        }
    };
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(footer, area);
}
