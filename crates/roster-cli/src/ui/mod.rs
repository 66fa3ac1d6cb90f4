//! TUI rendering; orchestrates all panes.

pub mod person_detail;
pub mod roster_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// Title on the left, active filters in the middle, date on the right.
fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " roster ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let filters = Span::styled(filter_summary(app), Style::default().fg(Color::Yellow));
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let used = left.width() + filters.width() + right.width();
  let pad = (area.width as usize).saturating_sub(used);

  let line = Line::from(vec![left, filters, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn filter_summary(app: &App) -> String {
  let mut parts = Vec::new();
  if let Some(kind) = app.kind {
    parts.push(format!("type:{kind}"));
  }
  if let Some(category) = app.category {
    parts.push(format!("category:{category}"));
  }
  if let Some(view) = app.assignment {
    let label = if app.available { "available-for" } else { "assigned" };
    parts.push(format!("{label}:{}", view.label()));
  }
  if parts.is_empty() { String::new() } else { format!(" {}", parts.join("  ")) }
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  roster_list::draw(f, cols[0], app);

  match app.selected_person() {
    Some(person) => person_detail::draw(f, cols[1], person, app),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select a person and press Enter.").style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    Screen::RosterList if app.search_active => ("SEARCH", "Type to filter  Esc cancel  Enter select"),
    Screen::RosterList => (
      "NORMAL",
      "jk move  / search  t type  c category  a assignment  v available  x clear  r refresh  q quit",
    ),
    Screen::PersonDetail => ("DETAIL", "jk scroll  Esc back  [ prev  ] next  r refresh  q quit"),
  };

  let status = if app.status_msg.is_empty() { hints } else { app.status_msg.as_str() };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}
