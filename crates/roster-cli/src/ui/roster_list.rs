//! Roster list pane, left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use roster_core::category::PersonKind;

use crate::app::App;

/// Render the roster list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_persons();
  let total = app.persons.len();

  let title = if app.search_active || !app.search.is_empty() || app.has_filters() {
    format!(" Roster ({}/{}) ", visible.len(), total)
  } else {
    format!(" Roster ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = visible
    .iter()
    .map(|person| {
      let badge = match person.kind() {
        PersonKind::Athlete => Span::styled("ATL ", Style::default().fg(Color::Green)),
        PersonKind::SecurityAgent => Span::styled("SEG ", Style::default().fg(Color::Red)),
        PersonKind::Employee => Span::styled("FUN ", Style::default().fg(Color::Magenta)),
      };
      ListItem::new(Line::from(vec![
        badge,
        Span::raw(person.profile.name.clone()),
        Span::styled(
          format!("  {}", person.category()),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search bar on the last inner row.
  if (app.search_active || !app.search.is_empty()) && inner_area.height > 2 {
    let search_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;

    let text = if app.search_active {
      format!("/{}_", app.search)
    } else {
      format!("/{}", app.search)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  if visible.is_empty() {
    f.render_widget(
      Paragraph::new("Nobody matches.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
