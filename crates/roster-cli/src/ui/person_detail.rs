//! Person detail pane, right panel.

use chrono::NaiveDate;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use roster_core::{
  person::{Person, Role},
  story::Story,
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render `person` into `area`.
pub fn draw(f: &mut Frame, area: Rect, person: &Person, app: &App) {
  let block = Block::default()
    .title(format!(" {} ", person.profile.full_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let para = Paragraph::new(detail_lines(person, app.story.as_ref()))
    .wrap(Wrap { trim: false })
    .scroll((u16::try_from(app.detail_scroll).unwrap_or(u16::MAX), 0));
  f.render_widget(para, inner);
}

/// Every line shown for `person`: profile, role fields, assignments, photo,
/// then the story.
pub fn detail_lines(person: &Person, story: Option<&Story>) -> Vec<Line<'static>> {
  let profile = &person.profile;
  let mut lines = Vec::new();

  field(&mut lines, "name", Some(profile.name.clone()));
  field(&mut lines, "category", Some(person.category().to_string()));
  field(&mut lines, "registration", profile.registration.clone());
  field(&mut lines, "born", profile.birth_date.map(format_date));
  field(&mut lines, "birthplace", profile.birthplace.clone());
  field(&mut lines, "admitted", profile.admission_date.map(format_date));

  lines.push(Line::from(""));
  match &profile.role {
    Role::Athlete(a) => {
      field(&mut lines, "position", a.position.clone());
      field(&mut lines, "school", a.school.clone());
      field(&mut lines, "school year", a.school_year.clone());
      field(&mut lines, "room", a.room.clone());
    }
    Role::SecurityAgent(a) => {
      field(&mut lines, "education", a.education.clone());
      field(&mut lines, "blood type", a.blood_type.map(|b| b.to_string()));
      field(&mut lines, "health plan", a.health_plan.clone());
    }
    Role::Employee(e) => {
      field(&mut lines, "education", e.education.clone());
      field(&mut lines, "blood type", e.blood_type.map(|b| b.to_string()));
      field(&mut lines, "health plan", e.health_plan.clone());
    }
  }
  field(&mut lines, "medical", profile.medical_notes.clone());
  if let Some(contact) = &profile.emergency_contact {
    let value = match &contact.phone {
      Some(phone) => format!("{} ({phone})", contact.name),
      None => contact.name.clone(),
    };
    field(&mut lines, "emergency", Some(value));
  }

  lines.push(Line::from(""));
  let assignments = if person.assignments.is_empty() {
    "(none)".to_string()
  } else {
    person.assignments.iter().cloned().collect::<Vec<_>>().join(", ")
  };
  field(&mut lines, "assignments", Some(assignments));
  field(&mut lines, "photo", person.photo.as_ref().map(|p| p.url.clone()));

  lines.push(Line::from(""));
  match story {
    Some(story) => {
      lines.push(Line::from(Span::styled(
        "Story",
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )));
      if let Some(quote) = &story.quote {
        lines.push(Line::from(Span::styled(
          format!("“{quote}”"),
          Style::default().add_modifier(Modifier::ITALIC),
        )));
      }
      lines.extend(story.text.lines().map(|l| Line::from(l.to_string())));
    }
    None => lines.push(Line::from(Span::styled(
      "No story yet.",
      Style::default().fg(Color::DarkGray),
    ))),
  }

  lines
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

/// Push a labelled line; absent values are skipped.
fn field(lines: &mut Vec<Line<'static>>, label: &'static str, value: Option<String>) {
  let Some(value) = value else { return };
  lines.push(Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ]));
}

fn format_date(date: NaiveDate) -> String { date.format("%d/%m/%Y").to_string() }
