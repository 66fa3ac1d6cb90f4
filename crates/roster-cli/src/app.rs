//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::{
  category::{ASSIGNMENTS, Category, PersonKind},
  filter::RosterFilter,
  person::Person,
  roster::RosterSnapshot,
  story::Story,
};
use tracing::warn;
use uuid::Uuid;

use crate::{client::ApiClient, ui::person_detail};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the roster list.
  RosterList,
  /// Focus on the person detail pane.
  PersonDetail,
}

// ─── Assignment view ──────────────────────────────────────────────────────────

/// Which assignment the list is narrowed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentView {
  /// Anyone posted anywhere.
  Any,
  Tag(&'static str),
}

impl AssignmentView {
  /// `Any`, then every tag of the vocabulary.
  fn options() -> Vec<AssignmentView> {
    std::iter::once(AssignmentView::Any)
      .chain(ASSIGNMENTS.into_iter().map(AssignmentView::Tag))
      .collect()
  }

  pub fn label(self) -> &'static str {
    match self {
      AssignmentView::Any => "any",
      AssignmentView::Tag(tag) => tag,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The whole roster as last fetched from the server.
  pub persons: Vec<Person>,

  /// Search term, matched against name, full name, and registration.
  pub search: String,

  /// Whether the user is typing a search term.
  pub search_active: bool,

  pub kind:     Option<PersonKind>,
  pub category: Option<Category>,

  /// Assignment under focus.
  pub assignment: Option<AssignmentView>,

  /// Show persons *without* `assignment` instead of those carrying it.
  pub available: bool,

  /// Cursor position within the filtered list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  pub selected_id: Option<Uuid>,

  /// Story of the selected person, if they have one.
  pub story: Option<Story>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty roster.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::RosterList,
      persons: Vec::new(),
      search: String::new(),
      search_active: false,
      kind: None,
      category: None,
      assignment: None,
      available: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected_id: None,
      story: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the roster from the API. An unreachable server leaves the
  /// roster empty with the error in the status bar; `r` retries.
  pub async fn load_persons(&mut self) {
    self.status_msg = "Loading roster…".into();
    match self.client.list_persons().await {
      Ok(snapshot) => self.apply_snapshot(snapshot),
      Err(e) => {
        warn!(error = %e, "failed to load roster");
        self.persons.clear();
        self.list_cursor = 0;
        self.status_msg = format!("Could not load roster: {e}. Press r to retry.");
      }
    }
  }

  /// Ask the server to reload from its store. Failures stay on screen.
  async fn refresh(&mut self) {
    self.status_msg = "Refreshing…".into();
    match self.client.refresh().await {
      Ok(snapshot) => self.apply_snapshot(snapshot),
      Err(e) => {
        warn!(error = %e, "refresh failed");
        self.status_msg = format!("Refresh failed: {e}");
      }
    }
  }

  /// Replace the roster. A snapshot carrying an error is shown as-is with
  /// the error in the status bar.
  pub fn apply_snapshot(&mut self, snapshot: RosterSnapshot) {
    self.persons = snapshot.persons;
    self.status_msg = match snapshot.error {
      Some(e) => format!("Roster may be stale: {e}"),
      None => String::new(),
    };
    self.clamp_cursor();
    if let Some(id) = self.selected_id
      && !self.persons.iter().any(|p| p.person_id == id)
    {
      self.close_detail();
    }
  }

  async fn load_story(&mut self, person_id: Uuid) {
    match self.client.story_for_person(person_id).await {
      Ok(story) => self.story = story,
      Err(e) => {
        warn!(error = %e, %person_id, "failed to load story");
        self.story = None;
        self.status_msg = format!("Story unavailable: {e}");
      }
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// The filter described by the current selections.
  pub fn roster_filter(&self) -> RosterFilter {
    let mut filter = RosterFilter {
      category: self.category,
      kind: self.kind,
      term: (!self.search.is_empty()).then(|| self.search.clone()),
      ..RosterFilter::default()
    };
    match self.assignment {
      None => {}
      Some(AssignmentView::Any) => filter.assigned = Some(!self.available),
      Some(AssignmentView::Tag(tag)) if self.available => {
        filter.available_for = Some(tag.to_string());
      }
      Some(AssignmentView::Tag(tag)) => filter.assignment = Some(tag.to_string()),
    }
    filter
  }

  /// Persons matching the current filter, in roster order.
  pub fn visible_persons(&self) -> Vec<&Person> { self.roster_filter().apply(&self.persons) }

  /// The person under the list cursor, if any.
  pub fn cursor_person(&self) -> Option<&Person> {
    self.visible_persons().get(self.list_cursor).copied()
  }

  pub fn selected_person(&self) -> Option<&Person> {
    let id = self.selected_id?;
    self.persons.iter().find(|p| p.person_id == id)
  }

  /// Whether any criterion besides the search term is set.
  pub fn has_filters(&self) -> bool {
    self.kind.is_some() || self.category.is_some() || self.assignment.is_some()
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible_persons().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  // ── Filter cycling ────────────────────────────────────────────────────────

  /// None → each kind in turn → None. A category of another kind is dropped.
  pub fn cycle_kind(&mut self) {
    self.kind = next_of(&PersonKind::ALL, self.kind);
    if let (Some(kind), Some(category)) = (self.kind, self.category)
      && category.kind() != kind
    {
      self.category = None;
    }
    self.list_cursor = 0;
  }

  /// Cycles through the categories of the selected kind, or all of them.
  pub fn cycle_category(&mut self) {
    let options = match self.kind {
      Some(kind) => kind.categories(),
      None => Category::all(),
    };
    self.category = next_of(&options, self.category);
    self.list_cursor = 0;
  }

  /// None → any assignment → each tag → None.
  pub fn cycle_assignment(&mut self) {
    self.assignment = next_of(&AssignmentView::options(), self.assignment);
    self.list_cursor = 0;
  }

  /// Flip between "assigned to" and "available for" the focused tag.
  pub fn toggle_available(&mut self) {
    if self.assignment.is_none() {
      self.status_msg = "Pick an assignment with [a] first".into();
      return;
    }
    self.available = !self.available;
    self.list_cursor = 0;
  }

  pub fn clear_filters(&mut self) {
    self.kind = None;
    self.category = None;
    self.assignment = None;
    self.available = false;
    self.search.clear();
    self.list_cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.search_active {
      return self.handle_search_key(key).await;
    }

    match self.screen {
      Screen::RosterList => self.handle_list_key(key).await,
      Screen::PersonDetail => self.handle_detail_key(key).await,
    }
  }

  async fn handle_search_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.list_cursor = 0;
        // A single match opens straight away.
        let only = match self.visible_persons().as_slice() {
          [p] => Some(p.person_id),
          _ => None,
        };
        if let Some(id) = only {
          self.open_detail(id).await;
        }
      }
      KeyCode::Backspace => {
        self.search.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.search.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_persons().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_person().map(|p| p.person_id) {
          self.open_detail(id).await;
        }
      }

      KeyCode::Char('/') => {
        self.search_active = true;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('t') => self.cycle_kind(),
      KeyCode::Char('c') => self.cycle_category(),
      KeyCode::Char('a') => self.cycle_assignment(),
      KeyCode::Char('v') => self.toggle_available(),
      KeyCode::Char('x') => self.clear_filters(),
      KeyCode::Char('r') => self.refresh().await,

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self
          .selected_person()
          .map(|p| person_detail::detail_lines(p, self.story.as_ref()).len())
          .unwrap_or_default();
        if self.detail_scroll + 1 < len {
          self.detail_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      // Quick switching without leaving the detail pane.
      KeyCode::Char(']') | KeyCode::PageDown => {
        let len = self.visible_persons().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
          if let Some(id) = self.cursor_person().map(|p| p.person_id) {
            self.open_detail(id).await;
          }
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          if let Some(id) = self.cursor_person().map(|p| p.person_id) {
            self.open_detail(id).await;
          }
        }
      }

      KeyCode::Char('r') => self.refresh().await,

      _ => {}
    }
    Ok(true)
  }

  /// Transition to `PersonDetail` for `person_id`, loading their story.
  async fn open_detail(&mut self, person_id: Uuid) {
    self.status_msg.clear();
    self.selected_id = Some(person_id);
    self.detail_scroll = 0;
    self.screen = Screen::PersonDetail;
    self.load_story(person_id).await;
  }

  fn close_detail(&mut self) {
    self.screen = Screen::RosterList;
    self.selected_id = None;
    self.story = None;
    self.detail_scroll = 0;
  }
}

/// The entry after `current` in `options`, wrapping through `None`.
fn next_of<T: Copy + PartialEq>(options: &[T], current: Option<T>) -> Option<T> {
  match current {
    None => options.first().copied(),
    Some(c) => options
      .iter()
      .position(|o| *o == c)
      .and_then(|i| options.get(i + 1))
      .copied(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use roster_core::{
    category::{AgentType, Squad, StaffFunction},
    person::{AgentDetails, AthleteDetails, EmployeeDetails, Profile, Role},
  };

  use super::*;
  use crate::client::ApiConfig;

  fn person(name: &str, role: Role, tags: &[&str]) -> Person {
    let now = Utc::now();
    Person {
      person_id: Uuid::new_v4(),
      profile: Profile {
        name: name.into(),
        full_name: format!("{name} da Silva"),
        birth_date: None,
        birthplace: None,
        registration: None,
        admission_date: None,
        medical_notes: None,
        emergency_contact: None,
        role,
      },
      photo: None,
      assignments: tags.iter().map(|t| t.to_string()).collect(),
      created_at: now,
      updated_at: now,
    }
  }

  fn athlete(squad: Squad) -> Role {
    Role::Athlete(AthleteDetails {
      squad,
      position: None,
      school: None,
      school_year: None,
      room: None,
    })
  }

  fn agent(agent_type: AgentType) -> Role {
    Role::SecurityAgent(AgentDetails {
      agent_type,
      education: None,
      blood_type: None,
      health_plan: None,
    })
  }

  fn employee(function: StaffFunction) -> Role {
    Role::Employee(EmployeeDetails {
      function,
      education: None,
      blood_type: None,
      health_plan: None,
    })
  }

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
      username: "staff".into(),
      password: "secret".into(),
    })
    .unwrap();
    let mut app = App::new(client);
    app.apply_snapshot(RosterSnapshot {
      persons: vec![
        person("Ana", agent(AgentType::Agente), &["Rampa"]),
        person("Bruno", athlete(Squad::Sub17), &[]),
        person("Carla", agent(AgentType::Especial), &["Imprensa"]),
        person("Davi", employee(StaffFunction::Pedagogia), &["Rampa"]),
      ],
      error: None,
    });
    app
  }

  fn names(app: &App) -> Vec<&str> {
    app.visible_persons().iter().map(|p| p.profile.name.as_str()).collect()
  }

  fn key(c: char) -> KeyEvent { KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE) }

  #[test]
  fn kind_cycle_wraps_back_to_everyone() {
    let mut app = app();
    app.cycle_kind();
    assert_eq!(app.kind, Some(PersonKind::Athlete));
    assert_eq!(names(&app), ["Bruno"]);
    app.cycle_kind();
    assert_eq!(names(&app), ["Ana", "Carla"]);
    app.cycle_kind();
    app.cycle_kind();
    assert_eq!(app.kind, None);
    assert_eq!(names(&app).len(), 4);
  }

  #[test]
  fn category_cycle_stays_within_selected_kind() {
    let mut app = app();
    app.kind = Some(PersonKind::SecurityAgent);
    app.cycle_category();
    assert_eq!(app.category, Some(Category::Security(AgentType::Especial)));
    assert_eq!(names(&app), ["Carla"]);
    app.cycle_category();
    assert_eq!(names(&app), ["Ana"]);
    app.cycle_category();
    assert_eq!(app.category, None);
  }

  #[test]
  fn changing_kind_drops_a_foreign_category() {
    let mut app = app();
    app.category = Some(Category::Athlete(Squad::Sub17));
    app.cycle_kind();
    assert_eq!(app.category, Some(Category::Athlete(Squad::Sub17)));
    app.cycle_kind();
    assert_eq!(app.kind, Some(PersonKind::SecurityAgent));
    assert_eq!(app.category, None);
  }

  #[test]
  fn available_toggle_shows_the_complement() {
    let mut app = app();
    app.toggle_available();
    assert!(!app.available);

    while app.assignment != Some(AssignmentView::Tag("Rampa")) {
      app.cycle_assignment();
    }
    assert_eq!(names(&app), ["Ana", "Davi"]);
    app.toggle_available();
    assert_eq!(names(&app), ["Bruno", "Carla"]);
  }

  #[test]
  fn any_assignment_view_and_its_complement() {
    let mut app = app();
    app.cycle_assignment();
    assert_eq!(app.assignment, Some(AssignmentView::Any));
    assert_eq!(names(&app), ["Ana", "Carla", "Davi"]);

    app.toggle_available();
    assert_eq!(names(&app), ["Bruno"]);

    app.cycle_assignment();
    assert_eq!(app.assignment, Some(AssignmentView::Tag("Visitantes")));
  }

  fn rendered(app: &App) -> String {
    let mut terminal = ratatui::Terminal::new(ratatui::backend::TestBackend::new(100, 20)).unwrap();
    terminal.draw(|f| crate::ui::draw(f, app)).unwrap();
    terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
  }

  #[test]
  fn oversized_detail_scroll_saturates() {
    let mut app = app();
    app.selected_id = Some(app.persons[0].person_id);
    app.screen = Screen::PersonDetail;
    assert!(rendered(&app).contains("No story yet."));

    // Past u16::MAX; a wrapping cast would land back near the top.
    app.detail_scroll = usize::from(u16::MAX) + 7;
    assert!(!rendered(&app).contains("No story yet."));
  }

  #[tokio::test]
  async fn unreachable_server_leaves_an_empty_roster_and_a_hint() {
    let mut app = app();
    app.load_persons().await;
    assert!(app.persons.is_empty());
    assert!(app.status_msg.contains("Press r to retry"), "{}", app.status_msg);

    assert!(app.handle_key(key('r')).await.unwrap());
    assert!(app.status_msg.starts_with("Refresh failed"), "{}", app.status_msg);
  }

  #[test]
  fn stale_snapshot_surfaces_its_error() {
    let mut app = app();
    app.list_cursor = 3;
    app.apply_snapshot(RosterSnapshot {
      persons: vec![person("Eva", athlete(Squad::Sub20), &[])],
      error:   Some("store unavailable".into()),
    });
    assert_eq!(app.status_msg, "Roster may be stale: store unavailable");
    assert_eq!(app.list_cursor, 0);
  }

  #[tokio::test]
  async fn typed_search_filters_and_escape_clears() {
    let mut app = app();
    app.handle_key(key('/')).await.unwrap();
    for c in "car".chars() {
      app.handle_key(key(c)).await.unwrap();
    }
    assert!(app.search_active);
    assert_eq!(names(&app), ["Carla"]);

    app
      .handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
      .await
      .unwrap();
    assert!(!app.search_active);
    assert_eq!(names(&app).len(), 4);
  }

  #[tokio::test]
  async fn cursor_stays_within_the_filtered_list() {
    let mut app = app();
    app.handle_key(key('t')).await.unwrap();
    app.handle_key(key('j')).await.unwrap();
    app.handle_key(key('j')).await.unwrap();
    assert_eq!(app.list_cursor, 0);

    app.handle_key(key('x')).await.unwrap();
    for _ in 0..10 {
      app.handle_key(key('j')).await.unwrap();
    }
    assert_eq!(app.list_cursor, 3);
    assert_eq!(app.cursor_person().unwrap().profile.name, "Davi");
  }

  #[tokio::test]
  async fn quit_keys_stop_the_loop() {
    let mut app = app();
    assert!(!app.handle_key(key('q')).await.unwrap());
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(ctrl_c).await.unwrap());
  }
}
