//! Pure filters over an in-memory roster.
//!
//! Every function returns the matching subset in the original order and
//! handles an empty roster by returning an empty list.

use crate::{
  category::{Category, PersonKind},
  person::Person,
  story::Story,
};

pub fn by_category(roster: &[Person], category: Category) -> Vec<&Person> {
  roster.iter().filter(|p| p.category() == category).collect()
}

pub fn by_kind(roster: &[Person], kind: PersonKind) -> Vec<&Person> {
  roster.iter().filter(|p| p.kind() == kind).collect()
}

/// Persons carrying assignment `tag`.
pub fn by_assignment<'a>(roster: &'a [Person], tag: &str) -> Vec<&'a Person> {
  roster.iter().filter(|p| p.has_assignment(tag)).collect()
}

/// Persons not carrying assignment `tag`; the complement of [`by_assignment`].
pub fn available_for_assignment<'a>(roster: &'a [Person], tag: &str) -> Vec<&'a Person> {
  roster.iter().filter(|p| !p.has_assignment(tag)).collect()
}

/// Persons carrying at least one assignment, whatever the tag.
pub fn with_any_assignment(roster: &[Person]) -> Vec<&Person> {
  roster.iter().filter(|p| !p.assignments.is_empty()).collect()
}

/// Case-insensitive substring match over name, full name, and registration.
/// An empty term matches everyone.
pub fn by_search_term<'a>(roster: &'a [Person], term: &str) -> Vec<&'a Person> {
  if term.is_empty() {
    return roster.iter().collect();
  }
  let needle = term.to_lowercase();
  roster.iter().filter(|p| matches_term(p, &needle)).collect()
}

/// Stories whose text, or whose person's name, contains `term`.
pub fn search_stories<'a>(stories: &'a [Story], roster: &[Person], term: &str) -> Vec<&'a Story> {
  if term.is_empty() {
    return stories.iter().collect();
  }
  let needle = term.to_lowercase();
  stories
    .iter()
    .filter(|s| {
      s.text.to_lowercase().contains(&needle)
        || roster
          .iter()
          .find(|p| p.person_id == s.person_id)
          .is_some_and(|p| matches_term(p, &needle))
    })
    .collect()
}

fn matches_term(person: &Person, needle: &str) -> bool {
  let profile = &person.profile;
  profile.name.to_lowercase().contains(needle)
    || profile.full_name.to_lowercase().contains(needle)
    || profile
      .registration
      .as_deref()
      .is_some_and(|r| r.to_lowercase().contains(needle))
}

/// A roster filter composed from optional criteria; all set criteria must
/// hold.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
  pub category:      Option<Category>,
  pub kind:          Option<PersonKind>,
  pub assignment:    Option<String>,
  pub available_for: Option<String>,
  /// `Some(true)`: only persons with some assignment; `Some(false)`: only
  /// persons with none.
  pub assigned:      Option<bool>,
  pub term:          Option<String>,
}

impl RosterFilter {
  pub fn apply<'a>(&self, roster: &'a [Person]) -> Vec<&'a Person> {
    let needle = self.term.as_deref().unwrap_or_default().to_lowercase();
    roster
      .iter()
      .filter(|p| self.category.is_none_or(|c| p.category() == c))
      .filter(|p| self.kind.is_none_or(|k| p.kind() == k))
      .filter(|p| self.assignment.as_deref().is_none_or(|t| p.has_assignment(t)))
      .filter(|p| self.available_for.as_deref().is_none_or(|t| !p.has_assignment(t)))
      .filter(|p| self.assigned.is_none_or(|a| a != p.assignments.is_empty()))
      .filter(|p| needle.is_empty() || matches_term(p, &needle))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::{
    category::{AgentType, Squad},
    person::{AgentDetails, AthleteDetails, Profile, Role},
  };

  fn person(name: &str, full: &str, role: Role, tags: &[&str]) -> Person {
    let now = Utc::now();
    Person {
      person_id: Uuid::new_v4(),
      profile: Profile {
        name: name.into(),
        full_name: full.into(),
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

  fn agent(agent_type: AgentType) -> Role {
    Role::SecurityAgent(AgentDetails {
      agent_type,
      education: None,
      blood_type: None,
      health_plan: None,
    })
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

  fn roster() -> Vec<Person> {
    let mut reg = person("Carla", "Carla Mendes", agent(AgentType::Agente), &[]);
    reg.profile.registration = Some("SEG-0042".into());
    vec![
      person("Ana", "Ana Paula", agent(AgentType::Especial), &["Imprensa"]),
      person("Bruno", "Bruno Lima", athlete(Squad::Sub17), &[]),
      reg,
      person("Diego", "Diego Ana Souza", agent(AgentType::Especial), &["Imprensa", "Visitantes"]),
    ]
  }

  fn names(list: &[&Person]) -> Vec<String> {
    list.iter().map(|p| p.profile.name.clone()).collect()
  }

  #[test]
  fn by_category_keeps_order_and_matches_only_category() {
    let r = roster();
    let c = Category::Security(AgentType::Especial);
    let out = by_category(&r, c);
    assert!(out.iter().all(|p| p.category() == c));
    assert_eq!(names(&out), ["Ana", "Diego"]);
  }

  #[test]
  fn by_kind_groups_all_agent_types() {
    let r = roster();
    assert_eq!(names(&by_kind(&r, PersonKind::SecurityAgent)), ["Ana", "Carla", "Diego"]);
    assert!(by_kind(&r, PersonKind::Employee).is_empty());
  }

  #[test]
  fn assignment_filters_partition_the_roster() {
    let r = roster();
    for tag in ["Imprensa", "Visitantes", "Rampa", ""] {
      let inside = by_assignment(&r, tag);
      let outside = available_for_assignment(&r, tag);
      assert_eq!(inside.len() + outside.len(), r.len());
      for p in &r {
        let a = inside.iter().any(|q| q.person_id == p.person_id);
        let b = outside.iter().any(|q| q.person_id == p.person_id);
        assert!(a ^ b, "{} must be in exactly one side for {tag:?}", p.profile.name);
      }
    }
  }

  #[test]
  fn untagged_roster_scenario() {
    let r = vec![
      person("Ana", "Ana Paula", agent(AgentType::Especial), &["Imprensa"]),
      person("Bruno", "Bruno Lima", agent(AgentType::Agente), &[]),
      person("Carla", "Carla Mendes", agent(AgentType::Agente), &[]),
    ];
    assert!(by_assignment(&r, "Rampa").is_empty());
    assert_eq!(available_for_assignment(&r, "Rampa").len(), 3);
  }

  #[test]
  fn any_assignment_lists_everyone_posted_somewhere() {
    let r = roster();
    assert_eq!(names(&with_any_assignment(&r)), ["Ana", "Diego"]);

    let posted = RosterFilter { assigned: Some(true), ..RosterFilter::default() };
    assert_eq!(names(&posted.apply(&r)), ["Ana", "Diego"]);
    let idle = RosterFilter { assigned: Some(false), ..RosterFilter::default() };
    assert_eq!(names(&idle.apply(&r)), ["Bruno", "Carla"]);
  }

  #[test]
  fn search_identity_and_case_insensitivity() {
    let r = roster();
    assert_eq!(by_search_term(&r, "").len(), r.len());
    assert_eq!(names(&by_search_term(&r, "ana")), names(&by_search_term(&r, "ANA")));
    assert_eq!(names(&by_search_term(&r, "ana")), ["Ana", "Diego"]);
  }

  #[test]
  fn search_matches_registration() {
    let r = roster();
    assert_eq!(names(&by_search_term(&r, "seg-00")), ["Carla"]);
  }

  #[test]
  fn empty_roster_yields_empty_results() {
    let r: Vec<Person> = Vec::new();
    assert!(by_category(&r, Category::Athlete(Squad::Sub20)).is_empty());
    assert!(by_assignment(&r, "Rampa").is_empty());
    assert!(available_for_assignment(&r, "Rampa").is_empty());
    assert!(by_search_term(&r, "").is_empty());
    assert!(RosterFilter::default().apply(&r).is_empty());
  }

  #[test]
  fn combined_filter() {
    let r = roster();
    let f = RosterFilter {
      kind: Some(PersonKind::SecurityAgent),
      available_for: Some("Visitantes".into()),
      term: Some("a".into()),
      ..RosterFilter::default()
    };
    assert_eq!(names(&f.apply(&r)), ["Ana", "Carla"]);
  }

  #[test]
  fn story_search_covers_text_and_person_name() {
    let r = roster();
    let now = Utc::now();
    let story = |person: &Person, text: &str| Story {
      story_id: Uuid::new_v4(),
      person_id: person.person_id,
      text: text.into(),
      quote: None,
      photo: None,
      created_at: now,
      updated_at: now,
    };
    let stories = vec![story(&r[1], "Veio do interior."), story(&r[2], "Trabalha na Rampa.")];

    assert_eq!(search_stories(&stories, &r, "bruno").len(), 1);
    assert_eq!(search_stories(&stories, &r, "RAMPA").len(), 1);
    assert_eq!(search_stories(&stories, &r, "").len(), 2);
    assert!(search_stories(&stories, &r, "zzz").is_empty());
  }
}
