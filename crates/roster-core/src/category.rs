//! Category vocabularies: athlete squads, security agent types, and staff
//! functions.
//!
//! Every person carries exactly one [`Category`]. The category also decides
//! which [`PersonKind`] (and therefore which role variant) a person is.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The broad kind of a roster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
  Athlete,
  SecurityAgent,
  Employee,
}

impl PersonKind {
  pub const ALL: [PersonKind; 3] =
    [PersonKind::Athlete, PersonKind::SecurityAgent, PersonKind::Employee];

  pub fn as_str(self) -> &'static str {
    match self {
      PersonKind::Athlete => "athlete",
      PersonKind::SecurityAgent => "security_agent",
      PersonKind::Employee => "employee",
    }
  }

  /// All categories that belong to this kind, in display order.
  pub fn categories(self) -> Vec<Category> {
    match self {
      PersonKind::Athlete => Squad::ALL.into_iter().map(Category::Athlete).collect(),
      PersonKind::SecurityAgent => {
        AgentType::ALL.into_iter().map(Category::Security).collect()
      }
      PersonKind::Employee => {
        StaffFunction::ALL.into_iter().map(Category::Staff).collect()
      }
    }
  }
}

impl fmt::Display for PersonKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PersonKind {
  type Err = UnknownCategory;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    PersonKind::ALL
      .into_iter()
      .find(|k| k.as_str() == s)
      .ok_or_else(|| UnknownCategory(s.to_owned()))
  }
}

// ─── Vocabularies ────────────────────────────────────────────────────────────

/// Age squad of an athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Squad {
  Sub20,
  Sub17,
  Sub16,
  Sub15,
  Sub14,
}

impl Squad {
  pub const ALL: [Squad; 5] =
    [Squad::Sub20, Squad::Sub17, Squad::Sub16, Squad::Sub15, Squad::Sub14];

  pub fn as_str(self) -> &'static str {
    match self {
      Squad::Sub20 => "Sub20",
      Squad::Sub17 => "Sub17",
      Squad::Sub16 => "Sub16",
      Squad::Sub15 => "Sub15",
      Squad::Sub14 => "Sub14",
    }
  }
}

/// Security staff grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
  Especial,
  Agente,
}

impl AgentType {
  pub const ALL: [AgentType; 2] = [AgentType::Especial, AgentType::Agente];

  pub fn as_str(self) -> &'static str {
    match self {
      AgentType::Especial => "Especial",
      AgentType::Agente => "Agente",
    }
  }
}

/// Function of a non-athlete employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffFunction {
  Monitores,
  #[serde(rename = "Assistentes Sociais")]
  AssistentesSociais,
  Pedagogia,
}

impl StaffFunction {
  pub const ALL: [StaffFunction; 3] = [
    StaffFunction::Monitores,
    StaffFunction::AssistentesSociais,
    StaffFunction::Pedagogia,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      StaffFunction::Monitores => "Monitores",
      StaffFunction::AssistentesSociais => "Assistentes Sociais",
      StaffFunction::Pedagogia => "Pedagogia",
    }
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

/// The discriminating category of a person.
///
/// Serialised as the bare vocabulary string (`"Sub17"`, `"Especial"`,
/// `"Assistentes Sociais"`); the three vocabularies never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
  Athlete(Squad),
  Security(AgentType),
  Staff(StaffFunction),
}

impl Category {
  pub fn kind(self) -> PersonKind {
    match self {
      Category::Athlete(_) => PersonKind::Athlete,
      Category::Security(_) => PersonKind::SecurityAgent,
      Category::Staff(_) => PersonKind::Employee,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Athlete(s) => s.as_str(),
      Category::Security(a) => a.as_str(),
      Category::Staff(f) => f.as_str(),
    }
  }

  /// Every category across all kinds.
  pub fn all() -> Vec<Category> {
    PersonKind::ALL
      .into_iter()
      .flat_map(PersonKind::categories)
      .collect()
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Returned when a string names no known category or kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
  type Err = UnknownCategory;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::all()
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| UnknownCategory(s.to_owned()))
  }
}

// ─── Assignments ─────────────────────────────────────────────────────────────

/// The fixed vocabulary of posts/sectors a person can be assigned to.
pub const ASSIGNMENTS: [&str; 4] = ["Visitantes", "Imprensa", "Presidência", "Rampa"];

pub fn is_known_assignment(tag: &str) -> bool { ASSIGNMENTS.contains(&tag) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_round_trips_through_str() {
    for c in Category::all() {
      assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
    }
  }

  #[test]
  fn category_serialises_as_bare_string() {
    let json = serde_json::to_string(&Category::Staff(StaffFunction::AssistentesSociais)).unwrap();
    assert_eq!(json, "\"Assistentes Sociais\"");
    let back: Category = serde_json::from_str("\"Especial\"").unwrap();
    assert_eq!(back, Category::Security(AgentType::Especial));
  }

  #[test]
  fn category_kind() {
    assert_eq!(Category::Athlete(Squad::Sub15).kind(), PersonKind::Athlete);
    assert_eq!(Category::Security(AgentType::Agente).kind(), PersonKind::SecurityAgent);
    assert_eq!(Category::Staff(StaffFunction::Pedagogia).kind(), PersonKind::Employee);
  }

  #[test]
  fn unknown_category_is_rejected() {
    assert!("sub20".parse::<Category>().is_err());
    assert!("".parse::<Category>().is_err());
  }
}
