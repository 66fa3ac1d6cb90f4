//! Person records: athletes, security agents, and employees.
//!
//! A [`Person`] shares a common [`Profile`] base; everything that only makes
//! sense for one kind of person lives in the [`Role`] variant.

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  category::{AgentType, Category, PersonKind, Squad, StaffFunction},
  media::PhotoRef,
  validate::{self, ValidationErrors},
};

// ─── Shared sub-types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
  #[serde(rename = "A+")]
  APos,
  #[serde(rename = "A-")]
  ANeg,
  #[serde(rename = "B+")]
  BPos,
  #[serde(rename = "B-")]
  BNeg,
  #[serde(rename = "AB+")]
  AbPos,
  #[serde(rename = "AB-")]
  AbNeg,
  #[serde(rename = "O+")]
  OPos,
  #[serde(rename = "O-")]
  ONeg,
}

impl BloodType {
  pub const ALL: [BloodType; 8] = [
    BloodType::APos,
    BloodType::ANeg,
    BloodType::BPos,
    BloodType::BNeg,
    BloodType::AbPos,
    BloodType::AbNeg,
    BloodType::OPos,
    BloodType::ONeg,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      BloodType::APos => "A+",
      BloodType::ANeg => "A-",
      BloodType::BPos => "B+",
      BloodType::BNeg => "B-",
      BloodType::AbPos => "AB+",
      BloodType::AbNeg => "AB-",
      BloodType::OPos => "O+",
      BloodType::ONeg => "O-",
    }
  }
}

impl fmt::Display for BloodType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BloodType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BloodType::ALL
      .into_iter()
      .find(|b| b.as_str() == s)
      .ok_or_else(|| format!("unknown blood type: {s:?}"))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
  pub name:  String,
  pub phone: Option<String>,
}

// ─── Role variants ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteDetails {
  pub squad:       Squad,
  pub position:    Option<String>,
  pub school:      Option<String>,
  pub school_year: Option<String>,
  /// Dormitory room at the training centre.
  pub room:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDetails {
  pub agent_type:  AgentType,
  pub education:   Option<String>,
  pub blood_type:  Option<BloodType>,
  pub health_plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
  pub function:    StaffFunction,
  pub education:   Option<String>,
  pub blood_type:  Option<BloodType>,
  pub health_plan: Option<String>,
}

/// What a person is, with the fields specific to that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
  Athlete(AthleteDetails),
  SecurityAgent(AgentDetails),
  Employee(EmployeeDetails),
}

impl Role {
  pub fn category(&self) -> Category {
    match self {
      Role::Athlete(a) => Category::Athlete(a.squad),
      Role::SecurityAgent(a) => Category::Security(a.agent_type),
      Role::Employee(e) => Category::Staff(e.function),
    }
  }

  pub fn kind(&self) -> PersonKind { self.category().kind() }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The validated, user-editable part of a person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  /// Short name shown on the photo card.
  pub name:              String,
  pub full_name:         String,
  pub birth_date:        Option<NaiveDate>,
  pub birthplace:        Option<String>,
  /// Club registration number.
  pub registration:      Option<String>,
  pub admission_date:    Option<NaiveDate>,
  pub medical_notes:     Option<String>,
  pub emergency_contact: Option<EmergencyContact>,
  pub role:              Role,
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A stored roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:   Uuid,
  #[serde(flatten)]
  pub profile:     Profile,
  pub photo:       Option<PhotoRef>,
  #[serde(default)]
  pub assignments: BTreeSet<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Person {
  pub fn category(&self) -> Category { self.profile.role.category() }

  pub fn kind(&self) -> PersonKind { self.profile.role.kind() }

  pub fn has_assignment(&self, tag: &str) -> bool { self.assignments.contains(tag) }
}

/// Input to [`RosterStore::add_person`](crate::store::RosterStore::add_person).
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub profile:        Profile,
  pub photo:          Option<PhotoRef>,
  pub assignments:    BTreeSet<String>,
  /// Client-chosen key identifying one logical submission. A store that has
  /// already seen the key returns the existing person instead of inserting.
  pub submission_key: Option<String>,
}

/// Full replacement of a person's editable state.
#[derive(Debug, Clone)]
pub struct PersonUpdate {
  pub profile:     Profile,
  pub photo:       Option<PhotoRef>,
  pub assignments: BTreeSet<String>,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Unvalidated form state for a person, as typed by a staff member.
///
/// Dates are `YYYY-MM-DD` strings; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDraft {
  pub name:                    String,
  pub full_name:               String,
  pub category:                String,
  pub birth_date:              Option<String>,
  pub birthplace:              Option<String>,
  pub registration:            Option<String>,
  pub admission_date:          Option<String>,
  pub medical_notes:           Option<String>,
  pub emergency_contact_name:  Option<String>,
  pub emergency_contact_phone: Option<String>,
  pub position:                Option<String>,
  pub school:                  Option<String>,
  pub school_year:             Option<String>,
  pub room:                    Option<String>,
  pub education:               Option<String>,
  pub blood_type:              Option<String>,
  pub health_plan:             Option<String>,
  pub assignments:             Vec<String>,
}

impl PersonDraft {
  /// Validate against `today` and build the typed profile and assignment set.
  pub fn build(
    &self,
    today: NaiveDate,
  ) -> Result<(Profile, BTreeSet<String>), ValidationErrors> {
    let errors = validate::validate_person(self, today);
    if !errors.is_empty() {
      return Err(ValidationErrors(errors));
    }

    // Every parse below was checked by `validate_person`.
    let category: Category = self
      .category
      .trim()
      .parse()
      .map_err(|e: crate::category::UnknownCategory| ValidationErrors(vec![e.to_string()]))?;
    let blood_type = non_empty(&self.blood_type)
      .map(|s| s.parse::<BloodType>())
      .transpose()
      .map_err(|e| ValidationErrors(vec![e]))?;

    let role = match category {
      Category::Athlete(squad) => Role::Athlete(AthleteDetails {
        squad,
        position: non_empty(&self.position),
        school: non_empty(&self.school),
        school_year: non_empty(&self.school_year),
        room: non_empty(&self.room),
      }),
      Category::Security(agent_type) => Role::SecurityAgent(AgentDetails {
        agent_type,
        education: non_empty(&self.education),
        blood_type,
        health_plan: non_empty(&self.health_plan),
      }),
      Category::Staff(function) => Role::Employee(EmployeeDetails {
        function,
        education: non_empty(&self.education),
        blood_type,
        health_plan: non_empty(&self.health_plan),
      }),
    };

    let emergency_contact =
      non_empty(&self.emergency_contact_name).map(|name| EmergencyContact {
        name,
        phone: non_empty(&self.emergency_contact_phone),
      });

    let profile = Profile {
      name: self.name.trim().to_owned(),
      full_name: self.full_name.trim().to_owned(),
      birth_date: validate::parse_optional_date(&self.birth_date)
        .map_err(|e| ValidationErrors(vec![e]))?,
      birthplace: non_empty(&self.birthplace),
      registration: non_empty(&self.registration),
      admission_date: validate::parse_optional_date(&self.admission_date)
        .map_err(|e| ValidationErrors(vec![e]))?,
      medical_notes: non_empty(&self.medical_notes),
      emergency_contact,
      role,
    };

    let assignments = self
      .assignments
      .iter()
      .map(|t| t.trim().to_owned())
      .collect();

    Ok((profile, assignments))
  }
}

impl From<&Person> for PersonDraft {
  fn from(p: &Person) -> Self {
    let profile = &p.profile;
    let mut draft = PersonDraft {
      name: profile.name.clone(),
      full_name: profile.full_name.clone(),
      category: p.category().to_string(),
      birth_date: profile.birth_date.map(|d| d.to_string()),
      birthplace: profile.birthplace.clone(),
      registration: profile.registration.clone(),
      admission_date: profile.admission_date.map(|d| d.to_string()),
      medical_notes: profile.medical_notes.clone(),
      emergency_contact_name: profile.emergency_contact.as_ref().map(|c| c.name.clone()),
      emergency_contact_phone: profile
        .emergency_contact
        .as_ref()
        .and_then(|c| c.phone.clone()),
      assignments: p.assignments.iter().cloned().collect(),
      ..PersonDraft::default()
    };

    match &profile.role {
      Role::Athlete(a) => {
        draft.position = a.position.clone();
        draft.school = a.school.clone();
        draft.school_year = a.school_year.clone();
        draft.room = a.room.clone();
      }
      Role::SecurityAgent(AgentDetails { education, blood_type, health_plan, .. })
      | Role::Employee(EmployeeDetails { education, blood_type, health_plan, .. }) => {
        draft.education = education.clone();
        draft.blood_type = blood_type.map(|b| b.to_string());
        draft.health_plan = health_plan.clone();
      }
    }

    draft
  }
}

fn non_empty(field: &Option<String>) -> Option<String> {
  field
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  #[test]
  fn build_athlete_from_draft() {
    let draft = PersonDraft {
      name: " Leo ".into(),
      full_name: "Leonardo Silva".into(),
      category: "Sub17".into(),
      birth_date: Some("2008-03-14".into()),
      position: Some("Goleiro".into()),
      room: Some("".into()),
      emergency_contact_name: Some("Maria".into()),
      emergency_contact_phone: Some("5551999".into()),
      assignments: vec!["Rampa".into()],
      ..PersonDraft::default()
    };

    let (profile, assignments) = draft.build(today()).unwrap();
    assert_eq!(profile.name, "Leo");
    assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(2008, 3, 14));
    assert_eq!(profile.role.category(), Category::Athlete(Squad::Sub17));
    match &profile.role {
      Role::Athlete(a) => {
        assert_eq!(a.position.as_deref(), Some("Goleiro"));
        assert_eq!(a.room, None);
      }
      other => panic!("expected athlete, got {other:?}"),
    }
    assert_eq!(profile.emergency_contact.unwrap().phone.as_deref(), Some("5551999"));
    assert!(assignments.contains("Rampa"));
  }

  #[test]
  fn build_rejects_invalid_draft() {
    let draft = PersonDraft { name: "A".into(), ..PersonDraft::default() };
    let err = draft.build(today()).unwrap_err();
    assert!(err.0.len() >= 3);
  }

  #[test]
  fn draft_from_person_round_trips() {
    let draft = PersonDraft {
      name: "Bia".into(),
      full_name: "Beatriz Souza".into(),
      category: "Assistentes Sociais".into(),
      registration: Some("R-77".into()),
      blood_type: Some("AB-".into()),
      health_plan: Some("Unimed".into()),
      ..PersonDraft::default()
    };
    let (profile, assignments) = draft.build(today()).unwrap();
    let now = Utc::now();
    let person = Person {
      person_id: Uuid::new_v4(),
      profile,
      photo: None,
      assignments,
      created_at: now,
      updated_at: now,
    };

    let back = PersonDraft::from(&person);
    assert_eq!(back, draft);
  }

  #[test]
  fn person_json_flattens_profile() {
    let draft = PersonDraft {
      name: "Caio".into(),
      full_name: "Caio Ramos".into(),
      category: "Especial".into(),
      ..PersonDraft::default()
    };
    let (profile, assignments) = draft.build(today()).unwrap();
    let now = Utc::now();
    let person = Person {
      person_id: Uuid::new_v4(),
      profile,
      photo: None,
      assignments,
      created_at: now,
      updated_at: now,
    };

    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["name"], "Caio");
    assert_eq!(json["role"]["kind"], "security_agent");
    assert_eq!(json["role"]["agent_type"], "Especial");

    let back: Person = serde_json::from_value(json).unwrap();
    assert_eq!(back, person);
  }
}
