//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use uuid::Uuid;
use vigia_core::{
  lifecycle::{classify, LifecycleState},
  person::{NewPerson, PersonKind},
  rbac::{self, Action, Grant, Module, Role},
  record::NewRecord,
  requirement::NewRequirement,
  store::{PersonQuery, RecordQuery, RecordStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_person(name: &str, kind: PersonKind) -> NewPerson {
  NewPerson {
    kind,
    full_name: name.into(),
    email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
  }
}

async fn seed_record(s: &SqliteStore) -> (Uuid, Uuid, Uuid) {
  let person = s
    .add_person(new_person("Ana Torres", PersonKind::Contractor))
    .await
    .unwrap();
  let requirement = s
    .add_requirement(NewRequirement {
      name:        "Working at heights".into(),
      description: None,
    })
    .await
    .unwrap();
  let record = s
    .add_record(NewRecord {
      person_id:      person.person_id,
      requirement_id: requirement.requirement_id,
      valid_from:     Some(date(2024, 1, 1)),
      expires_on:     Some(date(2024, 12, 31)),
      document_link:  None,
    })
    .await
    .unwrap();
  (person.person_id, requirement.requirement_id, record.record_id)
}

// ─── People ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let person = s
    .add_person(new_person("Ana Torres", PersonKind::Employee))
    .await
    .unwrap();
  assert_eq!(person.kind, PersonKind::Employee);
  assert!(person.active);

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.person_id, person.person_id);
  assert_eq!(fetched.full_name, "Ana Torres");
  assert_eq!(fetched.email.as_deref(), Some("ana.torres@example.com"));
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_people_filtered_by_kind() {
  let s = store().await;
  s.add_person(new_person("Ana", PersonKind::Employee)).await.unwrap();
  s.add_person(new_person("Beto", PersonKind::Contractor)).await.unwrap();
  s.add_person(new_person("Carla", PersonKind::Employee)).await.unwrap();

  let all = s.list_people(None).await.unwrap();
  assert_eq!(all.len(), 3);

  let employees = s.list_people(Some(PersonKind::Employee)).await.unwrap();
  assert_eq!(employees.len(), 2);
  assert!(employees.iter().all(|p| p.kind == PersonKind::Employee));
}

#[tokio::test]
async fn find_people_by_text() {
  let s = store().await;
  s.add_person(new_person("Ana Torres", PersonKind::Employee)).await.unwrap();
  s.add_person(new_person("Beto Sosa", PersonKind::Contractor)).await.unwrap();

  let hits = s
    .find_people(&PersonQuery {
      text: Some("torres".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].full_name, "Ana Torres");

  // Email is searched too.
  let hits = s
    .find_people(&PersonQuery {
      text: Some("beto.sosa@".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].full_name, "Beto Sosa");
}

#[tokio::test]
async fn find_people_respects_limit_and_kind() {
  let s = store().await;
  for name in ["Ana", "Beto", "Carla", "Dario"] {
    s.add_person(new_person(name, PersonKind::Contractor)).await.unwrap();
  }
  s.add_person(new_person("Elena", PersonKind::Employee)).await.unwrap();

  let hits = s
    .find_people(&PersonQuery {
      kind: Some(PersonKind::Contractor),
      limit: Some(2),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 2);
  assert!(hits.iter().all(|p| p.kind == PersonKind::Contractor));
}

// ─── Requirements ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_list_requirements() {
  let s = store().await;
  s.add_requirement(NewRequirement {
    name:        "Confined spaces".into(),
    description: Some("Annual refresher".into()),
  })
  .await
  .unwrap();
  s.add_requirement(NewRequirement {
    name:        "First aid".into(),
    description: None,
  })
  .await
  .unwrap();

  let all = s.list_requirements().await.unwrap();
  assert_eq!(all.len(), 2);
  // Sorted by name.
  assert_eq!(all[0].name, "Confined spaces");
  assert_eq!(all[1].name, "First aid");
}

// ─── Records ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_record_and_roundtrip_dates() {
  let s = store().await;
  let (person_id, requirement_id, record_id) = seed_record(&s).await;

  let record = s.get_record(record_id).await.unwrap().unwrap();
  assert_eq!(record.person_id, person_id);
  assert_eq!(record.requirement_id, requirement_id);
  assert_eq!(record.valid_from, Some(date(2024, 1, 1)));
  assert_eq!(record.expires_on, Some(date(2024, 12, 31)));
  assert_eq!(record.manual_state, None);
}

#[tokio::test]
async fn add_record_unknown_person_errors() {
  let s = store().await;
  let requirement = s
    .add_requirement(NewRequirement { name: "X".into(), description: None })
    .await
    .unwrap();

  let err = s
    .add_record(NewRecord {
      person_id:      Uuid::new_v4(),
      requirement_id: requirement.requirement_id,
      valid_from:     None,
      expires_on:     None,
      document_link:  None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::PersonNotFound(_)));
}

#[tokio::test]
async fn duplicate_record_rejected() {
  let s = store().await;
  let (person_id, requirement_id, _) = seed_record(&s).await;

  let err = s
    .add_record(NewRecord {
      person_id,
      requirement_id,
      valid_from: None,
      expires_on: None,
      document_link: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateRecord { .. }));
}

#[tokio::test]
async fn list_records_filters_by_person() {
  let s = store().await;
  let (person_id, _, _) = seed_record(&s).await;

  let other = s
    .add_person(new_person("Beto Sosa", PersonKind::Employee))
    .await
    .unwrap();
  let requirement = s
    .add_requirement(NewRequirement { name: "First aid".into(), description: None })
    .await
    .unwrap();
  s.add_record(NewRecord {
    person_id:      other.person_id,
    requirement_id: requirement.requirement_id,
    valid_from:     None,
    expires_on:     None,
    document_link:  None,
  })
  .await
  .unwrap();

  let all = s.list_records(&RecordQuery::default()).await.unwrap();
  assert_eq!(all.len(), 2);

  let mine = s
    .list_records(&RecordQuery {
      person_id: Some(person_id),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].person_id, person_id);
}

#[tokio::test]
async fn update_dates_replaces_both_fields() {
  let s = store().await;
  let (_, _, record_id) = seed_record(&s).await;

  let updated = s
    .update_dates(record_id, Some(date(2024, 2, 1)), None)
    .await
    .unwrap();
  assert_eq!(updated.valid_from, Some(date(2024, 2, 1)));
  assert_eq!(updated.expires_on, None);
  assert!(updated.updated_at >= updated.created_at);

  // No expiry now reads as Current.
  assert_eq!(
    classify(updated.expires_on, updated.manual_state, date(2024, 6, 15)),
    LifecycleState::Current
  );
}

#[tokio::test]
async fn unreadable_stored_date_reads_as_no_expiry() {
  let s = store().await;
  let (_, _, record_id) = seed_record(&s).await;

  // Corrupt the column underneath the store. Datetime-shaped values keep
  // their calendar day; garbage degrades to None instead of failing the row.
  s.execute_raw(&format!(
    "UPDATE records SET valid_from = '2024-01-01T09:30:00', \
     expires_on = 'no vence' WHERE record_id = '{record_id}'"
  ))
  .await
  .unwrap();

  let record = s.get_record(record_id).await.unwrap().unwrap();
  assert_eq!(record.valid_from, Some(date(2024, 1, 1)));
  assert_eq!(record.expires_on, None);
  assert_eq!(
    classify(record.expires_on, record.manual_state, date(2024, 6, 15)),
    LifecycleState::Current
  );
}

#[tokio::test]
async fn update_dates_missing_record_errors() {
  let s = store().await;
  let err = s
    .update_dates(Uuid::new_v4(), None, None)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(_)));
}

// ─── Manual override ──────────────────────────────────────────────────────────

#[tokio::test]
async fn set_and_clear_manual_state() {
  let s = store().await;
  let (_, _, record_id) = seed_record(&s).await;

  let overridden = s
    .set_manual_state(record_id, LifecycleState::InRenewal)
    .await
    .unwrap();
  assert_eq!(overridden.manual_state, Some(LifecycleState::InRenewal));

  // The override wins on classification regardless of the dates.
  assert_eq!(
    classify(overridden.expires_on, overridden.manual_state, date(2030, 1, 1)),
    LifecycleState::InRenewal
  );

  let cleared = s.clear_manual_state(record_id).await.unwrap();
  assert_eq!(cleared.manual_state, None);

  // Classification falls back to the dates (expired by 2030).
  assert_eq!(
    classify(cleared.expires_on, cleared.manual_state, date(2030, 1, 1)),
    LifecycleState::Expired
  );
}

#[tokio::test]
async fn clear_without_override_errors() {
  let s = store().await;
  let (_, _, record_id) = seed_record(&s).await;

  let err = s.clear_manual_state(record_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::NoOverrideSet(_)));
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_record_removes_it() {
  let s = store().await;
  let (person_id, requirement_id, record_id) = seed_record(&s).await;

  s.delete_record(record_id).await.unwrap();
  assert!(s.get_record(record_id).await.unwrap().is_none());

  // The pair is free again.
  s.add_record(NewRecord {
    person_id,
    requirement_id,
    valid_from: None,
    expires_on: None,
    document_link: None,
  })
  .await
  .unwrap();
}

#[tokio::test]
async fn delete_missing_record_errors() {
  let s = store().await;
  let err = s.delete_record(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(_)));
}

// ─── RBAC ─────────────────────────────────────────────────────────────────────

fn viewer_role() -> Role {
  Role {
    name:   "viewer".into(),
    grants: vec![
      Grant { module: Module::Records, action: Action::View },
      Grant { module: Module::Dashboard, action: Action::View },
    ],
  }
}

#[tokio::test]
async fn roles_roundtrip_and_upsert() {
  let s = store().await;
  s.upsert_role(viewer_role()).await.unwrap();

  let fetched = s.get_role("viewer").await.unwrap().unwrap();
  assert_eq!(fetched.grants, viewer_role().grants);

  // Upsert replaces the grant set.
  s.upsert_role(Role {
    name:   "viewer".into(),
    grants: vec![Grant { module: Module::Records, action: Action::View }],
  })
  .await
  .unwrap();
  let fetched = s.get_role("viewer").await.unwrap().unwrap();
  assert_eq!(fetched.grants.len(), 1);

  // Lookup through a short-lived borrowed name.
  let name = format!("view{}", "er");
  assert!(s.get_role(&name).await.unwrap().is_some());
  assert!(s.get_role("absent").await.unwrap().is_none());
}

#[tokio::test]
async fn assign_resolve_unassign() {
  let s = store().await;
  s.upsert_role(viewer_role()).await.unwrap();
  s.upsert_role(Role::admin()).await.unwrap();

  s.assign_role("ana", "viewer").await.unwrap();
  s.assign_role("ana", "viewer").await.unwrap(); // idempotent

  let roles = s.roles_for("ana").await.unwrap();
  assert_eq!(roles.len(), 1);

  let perms = rbac::resolve(&roles);
  assert!(perms.allows(Module::Records, Action::View));
  assert!(!perms.allows(Module::Records, Action::Edit));

  s.unassign_role("ana", "viewer").await.unwrap();
  assert!(s.roles_for("ana").await.unwrap().is_empty());
  assert!(rbac::resolve(&s.roles_for("ana").await.unwrap()).is_empty());
}

#[tokio::test]
async fn assign_unknown_role_errors() {
  let s = store().await;
  let err = s.assign_role("ana", "ghost").await.unwrap_err();
  assert!(matches!(err, crate::Error::RoleNotFound(_)));
}
