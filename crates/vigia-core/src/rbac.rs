//! Role-based access control — resolution only, no enforcement.
//!
//! A role is a named bag of module×action grants. Resolving a user's roles
//! is a flat union into a [`PermissionSet`]; whoever fronts the store (the
//! HTTP server) decides what each route requires. The lifecycle classifier
//! has no awareness of any of this and must never be used as a gate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ─── Vocabulary ───────────────────────────────────────────────────────────────

/// Application area a grant applies to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Module {
  People,
  Requirements,
  Records,
  Dashboard,
  /// Role and assignment management itself.
  Admin,
}

/// What a grant allows within a module.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
  View,
  Edit,
  Delete,
}

impl Module {
  pub const ALL: [Module; 5] = [
    Module::People,
    Module::Requirements,
    Module::Records,
    Module::Dashboard,
    Module::Admin,
  ];
}

impl Action {
  pub const ALL: [Action; 3] = [Action::View, Action::Edit, Action::Delete];
}

/// One module×action permission.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Grant {
  pub module: Module,
  pub action: Action,
}

// ─── Roles ────────────────────────────────────────────────────────────────────

/// A named, persistable set of grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
  pub name:   String,
  pub grants: Vec<Grant>,
}

impl Role {
  /// The built-in role holding every grant; ensured at server startup.
  pub fn admin() -> Self {
    let grants = Module::ALL
      .into_iter()
      .flat_map(|module| {
        Action::ALL.into_iter().map(move |action| Grant { module, action })
      })
      .collect();
    Self { name: "admin".to_string(), grants }
  }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// The flattened permissions of one user — the union of their roles' grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
  grants: BTreeSet<Grant>,
}

impl PermissionSet {
  pub fn allows(&self, module: Module, action: Action) -> bool {
    self.grants.contains(&Grant { module, action })
  }

  pub fn is_empty(&self) -> bool { self.grants.is_empty() }
}

/// Union the grants of every role a user holds. Duplicate and overlapping
/// grants collapse; an empty role list yields an empty set (deny-all).
pub fn resolve<'a, I>(roles: I) -> PermissionSet
where
  I: IntoIterator<Item = &'a Role>,
{
  let grants = roles
    .into_iter()
    .flat_map(|role| role.grants.iter().copied())
    .collect();
  PermissionSet { grants }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn viewer() -> Role {
    Role {
      name:   "viewer".into(),
      grants: vec![
        Grant { module: Module::Records, action: Action::View },
        Grant { module: Module::Dashboard, action: Action::View },
      ],
    }
  }

  fn records_editor() -> Role {
    Role {
      name:   "records_editor".into(),
      grants: vec![
        Grant { module: Module::Records, action: Action::View },
        Grant { module: Module::Records, action: Action::Edit },
      ],
    }
  }

  #[test]
  fn no_roles_means_deny_all() {
    let perms = resolve(std::iter::empty::<&Role>());
    assert!(perms.is_empty());
    for module in Module::ALL {
      for action in Action::ALL {
        assert!(!perms.allows(module, action));
      }
    }
  }

  #[test]
  fn resolution_is_the_union_of_grants() {
    let (v, e) = (viewer(), records_editor());
    let perms = resolve([&v, &e]);

    assert!(perms.allows(Module::Records, Action::View));
    assert!(perms.allows(Module::Records, Action::Edit));
    assert!(perms.allows(Module::Dashboard, Action::View));
    assert!(!perms.allows(Module::Records, Action::Delete));
    assert!(!perms.allows(Module::People, Action::View));
  }

  #[test]
  fn overlapping_grants_collapse() {
    let (v, e) = (viewer(), records_editor());
    let once = resolve([&v]);
    let twice = resolve([&v, &v, &e]);
    // Same record-view answer regardless of how many roles granted it.
    assert_eq!(
      once.allows(Module::Records, Action::View),
      twice.allows(Module::Records, Action::View)
    );
  }

  #[test]
  fn admin_role_grants_everything() {
    let admin = Role::admin();
    let perms = resolve([&admin]);
    for module in Module::ALL {
      for action in Action::ALL {
        assert!(perms.allows(module, action), "{module:?}/{action:?}");
      }
    }
  }

  #[test]
  fn grants_serialize_snake_case() {
    let grant = Grant { module: Module::Records, action: Action::Delete };
    let json = serde_json::to_value(&grant).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "module": "records", "action": "delete" })
    );
  }
}
