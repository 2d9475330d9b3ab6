//! Application state machine and event dispatcher.

use std::{collections::HashMap, sync::Arc};

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;
use vigia_core::lifecycle::{ClassifiedRecord, LifecycleState};

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the record list; right pane is empty or shows a preview.
  RecordList,
  /// Focus on the record detail pane.
  RecordDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Per-state totals shown in the status bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateCounts {
  pub current:    usize,
  pub expiring:   usize,
  pub expired:    usize,
  pub in_renewal: usize,
}

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// All record rows returned by the API on the last load, classified
  /// against `as_of`.
  pub rows: Vec<ClassifiedRecord>,

  /// The reference day the current rows were classified against. Captured
  /// once per load so the whole table agrees even across midnight.
  pub as_of: NaiveDate,

  /// Display names per person, loaded once per refresh.
  pub person_names: HashMap<Uuid, String>,

  /// Display names per requirement, loaded once per refresh.
  pub requirement_names: HashMap<Uuid, String>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* record list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// Id of the currently-selected record (detail pane).
  pub selected_record_id: Option<Uuid>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty record list.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::RecordList,
      rows: Vec::new(),
      as_of: Local::now().date_naive(),
      person_names: HashMap::new(),
      requirement_names: HashMap::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected_record_id: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch records, people, and requirements from the API.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading records…".into();
    self.as_of = Local::now().date_naive();

    let rows = match self.client.list_records(self.as_of).await {
      Ok(rows) => rows,
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return Err(e);
      }
    };

    let people = self.client.list_people().await.unwrap_or_default();
    let requirements = self.client.list_requirements().await.unwrap_or_default();

    self.person_names = people
      .into_iter()
      .map(|p| (p.person_id, p.full_name))
      .collect();
    self.requirement_names = requirements
      .into_iter()
      .map(|r| (r.requirement_id, r.name))
      .collect();

    self.rows = rows;
    self.list_cursor = 0;
    self.status_msg = String::new();
    Ok(())
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub fn person_name(&self, id: Uuid) -> &str {
    self.person_names.get(&id).map(String::as_str).unwrap_or("—")
  }

  pub fn requirement_name(&self, id: Uuid) -> &str {
    self
      .requirement_names
      .get(&id)
      .map(String::as_str)
      .unwrap_or("—")
  }

  /// Per-state totals over *all* loaded rows (the filter does not change
  /// the dashboard numbers).
  pub fn counts(&self) -> StateCounts {
    let mut counts = StateCounts::default();
    for row in &self.rows {
      match row.classification.state {
        LifecycleState::Current => counts.current += 1,
        LifecycleState::Expiring => counts.expiring += 1,
        LifecycleState::Expired => counts.expired += 1,
        LifecycleState::InRenewal => counts.in_renewal += 1,
      }
    }
    counts
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Returns rows that match the current filter query.
  pub fn filtered_rows(&self) -> Vec<&ClassifiedRecord> {
    if self.filter.is_empty() {
      return self.rows.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .rows
      .iter()
      .filter(|row| {
        let person = self.person_name(row.record.person_id);
        let requirement = self.requirement_name(row.record.requirement_id);
        matcher.fuzzy_match(person, &self.filter).is_some()
          || matcher.fuzzy_match(requirement, &self.filter).is_some()
          || matcher
            .fuzzy_match(row.classification.state.label(), &self.filter)
            .is_some()
      })
      .collect()
  }

  /// The row under the list cursor in the filtered view, if any.
  pub fn cursor_row(&self) -> Option<&ClassifiedRecord> {
    let list = self.filtered_rows();
    list.get(self.list_cursor).copied()
  }

  /// The currently-selected row (detail pane), if any.
  pub fn selected_row(&self) -> Option<&ClassifiedRecord> {
    let id = self.selected_record_id?;
    self.rows.iter().find(|row| row.record.record_id == id)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      return self.handle_filter_key(key);
    }

    match self.screen {
      Screen::RecordList => self.handle_list_key(key).await,
      Screen::RecordDetail => self.handle_detail_key(key).await,
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let only = {
          let list = self.filtered_rows();
          (list.len() == 1).then(|| list[0].record.record_id)
        };
        if let Some(id) = only {
          self.open_detail(id);
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_rows().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
        }
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_row().map(|row| row.record.record_id) {
          self.open_detail(id);
        }
      }

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      // Reload
      KeyCode::Char('r') => {
        let _ = self.load().await;
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::RecordList;
        self.selected_record_id = None;
        self.detail_scroll = 0;
      }

      // Scroll detail
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll += 1;
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.detail_scroll > 0 {
          self.detail_scroll -= 1;
        }
      }

      // Navigate list from detail (for quick switching)
      KeyCode::Char(']') | KeyCode::PageDown => {
        let next = {
          let list = self.filtered_rows();
          (self.list_cursor + 1 < list.len())
            .then(|| list[self.list_cursor + 1].record.record_id)
        };
        if let Some(id) = next {
          self.list_cursor += 1;
          self.open_detail(id);
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        let prev = {
          let list = self.filtered_rows();
          (self.list_cursor > 0)
            .then(|| list[self.list_cursor - 1].record.record_id)
        };
        if let Some(id) = prev {
          self.list_cursor -= 1;
          self.open_detail(id);
        }
      }

      _ => {}
    }
    Ok(true)
  }

  /// Transition to `RecordDetail` for `record_id`.
  fn open_detail(&mut self, record_id: Uuid) {
    self.selected_record_id = Some(record_id);
    self.detail_scroll = 0;
    self.screen = Screen::RecordDetail;
  }
}
