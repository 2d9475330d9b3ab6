//! Record list pane — left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::{app::App, ui::state_color};

/// Render the record list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_rows();
  let total = app.rows.len();

  // Title with count.
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Acreditaciones ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Acreditaciones ({}) ", total)
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  // Build list items.
  let items: Vec<ListItem> = filtered
    .iter()
    .enumerate()
    .map(|(i, row)| {
      let person = app.person_name(row.record.person_id);
      let requirement = app.requirement_name(row.record.requirement_id);
      let state = row.classification.state;

      let is_cursor = i == app.list_cursor;

      let base = if is_cursor {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      let dot_style = if is_cursor {
        base
      } else {
        Style::default().fg(state_color(state))
      };

      let mut spans = vec![
        Span::styled("● ", dot_style),
        Span::styled(format!("{person}  "), base),
        Span::styled(
          requirement.to_string(),
          if is_cursor {
            base
          } else {
            Style::default().fg(Color::Gray)
          },
        ),
      ];
      if row.classification.overridden {
        spans.push(Span::styled(
          "  [manual]",
          if is_cursor {
            base
          } else {
            Style::default().fg(Color::Magenta)
          },
        ));
      }

      ListItem::new(Line::from(spans))
    })
    .collect();

  // Build filter line if active.
  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // If filter is active or set, show a filter bar at the bottom of the inner
  // area. Skip it entirely when the pane is too short to hold one.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    let filter_style = Style::default().fg(Color::Yellow);
    f.render_widget(
      ratatui::widgets::Paragraph::new(filter_text).style(filter_style),
      filter_area,
    );
  }

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    inner_area,
    &mut state,
  );
}

#[cfg(test)]
mod tests {
  use ratatui::{Terminal, backend::TestBackend};

  use crate::{
    app::App,
    client::{ApiClient, ApiConfig},
  };

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://localhost:0".into(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap();
    App::new(client)
  }

  #[test]
  fn filter_bar_is_skipped_on_a_tiny_pane() {
    let mut app = app();
    app.filter_active = true;
    app.filter = "ana".into();

    // Two rows of height leaves no inner space below the borders; the
    // filter bar must not be placed outside the pane.
    let backend = TestBackend::new(12, 2);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
      .draw(|f| {
        let area = f.area();
        super::draw(f, area, &app);
      })
      .unwrap();
  }
}
