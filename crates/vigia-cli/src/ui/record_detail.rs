//! Record detail pane — right panel.

use chrono::NaiveDate;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::{app::App, ui::state_color};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(row) = app.selected_row() else {
    let block = Block::default()
      .title(" Detail ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Press Enter to view a record.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let person = app.person_name(row.record.person_id);
  let requirement = app.requirement_name(row.record.requirement_id);
  let cls = &row.classification;

  let block = Block::default()
    .title(format!(" {person} — {requirement} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(state_color(cls.state)));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  // State headline, with the countdown message next to it.
  let mut state_spans = vec![
    field_label("estado"),
    Span::styled(
      cls.state.label().to_string(),
      Style::default()
        .fg(state_color(cls.state))
        .add_modifier(Modifier::BOLD),
    ),
  ];
  if cls.overridden {
    state_spans.push(Span::styled(
      "  [manual]",
      Style::default().fg(Color::Magenta),
    ));
  }
  lines.push(Line::from(state_spans));

  if let Some(message) = &cls.message {
    lines.push(Line::from(vec![
      field_label(""),
      Span::styled(message.clone(), Style::default().fg(state_color(cls.state))),
    ]));
  }

  // When overridden, show what the dates alone would say.
  if cls.overridden {
    lines.push(Line::from(vec![
      field_label("según fechas"),
      Span::styled(
        cls.computed.label().to_string(),
        Style::default().fg(Color::Gray),
      ),
    ]));
  }

  lines.push(Line::from(""));

  // Dates.
  lines.push(date_line("emisión", row.record.valid_from));
  lines.push(date_line("vencimiento", row.record.expires_on));
  if let Some(days) = cls.days_until {
    lines.push(Line::from(vec![
      field_label("días"),
      Span::raw(days.to_string()),
    ]));
  }

  // Document link, if any.
  if let Some(link) = &row.record.document_link {
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      field_label("documento"),
      Span::styled(link.clone(), Style::default().fg(Color::Cyan)),
    ]));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    field_label("id"),
    Span::styled(
      row.record.record_id.to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  ]));
  lines.push(Line::from(vec![
    field_label("actualizado"),
    Span::styled(
      row.record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  ]));

  let scroll_offset = app.detail_scroll as u16;
  let para = Paragraph::new(lines).scroll((scroll_offset, 0));
  f.render_widget(para, inner);
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn field_label(name: &str) -> Span<'static> {
  Span::styled(
    format!("{:<14}", name),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )
}

fn date_line(name: &str, date: Option<NaiveDate>) -> Line<'static> {
  let value = match date {
    Some(d) => Span::raw(d.format("%Y-%m-%d").to_string()),
    None => Span::styled("—", Style::default().fg(Color::DarkGray)),
  };
  Line::from(vec![field_label(name), value])
}
