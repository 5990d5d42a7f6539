use super::{money, signed_money};
use crate::app::{App, FocusTarget};
use crate::sim::game::Game;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

const BAR_WIDTH: usize = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &App, game: &Game) {
    let highlight = app.focus() == FocusTarget::Portfolio;
    let border_style = if highlight {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let now = game.now();
    let owned = game.market.owned();
    let mut items: Vec<ListItem> = owned
        .iter()
        .filter_map(|property| {
            let ownership = property.ownership()?;
            let rent = game.market.rent_status(&property.id, now)?;
            let lock_ms = game.market.lock_remaining(&property.id, now).unwrap_or(0);
            let profit = property.current_price as i64 - ownership.purchase_price as i64;
            let profit_style = Style::default().fg(if profit >= 0 {
                Color::Red
            } else {
                Color::Green
            });
            let lock = if lock_ms > 0 {
                Span::styled(
                    format!(" 🔒{}s", lock_ms.div_ceil(1000)),
                    Style::default().fg(Color::DarkGray),
                )
            } else {
                Span::raw("")
            };
            let line = Line::from(vec![
                Span::styled(property.id.clone(), Style::default().fg(Color::Yellow)),
                Span::raw(format!(" {} ", money(property.current_price))),
                Span::styled(signed_money(profit), profit_style),
                lock,
            ]);
            let filled = ((rent.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
            let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
            let detail = Line::from(vec![
                Span::raw("Rent "),
                Span::styled(bar, Style::default().fg(Color::LightGreen)),
                Span::raw(format!(" {} / {}", money(rent.owed), money(rent.cap))),
            ]);
            Some(ListItem::new(vec![line, detail]))
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Line::from(vec![Span::raw(
            "No properties yet. Buy something!",
        )])));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Portfolio ({})", owned.len()))
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !owned.is_empty() {
        state.select(Some(app.selected_owned.min(owned.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
