use super::money;
use crate::app::{App, FocusTarget};
use crate::sim::game::Game;
use crate::sim::property::Property;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

pub fn render(frame: &mut Frame, area: Rect, app: &App, game: &Game) {
    let highlight = app.focus() == FocusTarget::Market;
    let border_style = if highlight {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let listing = game.market.listing();
    let mut items: Vec<ListItem> = listing
        .iter()
        .map(|property| {
            let affordable = game.player.cash >= property.current_price;
            let name_style = Style::default().fg(if affordable {
                Color::Yellow
            } else {
                Color::DarkGray
            });
            let line = Line::from(vec![
                Span::styled(property.id.clone(), name_style),
                Span::raw(" "),
                Span::styled(
                    "★".repeat(property.star_rating as usize),
                    Style::default().fg(Color::LightYellow),
                ),
                Span::raw(" "),
                Span::raw(money(property.current_price)),
                Span::raw(" "),
                last_move(property),
            ]);
            let detail = Line::from(vec![Span::raw(format!(
                "{} • rent {}/mo",
                property.title(),
                money(property.monthly_rent)
            ))]);
            ListItem::new(vec![line, detail])
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Line::from(vec![Span::raw(
            "Trading floor is empty.",
        )])));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Trading Floor")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !listing.is_empty() {
        state.select(Some(app.selected_listing.min(listing.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn last_move(property: &Property) -> Span<'static> {
    let percent = property
        .price_history
        .last()
        .map(|point| point.change_percent * 100.0)
        .unwrap_or(0.0);
    let color = if percent > 0.0 {
        Color::Red
    } else if percent < 0.0 {
        Color::Green
    } else {
        Color::Gray
    };
    Span::styled(format!("{percent:+.1}%"), Style::default().fg(color))
}
