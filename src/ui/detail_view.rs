use super::market_view::last_move;
use super::money;
use crate::app::{App, FocusTarget};
use crate::sim::game::Game;
use crate::sim::property::Property;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline, Wrap};

pub fn render(frame: &mut Frame, area: Rect, app: &App, game: &Game) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(10),
        ])
        .split(area);

    let selected = match app.focus() {
        FocusTarget::Market => game.market.listing().get(app.selected_listing).copied(),
        FocusTarget::Portfolio => game.market.owned().get(app.selected_owned).copied(),
    };

    render_summary(frame, layout[0], selected);
    render_chart(frame, layout[1], selected);
    render_news(frame, layout[2], game);
    render_messages(frame, layout[3], game);
}

fn render_summary(frame: &mut Frame, area: Rect, property: Option<&Property>) {
    let lines = match property {
        Some(property) => vec![
            Line::from(vec![
                Span::styled(
                    property.title(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", property.district.name())),
            ]),
            Line::from(vec![
                Span::raw(format!("Now {}  ", money(property.current_price))),
                last_move(property),
            ]),
            Line::from(format!(
                "High {}  Low {}",
                money(property.highest_price),
                money(property.lowest_price)
            )),
            Line::from(format!(
                "Listed at {}  Floor {}",
                money(property.initial_price),
                money(property.price_floor())
            )),
        ],
        None => vec![Line::from("Select a property to inspect it.")],
    };
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Details").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_chart(frame: &mut Frame, area: Rect, property: Option<&Property>) {
    let data: Vec<u64> = property
        .map(|property| {
            let floor = property.price_floor();
            property
                .price_history
                .iter()
                .map(|point| point.price.saturating_sub(floor))
                .collect()
        })
        .unwrap_or_default();
    let width = area.width.saturating_sub(2) as usize;
    let start = data.len().saturating_sub(width);
    let sparkline = Sparkline::default()
        .block(Block::default().title("Price history").borders(Borders::ALL))
        .data(&data[start..])
        .style(Style::default().fg(Color::LightCyan));
    frame.render_widget(sparkline, area);
}

fn render_news(frame: &mut Frame, area: Rect, game: &Game) {
    let now = game.now();
    let items: Vec<ListItem> = game
        .market
        .news()
        .feed()
        .take(area.height.saturating_sub(2) as usize)
        .map(|event| {
            let style = if event.is_active(now) {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", event.district.code()),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(event.headline.clone(), style),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().title("News").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_messages(frame: &mut Frame, area: Rect, game: &Game) {
    let lines: Vec<Line> = game
        .messages()
        .map(|message| Line::from(message.as_str()))
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Log").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
