use super::money;
use crate::sim::achievements::{ACHIEVEMENTS, AchievementContext};
use crate::sim::game::Game;
use crate::sim::property::Property;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem};

pub fn render(frame: &mut Frame, game: &Game) {
    let area = centered_rect(70, 70, frame.size());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title("Leaderboard & Achievements  (Esc/L to close)")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let standings: Vec<ListItem> = game
        .standings()
        .into_iter()
        .map(|entry| {
            let style = if entry.is_player {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![Span::styled(
                format!("#{:<2} {:<16} {}", entry.rank, entry.name, money(entry.assets)),
                style,
            )]))
        })
        .collect();
    frame.render_widget(
        List::new(standings).block(Block::default().title("Rich List").borders(Borders::ALL)),
        columns[0],
    );

    let owned: Vec<&Property> = game.market.owned();
    let ctx = AchievementContext {
        stats: &game.player.stats,
        owned: &owned,
        total_assets: game.total_assets(),
    };
    let achievements: Vec<ListItem> = ACHIEVEMENTS
        .iter()
        .map(|achievement| {
            let unlocked = game.achievements.is_unlocked(achievement.id);
            let (current, target) = achievement.condition.progress(&ctx);
            let marker = if unlocked { "✔" } else { " " };
            let style = if unlocked {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            let percent = if target == 0 {
                100
            } else {
                current.saturating_mul(100) / target
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{marker} {} ({percent}%)", achievement.name),
                    style,
                )),
                Line::from(format!("   {}", achievement.description)),
            ])
        })
        .collect();
    frame.render_widget(
        List::new(achievements)
            .block(Block::default().title("Achievements").borders(Borders::ALL)),
        columns[1],
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
