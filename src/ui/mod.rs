use crate::app::App;
use crate::sim::game::Game;
use crate::sim::leaderboard;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub mod board_view;
pub mod detail_view;
pub mod market_view;
pub mod portfolio_view;

pub fn render(frame: &mut Frame, app: &App, game: &Game) {
    let size = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    render_header(frame, layout[0], game);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(layout[1]);

    market_view::render(frame, columns[0], app, game);
    portfolio_view::render(frame, columns[1], app, game);
    detail_view::render(frame, columns[2], app, game);

    render_footer(frame, layout[2]);

    if app.board_open {
        board_view::render(frame, game);
    }
}

fn render_header(frame: &mut Frame, area: Rect, game: &Game) {
    let state = if game.is_active() {
        Span::styled("LIVE", Style::default().fg(Color::Green))
    } else {
        Span::styled("PAUSED", Style::default().fg(Color::Red))
    };
    let total = game.total_assets();
    let rank = leaderboard::player_rank(game.now(), total);

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Spend Ten Billion",
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  Cash: "),
            Span::styled(money(game.player.cash), Style::default().fg(Color::Yellow)),
            Span::raw("  •  Property: "),
            Span::styled(
                money(game.property_value()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  •  Rank: "),
            Span::styled(format!("#{rank}"), Style::default().fg(Color::Magenta)),
            Span::raw("  •  "),
            Span::raw(clock_label(game.now())),
            Span::raw("  "),
            state,
        ]),
        Line::from(vec![
            Span::raw(format!(
                "Spent {}  •  Earned {}  •  Achievements {}  •  Net worth 24h: ",
                money(game.player.stats.total_spent),
                money(game.player.stats.total_earned),
                game.achievements.unlocked_count()
            )),
            Span::raw(net_worth_trend(game)),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let instructions = Paragraph::new(Line::from(vec![
        Span::raw("Hotkeys: "),
        Span::styled("[J/K]", Style::default().fg(Color::Yellow)),
        Span::raw(" navigate  •  "),
        Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
        Span::raw(" switch panel  •  "),
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" buy/sell  •  "),
        Span::styled("[c/C]", Style::default().fg(Color::Yellow)),
        Span::raw(" collect rent/all  •  "),
        Span::styled("[P]", Style::default().fg(Color::Yellow)),
        Span::raw(" pause  •  "),
        Span::styled("[L]", Style::default().fg(Color::Yellow)),
        Span::raw(" leaderboard  •  "),
        Span::styled("[Q]", Style::default().fg(Color::Yellow)),
        Span::raw(" save & quit"),
    ]))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(instructions, area);
}

fn net_worth_trend(game: &Game) -> String {
    let snapshots = game.assets.snapshots();
    match (snapshots.first(), game.assets.latest()) {
        (Some(first), Some(last)) => signed_money(
            last.total_asset_value as i64 - first.total_asset_value as i64,
        ),
        _ => "n/a".to_string(),
    }
}

pub fn money(amount: u64) -> String {
    let value = amount as f64;
    if amount >= 100_000_000 {
        format!("¥{:.2}B", value / 1_000_000_000.0)
    } else if amount >= 100_000 {
        format!("¥{:.2}M", value / 1_000_000.0)
    } else {
        format!("¥{amount}")
    }
}

pub fn signed_money(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "+" };
    format!("{sign}{}", money(amount.unsigned_abs()))
}

fn clock_label(now_ms: u64) -> String {
    let secs = now_ms / 1000;
    format!("Day {} {:02}:{:02}", secs / 3600 + 1, (secs / 60) % 60, secs % 60)
}
