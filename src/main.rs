mod app;
mod config;
mod persist;
mod sim;
mod ui;

use anyhow::Result;
use app::{App, FocusTarget};
use config::{Config, load_config};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use persist::{PLAYER_KEY, SYSTEM_KEY, SaveQueue, Storage, encode, load_game, save_game};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sim::game::Game;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config)?;

    let storage = Storage::new(config.save_dir.clone());
    let (mut game, loaded) = load_game(&storage, config);
    if loaded {
        game.add_message("Loaded save state.");
    } else {
        game.add_message("Welcome! Ten billion in the bank. Spend it.");
    }

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut game, &storage).await;
    restore_terminal(&mut terminal)?;

    save_game(&storage, &game);
    info!("shutdown");
    result
}

fn init_tracing(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    storage: &Storage,
) -> Result<()> {
    let mut app = App::new();

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    task::spawn(async move {
        loop {
            match task::spawn_blocking(crossterm::event::read).await {
                Ok(Ok(event)) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(Err(_)) => break,
                Err(_) => break,
            }
        }
    });

    let (written_tx, mut written_rx) = mpsc::unbounded_channel::<Vec<(String, String)>>();
    let mut queue = SaveQueue::new(game.config.save_debounce_ms);
    let started = Instant::now();
    let autosave_every = Duration::from_millis(game.config.autosave_interval_ms);
    let mut last_autosave = Instant::now();

    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);
    let mut should_quit = false;

    loop {
        terminal.draw(|f| ui::render(f, &app, game))?;
        if should_quit {
            break;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        tokio::select! {
            Some(event) = input_rx.recv() => {
                if handle_event(event, &mut app, game)? {
                    should_quit = true;
                }
            }
            Some(failed) = written_rx.recv() => {
                queue.finish(failed);
            }
            _ = tokio::time::sleep(timeout) => {
                let delta = last_tick.elapsed();
                last_tick = Instant::now();
                game.update(delta);
                app.clamp_listing_selection(game.market.listing().len());
                app.clamp_owned_selection(game.market.owned().len());

                if game.take_dirty() || last_autosave.elapsed() >= autosave_every {
                    request_save(&mut queue, game);
                    last_autosave = Instant::now();
                }
                if let Some(batch) = queue.take_due(started.elapsed().as_millis() as u64) {
                    let storage = storage.clone();
                    let written_tx = written_tx.clone();
                    task::spawn_blocking(move || {
                        let failed = storage.write_batch(batch);
                        let _ = written_tx.send(failed);
                    });
                }
            }
        }
    }

    while queue.is_in_flight() {
        match written_rx.recv().await {
            Some(failed) => queue.finish(failed),
            None => break,
        }
    }
    // The final save in main supersedes anything still queued.
    queue.drain();
    Ok(())
}

fn request_save(queue: &mut SaveQueue, game: &Game) {
    match encode(&game.player_save()) {
        Ok(payload) => queue.request(PLAYER_KEY, payload),
        Err(err) => error!("encoding player save failed: {err:#}"),
    }
    match encode(&game.system_save()) {
        Ok(payload) => queue.request(SYSTEM_KEY, payload),
        Err(err) => error!("encoding system save failed: {err:#}"),
    }
}

fn handle_event(event: Event, app: &mut App, game: &mut Game) -> Result<bool> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, app, game),
        Event::Resize(_, _) => Ok(false),
        _ => Ok(false),
    }
}

fn handle_key_event(key: KeyEvent, app: &mut App, game: &mut Game) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    if app.board_open {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('L')
        ) {
            app.toggle_board();
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Ok(true),
        KeyCode::Char('l') | KeyCode::Char('L') => {
            app.toggle_board();
            Ok(false)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => {
            let active = game.is_active();
            game.set_active(!active);
            Ok(false)
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.next_focus();
            Ok(false)
        }
        KeyCode::Left => {
            app.set_focus(FocusTarget::Market);
            Ok(false)
        }
        KeyCode::Right => {
            app.set_focus(FocusTarget::Portfolio);
            Ok(false)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            let len = focused_len(app, game);
            app.move_selection(-1, len);
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            let len = focused_len(app, game);
            app.move_selection(1, len);
            Ok(false)
        }
        KeyCode::Enter => {
            handle_enter(app, game);
            Ok(false)
        }
        KeyCode::Char('c') => {
            match selected_owned(app, game) {
                Some(id) => {
                    if let Err(err) = game.collect_rent(&id) {
                        game.add_message(format!("Rent: {err}"));
                    }
                }
                None => game.add_message("Select an owned property to collect rent."),
            }
            Ok(false)
        }
        KeyCode::Char('C') => {
            game.collect_all_rent();
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn focused_len(app: &App, game: &Game) -> usize {
    match app.focus() {
        FocusTarget::Market => game.market.listing().len(),
        FocusTarget::Portfolio => game.market.owned().len(),
    }
}

fn selected_owned(app: &App, game: &Game) -> Option<String> {
    game.market
        .owned()
        .get(app.selected_owned)
        .map(|property| property.id.clone())
}

fn handle_enter(app: &mut App, game: &mut Game) {
    match app.focus() {
        FocusTarget::Market => {
            let Some(id) = game
                .market
                .listing()
                .get(app.selected_listing)
                .map(|property| property.id.clone())
            else {
                game.add_message("Nothing listed right now.");
                return;
            };
            if let Err(err) = game.buy(&id) {
                game.add_message(format!("Purchase failed: {err}"));
            }
            app.clamp_listing_selection(game.market.listing().len());
        }
        FocusTarget::Portfolio => {
            let Some(id) = selected_owned(app, game) else {
                game.add_message("You do not own anything yet.");
                return;
            };
            if let Err(err) = game.sell(&id) {
                game.add_message(format!("Sale failed: {err}"));
            }
            app.clamp_owned_selection(game.market.owned().len());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
