use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
        disable_raw_mode, enable_raw_mode,
    },
};
use sentinel_config::SentinelConfig;
use sentinel_core::api::ApiClient;
use sentinel_core::triage::{HttpTriageQueue, KeyMap, TriageSession, TriageState, TriageView};
use sentinel_model::Verdict;
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Restores the terminal even when the session loop bails out early.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub async fn run(config: SentinelConfig) -> Result<()> {
    let api = ApiClient::new(config.api.base_url.as_str(), config.api.request_timeout)
        .context("failed to build API client")?;
    let session = TriageSession::new(
        Arc::new(HttpTriageQueue::new(api)),
        config.triage.confirm_delay,
    );
    let mut views = session.subscribe();

    let guard = TerminalGuard::enter()?;
    let (key_tx, mut keys) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_keys(key_tx));

    session.fetch_next();
    let keymap = KeyMap;
    let initial = session.view();
    render(&initial)?;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                render(&view)?;
            }
            key = keys.recv() => {
                let Some(key) = key else { break };
                if is_quit(&key) {
                    break;
                }
                if let Some(action) = keymap.translate(&key) {
                    if action.apply(&session).is_none() {
                        tracing::debug!(?action, state = %session.state(), "key ignored");
                    }
                }
            }
        }
    }

    session.dispose();
    drop(keys);
    drop(guard);
    match reader.await {
        Ok(result) => result,
        Err(err) => Err(err).context("key reader task failed"),
    }?;

    let view = session.view();
    println!(
        "triage finished: {} submitted, {} skipped",
        view.submitted, view.skipped
    );
    Ok(())
}

/// Forward key presses until the receiving side goes away.
fn read_keys(keys: mpsc::UnboundedSender<KeyEvent>) -> Result<()> {
    while !keys.is_closed() {
        if !event::poll(POLL_INTERVAL).context("poll terminal events")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read terminal event")? {
            if keys.send(key).is_err() {
                break;
            }
        }
    }
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn render(view: &TriageView) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    for line in view_lines(view) {
        // Raw mode does not translate \n into a carriage return.
        write!(stdout, "{line}\r\n")?;
    }
    stdout.flush()?;
    Ok(())
}

pub fn view_lines(view: &TriageView) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Sentinel triage    submitted {}    skipped {}",
            view.submitted, view.skipped
        ),
        String::new(),
    ];

    match view.state {
        TriageState::Loading => lines.push("Loading next task...".into()),
        TriageState::Empty => lines.push("No tasks pending. Press r to check again.".into()),
        TriageState::Failed(_) => {
            lines.push(format!("Error: {}", view.state));
            if let Some(error) = &view.last_error {
                lines.push(format!("  {error}"));
            }
        }
        TriageState::Ready | TriageState::Submitting => {}
    }

    if let Some(task) = &view.task {
        let confidence = (task.confidence.clamp(0.0, 1.0) * 100.0).round();
        lines.push(format!("Task     {}", task.id));
        lines.push(format!("Label    {} ({confidence}%)", task.label));
        if let Some(camera) = &task.camera_id {
            lines.push(format!("Camera   {camera}"));
        }
        lines.push(format!("Image    {}", task.image));
    }

    if let Some(verdict) = view.flash {
        lines.push(String::new());
        lines.push(match verdict {
            Verdict::Accepted => "  >> CONFIRMED <<".to_string(),
            Verdict::Rejected => "  >> REJECTED <<".to_string(),
        });
    }

    lines.push(String::new());
    lines.push(
        "[y] confirm  [n] reject  [s] skip  [r] retry  [q] quit".to_string(),
    );
    lines
}
