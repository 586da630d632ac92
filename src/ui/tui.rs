//! Terminal shell around the selection session: terminal setup/teardown,
//! the blocking event loop, and the card-grid renderer.

use std::io;

use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::info;

use crate::api_client::RankClient;
use crate::key_combo::{key_name, ComboBinding, KeyCombos};
use crate::models::{Action, Ranking, Video};
use crate::selector::{Direction, Phase, ROW_WIDTH};
use crate::session::{RankSession, SubmitOutcome, UndoOutcome};
use crate::utils::format::{format_date_diff, format_duration, format_number_compact};

/// Commands the key bindings can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorCommand {
    ClearActions,
    Undo,
    Skip,
    RemoveFocused,
    Submit,
    ClearFocus,
    ToggleFocused,
    MoveFocus(Direction),
    Fetch,
    ToggleRankings,
    Quit,
}

/// The default binding table. Patterns use press-order key names; overlaps
/// tie-break on registration order.
pub fn default_bindings() -> Vec<ComboBinding<SelectorCommand>> {
    use SelectorCommand::*;

    vec![
        ComboBinding::new("c", ClearActions),
        ComboBinding::new("u", Undo),
        ComboBinding::new("s", Skip),
        ComboBinding::new("r+ ", ToggleFocused),
        ComboBinding::new("r", RemoveFocused),
        ComboBinding::new("Enter", Submit),
        ComboBinding::new("Escape", ClearFocus),
        ComboBinding::new(" ", ToggleFocused),
        ComboBinding::new("ArrowUp", MoveFocus(Direction::Up)),
        ComboBinding::new("ArrowDown", MoveFocus(Direction::Down)),
        ComboBinding::new("ArrowLeft", MoveFocus(Direction::Left)),
        ComboBinding::new("ArrowRight", MoveFocus(Direction::Right)),
        ComboBinding::new("f", Fetch),
        ComboBinding::new("v", ToggleRankings),
        ComboBinding::new("q", Quit),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Selector,
    Rankings,
}

pub struct SelectorTui<C> {
    session: RankSession<C>,
    combos: KeyCombos<SelectorCommand>,
    view: View,
    rankings: Vec<Ranking>,
    /// Last transient outcome shown in the footer.
    notice: Option<String>,
    /// Whether the terminal reports key releases. Held chords need this.
    release_events: bool,
}

impl<C: RankClient> SelectorTui<C> {
    pub fn new(session: RankSession<C>) -> Self {
        Self {
            session,
            combos: KeyCombos::new(default_bindings()),
            view: View::Selector,
            rankings: Vec::new(),
            notice: None,
            release_events: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;

        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        info!(target: "system", "key release events: {}", self.release_events);

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableFocusChange) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("failed to setup terminal: {e}"));
        }
        if self.release_events {
            let _ = execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            );
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal);

        // Always restore the terminal, even on error.
        if self.release_events {
            let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableFocusChange
        );
        let _ = disable_raw_mode();
        let _ = terminal.show_cursor();

        res
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh();
        terminal.draw(|f| self.ui(f))?;

        loop {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Release => {
                        if let Some(name) = key_name(&key) {
                            self.combos.key_up(&name);
                        }
                    }
                    KeyEventKind::Repeat => {}
                    KeyEventKind::Press => {
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c')
                        {
                            break;
                        }
                        let Some(name) = key_name(&key) else {
                            continue;
                        };
                        let fire = self.combos.key_down(&name);
                        let exit = match fire {
                            Some(fire) => self.dispatch(fire.command),
                            None => false,
                        };
                        // Without release reporting the held set would never
                        // drain, so each press is released immediately.
                        if !self.release_events {
                            self.combos.key_up(&name);
                        }
                        if exit {
                            break;
                        }
                        terminal.draw(|f| self.ui(f))?;
                    }
                },
                Event::FocusLost => self.combos.reset(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one command. Returns true when the loop should exit.
    fn dispatch(&mut self, command: SelectorCommand) -> bool {
        match command {
            SelectorCommand::Quit => return true,
            SelectorCommand::ClearActions => self.session.selector_mut().clear_actions(),
            SelectorCommand::ClearFocus => self.session.selector_mut().clear_focus(),
            SelectorCommand::MoveFocus(direction) => {
                self.session.selector_mut().move_focus(direction)
            }
            SelectorCommand::ToggleFocused => {
                let remove_held = self.combos.is_held("r");
                self.session.selector_mut().toggle_focused(remove_held);
            }
            SelectorCommand::RemoveFocused => self.session.selector_mut().remove_focused(),
            SelectorCommand::Fetch => self.refresh(),
            SelectorCommand::Submit => match self.session.submit() {
                Ok(SubmitOutcome::Submitted { record_id }) => {
                    self.notice = Some(format!("Submitted ({record_id})"));
                }
                Ok(SubmitOutcome::Refused(status)) => {
                    self.notice = Some(status.message().to_string());
                }
                Err(err) => self.notice = Some(err.detail()),
            },
            SelectorCommand::Skip => match self.session.skip() {
                Ok(record_id) => self.notice = Some(format!("Skipped ({record_id})")),
                Err(err) => self.notice = Some(err.detail()),
            },
            SelectorCommand::Undo => match self.session.undo() {
                Ok(UndoOutcome::Undone { record_id }) => {
                    self.notice = Some(format!("Undid {record_id}"));
                }
                Ok(UndoOutcome::NothingToUndo) => {
                    self.notice = Some("Nothing to undo".to_string());
                }
                Err(err) => self.notice = Some(err.detail()),
            },
            SelectorCommand::ToggleRankings => {
                if self.view == View::Rankings {
                    self.view = View::Selector;
                } else {
                    match self.session.rankings() {
                        Ok(rankings) => {
                            self.rankings = rankings;
                            self.view = View::Rankings;
                        }
                        Err(err) => self.notice = Some(err.detail()),
                    }
                }
            }
        }
        false
    }

    fn refresh(&mut self) {
        if let Err(err) = self.session.fetch() {
            self.notice = Some(err.detail());
        } else {
            self.notice = None;
        }
    }

    // --- rendering ---------------------------------------------------------

    fn ui(&self, f: &mut Frame) {
        match self.view {
            View::Selector => self.render_selector(f),
            View::Rankings => self.render_rankings(f),
        }
    }

    fn render_selector(&self, f: &mut Frame) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(4)]).areas(f.area());

        let selector = self.session.selector();
        if selector.is_empty() {
            let message = match selector.phase() {
                Phase::Loading => "Loading",
                Phase::Error(_) => "Failed to fetch videos",
                Phase::Ready => "No videos",
            };
            let screen = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    message,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("press f to fetch a new batch"),
            ])
            .alignment(Alignment::Center);
            f.render_widget(screen, body);
        } else {
            self.render_grid(f, body);
        }

        self.render_footer(f, footer);
    }

    fn render_grid(&self, f: &mut Frame, area: Rect) {
        let selector = self.session.selector();
        let chunks: Vec<&[Video]> = selector.videos().chunks(ROW_WIDTH).collect();
        let rows = Layout::vertical(vec![
            Constraint::Ratio(1, chunks.len() as u32);
            chunks.len()
        ])
        .split(area);

        for (chunk, row) in chunks.iter().zip(rows.iter()) {
            let cells =
                Layout::horizontal(vec![Constraint::Ratio(1, ROW_WIDTH as u32); ROW_WIDTH])
                    .split(*row);
            for (video, cell) in chunk.iter().zip(cells.iter()) {
                self.render_card(f, *cell, video);
            }
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, video: &Video) {
        let selector = self.session.selector();
        let action = selector.action(&video.id);
        let focused = selector.current_id() == Some(video.id.as_str());

        let (marker, color) = match action {
            Action::Select => ("[+] ", Color::Green),
            Action::Remove => ("[x] ", Color::Red),
            Action::Nothing => ("", Color::Reset),
        };

        let mut border_style = Style::default().fg(color);
        if focused {
            border_style = Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
        }

        let now = Utc::now();
        let lines = vec![
            Line::from(Span::styled(
                format!("{marker}{}", video.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(video.channel.clone()),
            Line::from(format!(
                "{} · {} views",
                format_duration(&video.duration),
                format_number_compact(video.stats.n_views),
            )),
            Line::from(Span::styled(
                format_date_diff(&video.published_at, &now),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let card = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        f.render_widget(card, area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let selector = self.session.selector();

        let status_line = match selector.phase() {
            Phase::Loading => Line::from("Loading..."),
            Phase::Error(detail) => Line::from(Span::styled(
                detail.clone(),
                Style::default().fg(Color::Red),
            )),
            Phase::Ready => {
                let status = selector.submit_status();
                let style = if status.is_ready() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Line::from(vec![
                    Span::styled(status.message(), style),
                    Span::raw(format!(" · {} submitted", selector.history_len())),
                ])
            }
        };

        let notice_line = match &self.notice {
            Some(notice) => Line::from(notice.clone()),
            None => Line::from(""),
        };

        let help_line = Line::from(Span::styled(
            "space select · r remove · arrows move · enter submit · s skip · u undo · c clear · f refresh · v rankings · q quit",
            Style::default().fg(Color::DarkGray),
        ));

        let footer = Paragraph::new(vec![status_line, notice_line, help_line])
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(footer, area);
    }

    fn render_rankings(&self, f: &mut Frame) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).areas(f.area());

        let items: Vec<ListItem> = self
            .rankings
            .iter()
            .map(|ranking| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>4}  ", ranking.rank),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("{:>7.1}  ", ranking.rating)),
                    Span::raw(ranking.video.title.clone()),
                    Span::styled(
                        format!("  ({})", ranking.video.channel),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Rankings ({})", self.rankings.len())),
        );
        f.render_widget(list, body);

        let help = Paragraph::new(Line::from(Span::styled(
            "v back to videos · q quit",
            Style::default().fg(Color::DarkGray),
        )))
        .block(Block::default().borders(Borders::TOP));
        f.render_widget(help, footer);
    }
}
