use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{Logs, Plots},
    tui, Update,
};

const TABS: [&str; 2] = ["Plots", "Logs"];

#[derive(Default, PartialEq, Eq)]
enum State {
    #[default]
    Train,
    /// The agent hung up; keep showing the final plots
    Finished,
    Quit,
}

/// The root TUI component which holds the main app state and runs the render loop
pub struct App {
    state: State,
    episode: u32,
    total_episodes: u32,
    selected_tab: usize,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(plots: &[&'static str], episodes: u32) -> Self {
        Self {
            state: State::default(),
            episode: 0,
            total_episodes: episodes.max(1),
            selected_tab: 0,
            plots: Plots::new(plots.to_vec(), episodes),
            logs: Logs::new(),
        }
    }

    /// Initialize the terminal and run the main loop
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, plot_rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        while self.state != State::Quit {
            if self.state == State::Train {
                loop {
                    match plot_rx.try_recv() {
                        Ok(update) => {
                            self.episode = update.episode;
                            self.plots.update(update);
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            self.state = State::Finished;
                            break;
                        }
                    }
                }
            }

            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(Duration::from_millis(16))? {
                if let Some(key) = event_keycode(&event::read()?) {
                    self.handle_key(key);
                }
            }
        }

        tui::restore()
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.state = State::Quit,
            KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            KeyCode::Left if self.selected_tab == 0 => self.plots.prev_plot(),
            KeyCode::Right if self.selected_tab == 0 => self.plots.next_plot(),
            _ if self.selected_tab == 1 => {
                self.logs.handle_key(key);
            }
            _ => {}
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => self.plots.render(main_area, buf),
            _ => self.logs.render(main_area, buf),
        }

        let title = match self.state {
            State::Train => "Progress",
            _ => "Finished (q to quit)",
        };
        Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(title))
            .gauge_style(Color::Cyan)
            .label(format!("Episode {}", self.episode))
            .ratio((self.episode as f64 / self.total_episodes as f64).min(1.0))
            .render(progress_area, buf);
    }
}

/// Returns the [`KeyCode`] of a key press, ignoring every other event
fn event_keycode(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key.code),
        _ => None,
    }
}
