mod events;
mod history;
mod home;
mod interview;
mod report;
mod run;

use crate::core::api::ApiClient;
use history::HistoryScreen;
use home::HomeScreen;
use run::RunScreen;

pub(crate) const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Navigation request returned by screen handlers; applied by the app loop.
pub(crate) enum Nav {
    Stay,
    Home,
    History,
    Run(String),
    Quit,
}

enum Screen {
    Home(HomeScreen),
    Run(RunScreen),
    History(HistoryScreen),
}

/// The terminal client. One cooperative loop: drain async results, draw,
/// handle input. Screens own their async work and tear it down on switch.
pub struct App {
    api: ApiClient,
    screen: Screen,
    should_quit: bool,
    tick_count: usize,
}

impl App {
    /// Open on the idea form.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            screen: Screen::Home(HomeScreen::new()),
            should_quit: false,
            tick_count: 0,
        }
    }

    /// Open directly on a run view, polling from the first frame.
    pub fn watch(api: ApiClient, run_id: String) -> Self {
        let screen = Screen::Run(RunScreen::open(&api, run_id));
        Self {
            api,
            screen,
            should_quit: false,
            tick_count: 0,
        }
    }

    async fn navigate(&mut self, nav: Nav) {
        match nav {
            Nav::Stay => {}
            Nav::Home => self.screen = Screen::Home(HomeScreen::new()),
            Nav::History => self.screen = Screen::History(HistoryScreen::load(&self.api).await),
            Nav::Run(run_id) => self.screen = Screen::Run(RunScreen::open(&self.api, run_id)),
            Nav::Quit => self.should_quit = true,
        }
    }
}
