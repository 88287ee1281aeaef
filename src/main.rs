use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, time::Duration};

mod animation;
mod app;
mod cli;
mod config;
mod dashboard;
mod driver;
mod error;
mod logging;
mod owm;
mod units;
mod weather;

use crate::app::{run_app, App};
use crate::cli::Args;
use crate::config::Config;
use crate::owm::OwmClient;

const TICK_RATE: Duration = Duration::from_millis(250);

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        logging::init(path)?;
    }

    let config = Config::from_env()?;
    let client = OwmClient::new(&config)?;
    let mut app = App::new(args.city, args.refresh.map(Duration::from_secs));

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &client, TICK_RATE);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(%err, "terminal error");
        println!("{:?}", err)
    }

    Ok(())
}
