use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;
use std::path::PathBuf;

const ABOUT: &str = "OpenWeatherMap weather dashboard";

const LONG_ABOUT: &str = "
Terminal dashboard showing current conditions and a 24-hour temperature timeline sourced from
OpenWeatherMap.

The API key is read from the API_KEY environment variable (a .env file in the working directory
is loaded first). Type a city name into the Location box and press Enter to load its dashboard.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(default_value = "Karachi", help = "City shown on start-up (e.g. Karachi, Lahore)")]
    pub city: String,

    #[arg(long, value_name = "SECS", help = "Reload the dashboard every SECS seconds")]
    pub refresh: Option<u64>,

    #[arg(long, value_name = "PATH", help = "Write debug logs to PATH (filter with RUST_LOG)")]
    pub log_file: Option<PathBuf>,
}
