use std::sync::Arc;

use clap::Subcommand;
use hospitalization_predictor::error::AppError;
use hospitalization_predictor::preferences::ThemePreference;
use tracing::info;

use crate::infra::Session;

#[derive(Subcommand, Debug)]
pub(crate) enum PrefsCommand {
    /// Show the display language, or save a new one (fr or en)
    Language {
        code: Option<String>,
    },
    /// Show the theme, or flip between light and dark
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

pub(crate) fn run_prefs(command: PrefsCommand) -> Result<(), AppError> {
    let mut session = Session::start()?;

    match command {
        PrefsCommand::Language { code: None } => {
            println!("{}", session.language.current().code());
        }
        PrefsCommand::Language { code: Some(code) } => {
            let language = session.language.set(&code)?;
            info!(language = language.code(), "display language saved");
            println!("{}", language.code());
        }
        PrefsCommand::Theme { toggle } => {
            let mut theme = ThemePreference::initialize(Arc::clone(&session.store));
            if toggle {
                theme.toggle()?;
                info!(dark_mode = theme.is_dark_mode(), "theme saved");
            }
            println!("{}", if theme.is_dark_mode() { "dark" } else { "light" });
        }
    }
    Ok(())
}
