use clap::Subcommand;
use microbreak_core::storage::settings::KEYS;
use microbreak_core::{Settings, SettingsStore, TomlSettingsStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "focus_duration_minutes", "end_sound")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings values
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset settings to defaults
    Reset,
    /// Print the settings file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlSettingsStore::open_default()?;
    match action {
        ConfigAction::Get { key } => {
            let settings = store.load().unwrap_or_default();
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.load().unwrap_or_default();
            settings.set(&key, &value)?;
            store.save(&settings)?;
            println!("ok");
        }
        ConfigAction::List { json } => {
            let settings = store.load().unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                for key in KEYS {
                    if let Some(value) = settings.get(key) {
                        println!("{key} = {value}");
                    }
                }
            }
        }
        ConfigAction::Reset => {
            store.save(&Settings::default())?;
            println!("settings reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
