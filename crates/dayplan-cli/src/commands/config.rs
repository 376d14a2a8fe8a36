use clap::Subcommand;
use dayplan_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config as TOML
    Show,
    /// Get a config value
    Get {
        /// Config key (e.g. "workday.timezone", "capacity.work_minutes")
        key: String,
    },
}

pub fn run(action: ConfigAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
    }
    Ok(())
}
