use std::io::{self, Write};

use taskboard::config::{parse_base_url, Config, DEFAULT_API_URL};
use taskboard::error::{Result, TrackerError};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Taskboard CLI Configuration");
    println!("===========================\n");

    let api_url = prompt(&format!("Enter the API base URL [{DEFAULT_API_URL}]: "))?;
    let api_url = if api_url.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        api_url
    };
    parse_base_url(&api_url)?;

    let log_level = prompt("Enter the default log level (error, warn, info, debug) [optional]: ")?;

    let config = Config {
        api_url: Some(api_url),
        request_timeout_secs: None,
        log_level: (!log_level.is_empty()).then_some(log_level),
    };
    let contents = toml::to_string(&config)
        .map_err(|e| TrackerError::validation("config", e.to_string()))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TrackerError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    std::fs::write(&config_path, contents).map_err(|e| TrackerError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'taskboard' commands!");

    Ok(())
}
