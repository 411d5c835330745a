use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, ThemePreference};
use crate::scoring::{
    Factor, MarketType, RawWeights, ScoringConfig, WeightConfig, DEFAULT_PRECISION, MAX_PRECISION, MAX_WEIGHT,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until the answer parses as a number in `0..=max`.
fn prompt_number(message: &str, default: u32, max: u32) -> Result<u32> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<u32>() {
            Ok(v) if v <= max => return Ok(v),
            _ => println!("  Invalid: enter a whole number from 0 to {}. Try again.", max),
        }
    }
}

fn prompt_market_type() -> Result<MarketType> {
    loop {
        let input = prompt_with_default("Market type (security, medical, school)", "security")?;
        match input.to_lowercase().as_str() {
            "security" => return Ok(MarketType::Security),
            "medical" => return Ok(MarketType::Medical),
            "school" => return Ok(MarketType::School),
            _ => println!("  Invalid: choose security, medical or school. Try again."),
        }
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Expansion Score Configuration Wizard");
    println!("====================================");
    println!();

    let market_type = prompt_market_type()?;

    println!();
    println!("Weights are relative: they are rescaled so the active factors add up to 100.");
    println!("Seasonality only counts for the school market.");
    let mut weights = RawWeights::default();
    for factor in Factor::ALL {
        let value = prompt_number(factor.label(), factor.default_weight(), MAX_WEIGHT)?;
        weights.set(factor, value);
    }

    println!();
    let precision = prompt_number("Decimal places for scores", DEFAULT_PRECISION, MAX_PRECISION)?;

    println!();
    let data_input = prompt_with_default("CSV file to load instead of the built-in data (blank for none)", "")?;
    let data_file = if data_input.is_empty() {
        None
    } else {
        Some(PathBuf::from(data_input))
    };

    let config = Config {
        market_type: Some(market_type),
        data_file,
        scoring: Some(ScoringConfig {
            weights: Some(WeightConfig::from_raw(&weights)),
            precision: Some(precision),
        }),
        theme: Some(ThemePreference::Auto),
    };

    // Resolve the output path
    let config_path = match default_path {
        Some(p) => p,
        None => {
            let default = get_config_path()?;
            PathBuf::from(prompt_with_default(
                "Config file path",
                &default.display().to_string(),
            )?)
        }
    };

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            println!("Aborted. Existing config left unchanged.");
            return Ok(());
        }
    }

    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    Ok(())
}

/// Serialize `config` as YAML and write it atomically, creating parent
/// directories as needed.
pub(crate) fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config).context("Failed to serialize config to YAML")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}
