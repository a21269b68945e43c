//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};
use voiceconf::{ConfigSources, OutputFormat, VoiceleadConfig};
use voicelead::{analyze, Music, Rule, RuleSet, Score};

/// Analyse a score file and print the report to stdout.
///
/// CLI rule ids replace the configured ones; `--json` forces JSON output.
pub fn check(path: &Path, rules: Option<Vec<String>>, json: bool, config: &VoiceleadConfig) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read score {}", path.display()))?;
    let score: Score = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse score {}", path.display()))?;

    let ids = rules.unwrap_or_else(|| config.rules.enabled.clone());
    let rule_set = RuleSet::from_ids(&ids);
    debug!(rules = ?rule_set.iter().map(|r| r.id()).collect::<Vec<_>>(), "selected rules");

    let music = analyze(&score, &rule_set)
        .with_context(|| format!("Failed to analyse score {}", path.display()))?;
    info!(
        chords = music.chords().len(),
        mistakes = music.mistakes().count(),
        "analysed {}",
        path.display()
    );

    let format = if json { OutputFormat::Json } else { config.output.format };
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&music).context("Failed to render JSON")?;
            println!("{}", rendered);
        }
        OutputFormat::Text => print!("{}", text_report(&music)),
    }
    Ok(())
}

/// One line per chord, mistakes indented beneath it, then a total.
pub fn text_report(music: &Music) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "key {} {} ({} chords)",
        music.key,
        music.time_sig,
        music.chords().len()
    );

    for (i, chord) in music.chords().iter().enumerate() {
        let _ = writeln!(out, "{:>3}  {} ({})", i + 1, chord.name(), chord.inversion());
        for mistake in chord.mistakes() {
            let _ = writeln!(out, "       {}", mistake);
        }
    }

    let total = music.mistakes().count();
    let _ = match total {
        0 => writeln!(out, "no mistakes"),
        1 => writeln!(out, "1 mistake"),
        n => writeln!(out, "{} mistakes", n),
    };
    out
}

pub fn rules() {
    for rule in Rule::ALL {
        println!("{:<10} {}", rule.id(), rule.description());
    }
}

pub fn show_config(config: &VoiceleadConfig, sources: &ConfigSources) {
    print!("{}", config.to_toml());

    println!();
    if sources.files.is_empty() {
        println!("# no config files loaded");
    }
    for file in &sources.files {
        println!("# loaded {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# overridden by ${}", var);
    }
}
