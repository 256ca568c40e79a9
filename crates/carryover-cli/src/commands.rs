use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use carryover_merge::{
    merge_documents, read_document, write_document, MergeStrategy, StrategyConfig,
};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, cli.verbose),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_merge(args: MergeArgs, verbose: bool) -> anyhow::Result<()> {
    let output = check_preconditions(&args.old_file, &args.new_file, args.output_file.as_deref())?;
    let strategy = load_strategy(args.strategy.as_deref(), args.exclude)?;

    println!(
        "Updating {} with {} into {}",
        args.new_file.display().to_string().bold(),
        args.old_file.display().to_string().bold(),
        output.display().to_string().bold()
    );

    let new_doc = read_document(&args.new_file)?;
    let old_doc = read_document(&args.old_file)?;
    let outcome = merge_documents(&new_doc, &old_doc, &strategy)?;
    write_document(&output, &outcome.merged)?;

    println!(
        "{} Updated file saved to {}",
        "✓".green().bold(),
        output.display().to_string().yellow()
    );
    if !outcome.report.is_empty() {
        println!(
            "  {} value mismatch(es) resolved in favour of the new file",
            outcome.report.len().to_string().bold()
        );
        if verbose {
            for mismatch in outcome.report.mismatches() {
                println!("    {mismatch}");
            }
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = StrategyConfig::from_path(&args.strategy)?;
    let strategy = config
        .build()
        .with_context(|| format!("strategy {} is invalid", args.strategy.display()))?;

    println!(
        "{} {} is valid ({} rules)",
        "✓".green().bold(),
        args.strategy.display().to_string().bold(),
        strategy.rule_count()
    );
    for (pattern, action) in strategy.exclude_rules() {
        println!("  exclude {} → {}", pattern.yellow(), action.to_string().cyan());
    }
    for (pattern, action) in strategy.missing_key_rules() {
        println!("  missing key {} → {}", pattern.yellow(), action.to_string().cyan());
    }
    for (pattern, action) in strategy.none_value_rules() {
        println!("  none value {} → {}", pattern.yellow(), action.to_string().cyan());
    }
    for (old_kind, new_kind, action) in strategy.type_mismatch_rules() {
        println!(
            "  type mismatch {} → {}: {}",
            old_kind.to_string().yellow(),
            new_kind.to_string().yellow(),
            action.to_string().cyan()
        );
    }
    for binding in &config.custom {
        println!("  custom {} → {}", binding.pattern.yellow(), binding.handler.to_string().cyan());
    }
    for binding in &config.type_handlers {
        println!("  type {} → {}", binding.kind.to_string().yellow(), binding.handler.to_string().cyan());
    }
    Ok(())
}

/// Validate the input and output locations before any merge work, returning
/// the output path to write.
pub fn check_preconditions(
    old_file: &Path,
    new_file: &Path,
    output_file: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    if !new_file.exists() {
        bail!("new file {} does not exist", new_file.display());
    }
    if !old_file.exists() {
        bail!("old file {} does not exist", old_file.display());
    }
    match output_file {
        Some(output) => {
            let parent = output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            if !parent.is_dir() {
                bail!("output directory {} does not exist", parent.display());
            }
            Ok(output.to_path_buf())
        }
        None => Ok(default_output_path(new_file)),
    }
}

/// `<new dir>/<new stem>_merged.json`.
pub fn default_output_path(new_file: &Path) -> PathBuf {
    let stem = new_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    new_file.with_file_name(format!("{stem}_merged.json"))
}

fn load_strategy(path: Option<&Path>, excludes: Vec<String>) -> anyhow::Result<MergeStrategy> {
    let mut config = match path {
        Some(path) => StrategyConfig::from_path(path)?,
        None => StrategyConfig::default(),
    };
    config.add_excludes(excludes);
    Ok(config.build()?)
}
