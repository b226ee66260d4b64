use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use refract::{translate, Framework, MapOptions};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "refract", about = "Cross-framework UI component translator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate one component file to another framework.
    Translate {
        /// Source framework tag ("swiftui", "react").
        from: String,
        /// Target framework tag.
        to: String,
        /// Input component file.
        input: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Fail instead of downgrading slot ownership.
        #[arg(long)]
        strict_ownership: bool,
    },
    /// Print a component's extracted IR in human-readable form.
    PrintIr {
        /// Source framework tag.
        from: String,
        /// Input component file.
        input: PathBuf,
        /// Emit JSON instead of the display form.
        #[arg(long)]
        json: bool,
    },
    /// Translate fixture pairs from a manifest and diff against gold files.
    Check {
        /// Path to the check manifest (JSON).
        manifest: PathBuf,
        /// Fail instead of downgrading slot ownership.
        #[arg(long)]
        strict_ownership: bool,
    },
}

/// One fixture pair in a check manifest.
#[derive(Debug, Deserialize)]
struct CheckCase {
    name: String,
    from: String,
    to: String,
    input: PathBuf,
    gold: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CheckManifest {
    cases: Vec<CheckCase>,
}

fn parse_framework(tag: &str) -> Result<Framework> {
    Framework::from_tag(tag)
        .with_context(|| format!("unknown framework tag `{tag}` (expected swiftui or react)"))
}

/// Character-entropy preflight. Obfuscated or minified input maximizes
/// entropy relative to its alphabet; such files are rejected before parsing
/// rather than producing garbage extractions.
fn entropy_ratio(source: &str) -> f64 {
    if source.trim().is_empty() {
        return 0.0;
    }
    let mut freq = std::collections::HashMap::new();
    for c in source.chars() {
        *freq.entry(c).or_insert(0u64) += 1;
    }
    let length = source.chars().count() as f64;
    let distinct = freq.len() as f64;
    let max_possible = if distinct > 1.0 { distinct.log2() } else { return 0.0 };
    let actual: f64 = freq
        .values()
        .map(|&count| {
            let p = count as f64 / length;
            -p * p.log2()
        })
        .sum();
    actual / max_possible
}

const ENTROPY_LIMIT: f64 = 0.92;

fn read_component(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    let ratio = entropy_ratio(&source);
    if ratio > ENTROPY_LIMIT {
        bail!(
            "{}: source entropy {ratio:.3} exceeds the {ENTROPY_LIMIT} obfuscation limit",
            path.display()
        );
    }
    Ok(source)
}

fn cmd_translate(
    from: &str,
    to: &str,
    input: &Path,
    output: Option<&Path>,
    options: &MapOptions,
) -> Result<()> {
    let from = parse_framework(from)?;
    let to = parse_framework(to)?;
    let source = read_component(input)?;

    eprintln!("[translate] {} -> {}: {}", from, to, input.display());
    let result = translate(&source, from, to, options)
        .map_err(|e| anyhow::anyhow!("{} stage: {e}", e.stage()))?;
    for note in &result.notes {
        eprintln!("[map] note ({}): {}", note.rule, note.detail);
    }

    match output {
        Some(path) => {
            fs::write(path, &result.output)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            eprintln!("[translate] wrote {}", path.display());
        }
        None => print!("{}", result.output),
    }
    Ok(())
}

fn cmd_print_ir(from: &str, input: &Path, json: bool) -> Result<()> {
    let from = parse_framework(from)?;
    let source = read_component(input)?;
    let component =
        refract::extract_ir(&source, from).map_err(|e| anyhow::anyhow!("{e}"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&component)?);
    } else {
        print!("{component}");
    }
    Ok(())
}

fn load_manifest(path: &Path) -> Result<(CheckManifest, PathBuf)> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open manifest: {}", path.display()))?;
    let manifest: CheckManifest = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
    let base = path
        .canonicalize()?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((manifest, base))
}

/// Whitespace-normalized comparison, so gold files stay readable without
/// pinning byte-exact indentation.
fn normalized(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cmd_check(manifest_path: &Path, options: &MapOptions) -> Result<()> {
    let (manifest, base) = load_manifest(manifest_path)?;
    let mut failures = 0usize;

    // Each case stands alone: one failed fixture must not abort the rest.
    for case in &manifest.cases {
        match run_case(case, &base, options) {
            Ok(()) => eprintln!("[check] {}: ok", case.name),
            Err(e) => {
                failures += 1;
                eprintln!("[check] {}: FAILED: {e:#}", case.name);
            }
        }
    }

    eprintln!(
        "[check] {} case(s), {} failure(s)",
        manifest.cases.len(),
        failures
    );
    if failures > 0 {
        bail!("{failures} fixture check(s) failed");
    }
    Ok(())
}

fn run_case(case: &CheckCase, base: &Path, options: &MapOptions) -> Result<()> {
    let from = parse_framework(&case.from)?;
    let to = parse_framework(&case.to)?;
    let input = base.join(&case.input);
    let gold = base.join(&case.gold);

    let source = read_component(&input)?;
    let expected = fs::read_to_string(&gold)
        .with_context(|| format!("failed to read gold file: {}", gold.display()))?;

    let result =
        translate(&source, from, to, options).map_err(|e| anyhow::anyhow!("{e}"))?;
    if normalized(&result.output) != normalized(&expected) {
        bail!("output differs from gold file {}", gold.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Translate {
            from,
            to,
            input,
            output,
            strict_ownership,
        } => {
            let options = MapOptions {
                strict_ownership: *strict_ownership,
            };
            cmd_translate(from, to, input, output.as_deref(), &options)
        }
        Command::PrintIr { from, input, json } => cmd_print_ir(from, input, *json),
        Command::Check {
            manifest,
            strict_ownership,
        } => {
            let options = MapOptions {
                strict_ownership: *strict_ownership,
            };
            cmd_check(manifest, &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_ordinary_source_is_below_limit() {
        let source = include_str!("main.rs");
        assert!(entropy_ratio(source) < ENTROPY_LIMIT);
    }

    #[test]
    fn entropy_of_uniform_noise_is_rejected() {
        // Every distinct character exactly once: maximal entropy ratio.
        let noise: String = ('!'..='~').collect();
        assert!(entropy_ratio(&noise) > ENTROPY_LIMIT);
    }

    #[test]
    fn normalization_ignores_indentation() {
        assert_eq!(normalized("a  b\n  c"), normalized("a b c"));
    }
}
