//! ## vakthund-cli::commands
//! **`scan` subcommand: builds the selected engine, runs one scan, and
//! prints the match stream and `Stats` dump per spec §6's CLI contract.**

use clap::{Parser, Subcommand};

use vakthund_config::ScannerConfig;
use vakthund_detection::{
    AhoCorasickEngine, BoyerMooreEngine, Engine, Match, SetHorspoolEngine, SignatureSet, Stats,
    WuManberDetEngine, WuManberProbEngine,
};
use vakthund_telemetry::{EventLogger, MetricsRecorder};

use crate::capture::load_capture;
use crate::error::CliError;
use crate::rules::load_rules;

#[derive(Parser)]
#[command(name = "vakthund-cli", version, about = "Vakthund signature scanner benchmarking driver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a capture buffer against a ruleset with one engine.
    Scan(ScanArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Algorithm selector: a=Aho-Corasick, d=Wu-Manber deterministic,
    /// p=Wu-Manber probabilistic (Bloom), h=Set-Horspool, b=Boyer-Moore.
    pub alg: String,
    /// Path to the rules file (Snort-style or plain `literal,nocase` lines).
    pub rules_file: String,
    /// Path to the capture file scanned as a single contiguous buffer.
    pub capture_file: String,
}

/// Runs the `scan` subcommand end to end: load rules, load capture,
/// preprocess the selected engine, scan, print matches then stats.
pub fn run_scan(args: ScanArgs, metrics: &MetricsRecorder) -> Result<(), CliError> {
    let set = load_rules(&args.rules_file)?;
    let buffer = load_capture(&args.capture_file)?;
    let config = ScannerConfig::load().unwrap_or_default();

    let (matches, stats) = run_selected_engine(&args.alg, &set, &buffer, &config)?;

    for m in &matches {
        println!("[MATCH] pid {} at {}", m.pid, m.start);
    }
    print_stats(&stats);

    metrics.record_scan(stats.algorithm, stats.matches, stats.elapsed_sec);
    EventLogger::log_scan_summary(stats.algorithm, stats.input_len, stats.matches, stats.elapsed_sec);

    Ok(())
}

fn run_selected_engine(
    alg: &str,
    set: &SignatureSet,
    buffer: &[u8],
    config: &ScannerConfig,
) -> Result<(Vec<Match>, Stats), CliError> {
    let wm_config = vakthund_detection::WmConfig {
        block_size_override: config.wm_block_size_override,
        bloom_false_positive_rate: config.bloom_false_positive_rate,
    };

    Ok(match alg {
        "a" => AhoCorasickEngine::preprocess(set)?.scan_all(buffer),
        "d" => WuManberDetEngine::preprocess_with_config(set, &wm_config)?.scan_all(buffer),
        "p" => WuManberProbEngine::preprocess_with_config(set, &wm_config)?.scan_all(buffer),
        "h" => SetHorspoolEngine::preprocess(set)?.scan_all(buffer),
        "b" => BoyerMooreEngine::preprocess(set)?.scan_all(buffer),
        other => return Err(CliError::UnknownAlgorithm(other.to_string())),
    })
}

fn print_stats(stats: &Stats) {
    println!("algorithm:      {}", stats.algorithm);
    println!("input_len:      {}", stats.input_len);
    println!("windows:        {}", stats.windows);
    println!("sum_shift:      {}", stats.sum_shift);
    println!("hash_hits:      {}", stats.hash_hits);
    println!("chain_steps:    {}", stats.chain_steps);
    println!("exact_matches:  {}", stats.exact_matches);
    println!("bloom_checks:   {}", stats.bloom_checks);
    println!("bloom_pass:     {}", stats.bloom_pass);
    println!("comparisons:    {}", stats.comparisons);
    println!("transitions:    {}", stats.transitions);
    println!("fail_steps:     {}", stats.fail_steps);
    println!("shifts:         {}", stats.shifts);
    println!("matches:        {}", stats.matches);
    println!("elapsed_sec:    {:.9}", stats.elapsed_sec);
}
