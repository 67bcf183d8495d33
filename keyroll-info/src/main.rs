use clap::Parser;
use keyroll::{
    memory::{print_memory_usage, MemoryReporter},
    LoaderConfig, MidiFile, DEFAULT_OVERLAP_MIN_NOTES,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to input MIDI file
    input: PathBuf,

    /// Worker threads for track decoding (0 = all cores)
    #[arg(long, default_value_t = 0)]
    decode_threads: usize,

    /// Worker threads for per-key sorting and overlap removal (0 = all cores)
    #[arg(long, default_value_t = 0)]
    key_threads: usize,

    /// Minimum notes on a key before overlap removal runs on it
    #[arg(long, default_value_t = DEFAULT_OVERLAP_MIN_NOTES)]
    overlap_threshold: usize,

    /// Print the note count of every non-empty key
    #[arg(long)]
    per_key: bool,

    /// Log memory usage every N milliseconds while loading
    /// (needs the `memory-report` feature)
    #[arg(long, value_name = "MS")]
    memory_report: Option<u64>,
}

fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    format!(
        "{}:{:02}.{:03}",
        secs / 60,
        secs % 60,
        time.subsec_millis()
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = LoaderConfig::new()
        .decode_threads(cli.decode_threads)
        .key_threads(cli.key_threads)
        .overlap_min_notes(cli.overlap_threshold);

    let reporter = cli
        .memory_report
        .map(|ms| MemoryReporter::start("load", Duration::from_millis(ms.max(1))));

    let file = match MidiFile::open(&cli.input, &config) {
        Ok(file) => file,
        Err(err) => {
            log::error!("failed to load {}: {}", cli.input.display(), err);
            return ExitCode::FAILURE;
        }
    };
    if reporter.is_some() {
        drop(reporter);
        print_memory_usage("after load");
    }

    println!("File:      {}", cli.input.display());
    println!("Format:    {}", file.format().as_raw());
    println!("Tracks:    {}", file.track_count());
    println!("PPQ:       {}", file.division());
    println!("Notes:     {}", file.note_count());
    println!("Ticks:     {}", file.length_ticks());
    println!("Length:    {}", format_time(file.duration()));
    println!("Tempos:    {}", file.tempos().len());
    if let Some(first) = file.tempos().iter().next() {
        println!("Start BPM: {:.2}", first.bpm());
    }

    if cli.per_key {
        println!();
        for (key, notes) in file.keys().iter().enumerate() {
            if notes.is_empty() {
                continue;
            }
            let collapsed = notes.iter().filter(|n| n.is_collapsed()).count();
            println!("key {:3}: {:8} notes ({} collapsed)", key, notes.len(), collapsed);
        }
    }

    ExitCode::SUCCESS
}
