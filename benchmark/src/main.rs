use keyroll::{LoaderConfig, MidiFile};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};

const MIDI_DIR: &str = "../test-asset";

const MIDI_EXT: &[&str] = &["mid", "midi"];

fn load_keyroll(data: &[u8]) -> Result<usize, String> {
    let file = MidiFile::from_reader(data, &LoaderConfig::default()).map_err(|err| format!("{}", err))?;
    Ok(file.note_count())
}

fn list_midis(dir: &Path) -> Vec<PathBuf> {
    let mut midis = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("cannot read {}: {}", dir.display(), err);
            return midis;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if MIDI_EXT
            .iter()
            .any(|ext| path.extension() == Some(ext.as_ref()))
        {
            midis.push(path);
        }
    }
    midis.sort();
    midis
}

fn use_loader(load: fn(&[u8]) -> Result<usize, String>, data: &[u8]) -> Result<(), String> {
    let round = |num: f64| (num * 100.0).round() / 100.0;

    let runtime = || -> Result<_, String> {
        let start = Instant::now();
        let out = load(data)?;
        let time = round((start.elapsed().as_micros() as f64) / 1000.0);
        Ok((out, time))
    };

    let (note_count, cold_time) = runtime()?;
    let runtime = || -> Result<_, String> {
        let (out, time) = runtime()?;
        if out != note_count {
            return Err("loader is not consistent with note counts".to_string());
        }
        Ok(time)
    };

    let iters = (2000.0 / cold_time.max(0.01)).floor() as u64 + 1;
    let mut total_time = 0.0;
    let mut max_time = cold_time;
    let mut min_time = cold_time;
    for _ in 0..iters {
        let time = runtime()?;
        total_time += time;
        max_time = max_time.max(time);
        min_time = min_time.min(time);
    }
    let avg_time = round(total_time / (iters as f64));

    eprintln!(
        "{} notes in {} iters / min {} / avg {} / max {} (ms)",
        note_count, iters, min_time, avg_time, max_time
    );

    Ok(())
}

fn main() {
    env_logger::init();
    let midi_filter = env::args().nth(1).unwrap_or_default().to_lowercase();
    let midi_dir = env::args().nth(2).unwrap_or(MIDI_DIR.to_string());

    let unfiltered_midis = list_midis(midi_dir.as_ref());
    let midis = unfiltered_midis
        .iter()
        .filter(|midi| {
            midi.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&midi_filter))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    if midis.is_empty() {
        eprintln!("no midi files match the pattern \"{}\"", midi_filter);
        eprintln!("available midi files:");
        for file in unfiltered_midis.iter() {
            eprintln!("  {}", file.display());
        }
        return;
    }

    for midi in midis {
        // Read once so only parsing is timed
        let data = match fs::read(midi) {
            Ok(data) => data,
            Err(err) => {
                eprintln!("cannot read {}: {}", midi.display(), err);
                continue;
            }
        };
        eprintln!("loading file \"{}\" ({} KB)", midi.display(), data.len() / 1024);
        eprint!("  keyroll: ");
        if let Err(err) = use_loader(load_keyroll, &data) {
            eprintln!("load error: {}", err);
        }
        eprintln!();
    }
}
