//! Command-line front end: load a playlist, resolve durations, optionally export.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use playdeck::collection::WorkspaceId;
use playdeck::config::{self, AppConfig};
use playdeck::controller::AppController;
use playdeck::export::ExportStrategy;
use playdeck::host::FsHost;
use playdeck::logging;

const DURATION_TIMEOUT: Duration = Duration::from_secs(120);

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let config = config::load_or_default().unwrap_or_else(|err| {
        tracing::warn!("Using default settings: {err}");
        AppConfig::default()
    });

    let mut controller = AppController::headless(config, Arc::new(FsHost::new()));
    let workspace = WorkspaceId::from("main");
    controller
        .load_workspace(&workspace, &options.playlist)
        .map_err(|err| format!("Failed to load {}: {err}", options.playlist.display()))?;
    if !controller.resolve_durations_blocking(&workspace, DURATION_TIMEOUT) {
        eprintln!("Some durations are still unresolved");
    }
    print_listing(&controller, &workspace);

    if let Some(dest) = &options.export_dir {
        export(&controller, &workspace, dest, &options.strategy)?;
    }
    Ok(())
}

fn print_listing(controller: &AppController, workspace: &WorkspaceId) {
    let Some(store) = controller.workspace(workspace) else {
        return;
    };
    let state = store.state();
    println!("{}", state.name());
    for (index, track) in state.tracks().iter().enumerate() {
        println!(
            "{:>3}. {:<40} {}",
            index + 1,
            track.name,
            track
                .duration
                .map(format_seconds)
                .unwrap_or_else(|| "--:--".to_string())
        );
    }
    println!(
        "{} track(s), total {}",
        state.track_count(),
        format_seconds(state.total_duration())
    );
}

fn export(
    controller: &AppController,
    workspace: &WorkspaceId,
    dest: &Path,
    strategy: &str,
) -> Result<(), String> {
    let report = controller
        .export_workspace(workspace, dest, strategy)
        .map_err(|err| format!("Export failed: {err}"))?;
    println!("Copied {} file(s) to {}", report.copied.len(), dest.display());
    if let Some(playlist) = &report.playlist {
        println!("Wrote {}", playlist.display());
    }
    for failure in &report.failed {
        eprintln!("Failed {}: {}", failure.source.display(), failure.message);
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be exported", report.failed.len()))
    }
}

fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

struct Options {
    playlist: PathBuf,
    export_dir: Option<PathBuf>,
    strategy: String,
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut playlist = None;
    let mut export_dir = None;
    let mut strategy = ExportStrategy::Flat.as_str().to_string();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--export" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--export requires a value".to_string())?;
                export_dir = Some(PathBuf::from(value));
            }
            "--strategy" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--strategy requires a value".to_string())?;
                strategy = value.to_string();
            }
            unknown if unknown.starts_with('-') => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
            path => {
                if playlist.replace(PathBuf::from(path)).is_some() {
                    return Err("Only one playlist may be given".to_string());
                }
            }
        }
        idx += 1;
    }
    let playlist = playlist.ok_or_else(|| format!("Missing playlist path\n\n{}", help_text()))?;
    Ok(Some(Options {
        playlist,
        export_dir,
        strategy,
    }))
}

fn help_text() -> String {
    let strategies: Vec<&str> = ExportStrategy::ALL.iter().map(|s| s.as_str()).collect();
    format!(
        "playdeck <playlist.json> [--export <dir> [--strategy <{}>]]\n\n\
         Loads a playlist, probes missing durations and prints the track list.\n\
         With --export, copies the tracks into <dir>.",
        strategies.join("|")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_playlist_and_export_flags() {
        let options = parse_args(args(&["set.json", "--export", "out", "--strategy", "numbered"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.playlist, PathBuf::from("set.json"));
        assert_eq!(options.export_dir, Some(PathBuf::from("out")));
        assert_eq!(options.strategy, "numbered");
    }

    #[test]
    fn rejects_missing_playlist_and_unknown_flags() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["set.json", "--bogus"])).is_err());
        assert!(parse_args(args(&["set.json", "--export"])).is_err());
    }

    #[test]
    fn formats_seconds_as_clock() {
        assert_eq!(format_seconds(65.4), "1:05");
        assert_eq!(format_seconds(3725.0), "1:02:05");
        assert_eq!(format_seconds(-3.0), "0:00");
    }
}
