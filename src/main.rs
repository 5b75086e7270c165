use std::env;
use std::path::Path;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod library;
mod remote;
mod tts;
mod view;

use config::Settings;
use library::LibraryStore;
use remote::RemoteGateway;
use tts::{CancelToken, SynthesisCoordinator, TtsEntry, load_script};
use view::TreeViewState;

const USAGE: &str = "usage: cadenza <command>

commands:
  list                          list stored audio files
  tree                          show the library as a tree
  synth [text] [voice-name]     synthesize text, optionally with a reference voice
  batch <script.json>           train every entry of a dubbing script (Ctrl-C cancels)
  check <script.json> <index>   check whether an entry's output already exists
  delete <name>                 delete a stored file by listing name
  lock <script.json> <index>    lock a saved entry against edits
  unlock <script.json> <index>  unlock a saved entry";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    settings
        .validate()
        .map_err(|msg| format!("invalid configuration: {msg}"))?;

    let mut args = env::args().skip(1);
    let command = match args.next() {
        Some(c) => c,
        None => {
            eprintln!("{USAGE}");
            return Ok(());
        }
    };

    let gateway = RemoteGateway::new(&settings.server)?;

    match command.as_str() {
        "list" => {
            let mut store = LibraryStore::new(gateway, settings.synthesis.clone());
            match store.refresh().await {
                Ok(()) => {
                    let state = store.state();
                    if state.files.is_empty() {
                        println!("{}", view::EMPTY_MESSAGE);
                    } else {
                        for f in &state.files {
                            let meta = match (f.duration, f.format.as_deref()) {
                                (Some(d), Some(fmt)) => format!("  ({fmt}, {d:.1}s)"),
                                (Some(d), None) => format!("  ({d:.1}s)"),
                                (None, Some(fmt)) => format!("  ({fmt})"),
                                (None, None) => String::new(),
                            };
                            println!("{}{meta}", f.name);
                        }
                        info!("{} files", state.files.len());
                    }
                }
                Err(err) => error!("could not refresh the library: {err}"),
            }
        }
        "tree" => {
            let mut store = LibraryStore::new(gateway, settings.synthesis.clone());
            if let Err(err) = store.refresh().await {
                error!("could not refresh the library: {err}");
                return Ok(());
            }
            let view_state = TreeViewState::new(settings.view.expand_depth);
            for line in view::render(&store.state().tree, &view_state) {
                println!("{line}");
            }
        }
        "synth" => {
            let text = args
                .next()
                .unwrap_or_else(|| settings.synthesis.default_text.clone());
            let voice = args.next();

            let mut store = LibraryStore::new(gateway, settings.synthesis.clone());
            if let Err(err) = store.refresh().await {
                error!("could not refresh the library: {err}");
                return Ok(());
            }
            if let Some(name) = voice {
                match store.state().files.iter().find(|f| f.name == name).cloned() {
                    Some(file) => {
                        info!("reference voice: {}", file.file_name());
                        store.select(Some(file));
                    }
                    None => {
                        warn!("no stored file named {name}, synthesizing without a reference voice")
                    }
                }
            }

            match store.synthesize(&text).await {
                Ok(outcome) => {
                    info!("audio synthesized");
                    if let Some(file) = store.state().selected.as_ref() {
                        println!("{}", store.api().audio_url(file));
                    } else if let Some(outpath) = outcome.outpath {
                        println!("{outpath}");
                    }
                }
                Err(err) => error!("could not synthesize audio: {err}"),
            }
        }
        "batch" => {
            let script = args.next().ok_or("batch needs a script file")?;
            let entries = load_script(Path::new(&script))?;

            let (runnable, locked): (Vec<_>, Vec<_>) =
                entries.into_iter().partition(|e| !e.locked);
            for entry in &locked {
                info!(speaker = %entry.speaker, "skipping locked entry");
            }
            if runnable.is_empty() {
                warn!("nothing to train");
                return Ok(());
            }

            let token = CancelToken::new();
            let trip = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    trip.cancel();
                }
            });

            let mut coordinator = SynthesisCoordinator::new(gateway, settings.synthesis.clone());
            let summary = coordinator
                .batch(&runnable, &token, |done, planned| {
                    info!("processed {done}/{planned}")
                })
                .await;

            if summary.cancelled {
                warn!(
                    "batch cancelled after {} of {} records",
                    summary.total,
                    runnable.len()
                );
            }
            info!(
                "batch finished: {} attempted, {} succeeded, {} failed",
                summary.total, summary.success, summary.failed
            );
        }
        "check" => {
            let entry = script_entry(&mut args)?;
            let mut coordinator = SynthesisCoordinator::new(gateway, settings.synthesis.clone());
            match coordinator.check_trained(&entry).await {
                Ok(Some(outpath)) => println!("{outpath}"),
                Ok(None) => match coordinator.playback_path(&entry) {
                    Some(outpath) => println!("{outpath}"),
                    None => println!("not trained yet"),
                },
                Err(err) => error!("could not check the entry: {err}"),
            }
        }
        "delete" => {
            let name = args.next().ok_or("delete needs a file name")?;
            let mut store = LibraryStore::new(gateway, settings.synthesis.clone());
            if let Err(err) = store.refresh().await {
                error!("could not refresh the library: {err}");
                return Ok(());
            }
            match store.delete(&name).await {
                Ok(()) => info!("deleted {name}, {} files remain", store.state().files.len()),
                Err(err) => error!("could not delete {name}: {err}"),
            }
        }
        "lock" | "unlock" => {
            let mut entry = script_entry(&mut args)?;
            let locked = command == "lock";
            let mut coordinator = SynthesisCoordinator::new(gateway, settings.synthesis.clone());
            match coordinator.set_locked(&mut entry, locked).await {
                Ok(()) => info!(
                    speaker = %entry.speaker,
                    "entry {}",
                    if locked { "locked" } else { "unlocked" }
                ),
                Err(err) => error!("could not update the entry: {err}"),
            }
        }
        _ => {
            eprintln!("unknown command: {command}\n\n{USAGE}");
        }
    }

    Ok(())
}

/// Pull `<script.json> <index>` off the argument list and return that entry.
fn script_entry(
    args: &mut impl Iterator<Item = String>,
) -> Result<TtsEntry, Box<dyn std::error::Error>> {
    let script = args.next().ok_or("expected a script file")?;
    let index: usize = args.next().ok_or("expected an entry index")?.parse()?;

    let mut entries = load_script(Path::new(&script))?;
    if index >= entries.len() {
        return Err(format!(
            "script has {} entries, index {index} is out of range",
            entries.len()
        )
        .into());
    }
    Ok(entries.swap_remove(index))
}
