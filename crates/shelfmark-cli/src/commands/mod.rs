use std::path::Path;

use anyhow::{Context, Result};
use shelfmark_core::{MemoryBookmarkStore, ShelfConfig, Shelfmark, SqliteBreadcrumbCache};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{Commands, ServeArgs};

mod support;


use self::support::{print_json, static_page};

pub(crate) const SNAPSHOT_FILE: &str = "bookmarks.json";
pub(crate) const BREADCRUMB_FILE: &str = "breadcrumbs.sqlite3";

type Engine = Shelfmark<MemoryBookmarkStore, SqliteBreadcrumbCache>;

pub(crate) fn run_from_root(root: &Path, command: Commands) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run(root, command))
}

async fn run(root: &Path, command: Commands) -> Result<()> {
    if matches!(command, Commands::Init) {
        let created = init_root(root)?;
        return print_json(&serde_json::json!({
            "status": "ok",
            "root": root.display().to_string(),
            "created": created,
        }));
    }

    let snapshot_path = root.join(SNAPSHOT_FILE);
    let engine = open_engine(root)?;
    let persist = mutates(&command);
    let output = run_validated(&engine, &snapshot_path, command).await;
    // A failed resort may still have applied some moves.
    if persist {
        save_store(&engine, &snapshot_path)?;
    }
    output
}

/// Creates the root directory with an empty default tree. Returns false when a tree exists.
pub(crate) fn init_root(root: &Path) -> Result<bool> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("failed to create {}", root.display()))?;
    SqliteBreadcrumbCache::open(root.join(BREADCRUMB_FILE))
        .context("failed to open breadcrumb cache")?;
    let snapshot_path = root.join(SNAPSHOT_FILE);
    if snapshot_path.exists() {
        return Ok(false);
    }
    save_store_at(&MemoryBookmarkStore::default(), &snapshot_path)?;
    Ok(true)
}

pub(crate) fn open_engine(root: &Path) -> Result<Engine> {
    let snapshot_path = root.join(SNAPSHOT_FILE);
    if !snapshot_path.exists() {
        anyhow::bail!(
            "no bookmark tree at {}; run `shelfmark init` first",
            snapshot_path.display()
        );
    }
    let store = MemoryBookmarkStore::load_snapshot(&snapshot_path)
        .with_context(|| format!("failed to load {}", snapshot_path.display()))?;
    let cache = SqliteBreadcrumbCache::open(root.join(BREADCRUMB_FILE))
        .context("failed to open breadcrumb cache")?;
    let config = ShelfConfig::from_env().context("invalid shelfmark configuration")?;
    Ok(Shelfmark::with_cache(store, config, cache))
}

const fn mutates(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Add(_)
            | Commands::Mkdir(_)
            | Commands::Open(_)
            | Commands::Resort(_)
            | Commands::Reorder(_)
            | Commands::Mv(_)
            | Commands::Rename(_)
            | Commands::Tag(_)
            | Commands::Rm(_)
    )
}

fn save_store(engine: &Engine, snapshot_path: &Path) -> Result<()> {
    save_store_at(engine.store(), snapshot_path)
}

fn save_store_at(store: &MemoryBookmarkStore, snapshot_path: &Path) -> Result<()> {
    store
        .save_snapshot(snapshot_path)
        .with_context(|| format!("failed to save {}", snapshot_path.display()))
}

async fn run_validated(engine: &Engine, snapshot_path: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {}
        Commands::Tree => {
            print_json(&engine.store().snapshot()?)?;
        }
        Commands::Folders => {
            print_json(&engine.folder_choices().await?)?;
        }
        Commands::Search(args) => {
            engine.reload().await?;
            if args.folders {
                print_json(&engine.search_folders(&args.query)?)?;
            } else {
                print_json(&engine.search(&args.query)?)?;
            }
        }
        Commands::Add(args) => {
            let bookmark = engine
                .add_bookmark(&args.title, &args.url, args.parent.as_deref(), &args.tags)
                .await?;
            print_json(&bookmark)?;
        }
        Commands::Mkdir(args) => {
            let folder = engine
                .create_folder(&args.title, args.parent.as_deref())
                .await?;
            print_json(&folder)?;
        }
        Commands::Open(args) => {
            print_json(&engine.open_bookmark(&args.id).await?)?;
        }
        Commands::Resort(args) => {
            print_json(&engine.resort_folder(&args.id).await?)?;
        }
        Commands::Reorder(args) => {
            let moved = if args.folders {
                engine
                    .reorder_folders(&args.folder_id, args.from, args.to)
                    .await?
            } else {
                engine
                    .reorder_bookmarks(&args.folder_id, args.from, args.to)
                    .await?
            };
            print_json(&serde_json::json!({ "moved": moved }))?;
        }
        Commands::Mv(args) => {
            let node = engine
                .reparent(&args.id, &args.parent_id, args.index)
                .await?;
            print_json(&node)?;
        }
        Commands::Rename(args) => {
            print_json(&engine.rename_bookmark(&args.id, &args.title).await?)?;
        }
        Commands::Tag(args) => {
            print_json(&engine.set_tags(&args.id, &args.tags).await?)?;
        }
        Commands::Rm(args) => {
            if args.recursive {
                engine.remove_folder(&args.id).await?;
            } else {
                engine.remove_bookmark(&args.id).await?;
            }
            print_json(&serde_json::json!({
                "status": "ok",
                "id": args.id,
                "recursive": args.recursive,
            }))?;
        }
        Commands::Cd(args) => {
            engine.reload().await?;
            // Writes are ignored until the cached selection has been read once.
            engine.restore_selection()?;
            let trail = engine.select_folder(args.folder_id.as_deref())?;
            let path_ids = trail
                .iter()
                .map(|folder| folder.id.as_str())
                .collect::<Vec<_>>();
            print_json(&serde_json::json!({
                "selectedFolderId": args.folder_id,
                "pathIds": path_ids,
            }))?;
        }
        Commands::Pwd => {
            engine.reload().await?;
            print_json(&engine.restore_selection()?)?;
        }
        Commands::Serve(args) => {
            serve(engine, &args, snapshot_path).await?;
        }
    }
    Ok(())
}

/// One request per stdin line, one response per stdout line.
async fn serve(engine: &Engine, args: &ServeArgs, snapshot_path: &Path) -> Result<()> {
    let page = static_page(args);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut served = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = engine.handle_json(&line, &page).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
        served += 1;
        if response.success {
            save_store(engine, snapshot_path)?;
        }
    }
    tracing::info!(served, "protocol input closed");

    if args.print_request_log {
        let entries = engine.list_request_logs(engine.config().request_log_capacity)?;
        eprintln!("{}", serde_json::to_string_pretty(&entries)?);
    }
    Ok(())
}
