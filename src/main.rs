use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use apdf::annotation::{MaterialId, PageNumber, RecordId, UserId, deserialize};
use apdf::app::{App, SessionOwner};
use apdf::backend::{FixedPageRenderer, PageRenderer, open_default_renderer};
use apdf::command::{parse_script, usage_lines};
use apdf::config::{Config, OnDirty, StoreBackend};
use apdf::error::{AppError, AppResult};
use apdf::store::{
    AnnotationStore, FileAnnotationStore, HttpAnnotationStore, MemoryAnnotationStore,
};

#[derive(Debug, Parser)]
#[command(name = "apdf", version, about = "Per-page vector annotations for PDF documents")]
struct Cli {
    /// Config file; defaults to $APDF_CONFIG_PATH or the per-user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run an annotation command script against a document.
    #[command(after_long_help = script_help())]
    Replay(ReplayArgs),
    /// List stored annotation records.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Print the objects stored for one page.
    Show {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long)]
        page: u32,
    },
    /// Delete one stored record.
    Delete {
        #[command(flatten)]
        owner: OwnerArgs,
        #[arg(long)]
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, Args)]
struct OwnerArgs {
    #[arg(long)]
    material: u64,
    #[arg(long)]
    user: u64,
}

impl OwnerArgs {
    fn owner(self) -> SessionOwner {
        SessionOwner::new(MaterialId(self.material), UserId(self.user))
    }
}

#[derive(Debug, Args)]
struct ReplayArgs {
    #[command(flatten)]
    owner: OwnerArgs,
    /// Document to annotate.
    #[arg(long, conflicts_with = "pages")]
    pdf: Option<PathBuf>,
    /// Annotate a blank US Letter document with this many pages instead of a PDF.
    #[arg(long)]
    pages: Option<usize>,
    /// Page shown first.
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Overrides `navigation.on_dirty` from the config.
    #[arg(long)]
    on_dirty: Option<OnDirty>,
    /// One command per line; `-` reads standard input.
    script: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match config.store.backend {
        StoreBackend::Memory => {
            execute(cli.command, config, Arc::new(MemoryAnnotationStore::new())).await
        }
        StoreBackend::File => {
            let path = config.store.resolved_file_path().ok_or_else(|| {
                AppError::invalid_argument(
                    "no annotation file configured and no data directory available",
                )
            })?;
            let store = FileAnnotationStore::open(path)?;
            execute(cli.command, config, Arc::new(store)).await
        }
        StoreBackend::Http => {
            let store = HttpAnnotationStore::new(
                config.store.base_url.clone(),
                Some(config.store.auth_token.clone()),
                config.store.request_timeout(),
            );
            execute(cli.command, config, Arc::new(store)).await
        }
    }
}

async fn execute<S: AnnotationStore>(
    command: CliCommand,
    config: Config,
    store: Arc<S>,
) -> AppResult<()> {
    match command {
        CliCommand::Replay(args) => replay(args, config, store).await,
        CliCommand::List { owner, page } => {
            let records = store
                .list(
                    MaterialId(owner.material),
                    UserId(owner.user),
                    page.map(PageNumber),
                )
                .await?;
            for record in records {
                let id = record
                    .id
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                let updated = record
                    .updated_at
                    .or(record.created_at)
                    .map_or_else(|| "-".to_string(), |at| at.to_rfc3339());
                println!(
                    "{id}\tpage {}\t{} bytes\t{updated}",
                    record.page_number,
                    record.annotation_objects.len()
                );
            }
            Ok(())
        }
        CliCommand::Show { owner, page } => {
            let key = owner.owner().key(PageNumber(page));
            let Some(record) = store.fetch_for_page(key).await? else {
                return Err(AppError::not_found(format!("no annotations for {key}")));
            };
            let state = deserialize(&record.annotation_objects)?;
            println!("{key}: {}x{}", state.size.width, state.size.height);
            for (index, object) in state.objects.iter().enumerate() {
                let bounds = object
                    .shape
                    .bounds()
                    .map_or_else(String::new, |b| {
                        format!(" [{:.1}, {:.1}, {:.1}, {:.1}]", b.x0, b.y0, b.x1, b.y1)
                    });
                println!(
                    "{index}\t{}\t{} width {} opacity {}{bounds}",
                    object.shape.kind(),
                    object.style.color,
                    object.style.width,
                    object.style.opacity
                );
            }
            Ok(())
        }
        CliCommand::Delete { owner, id } => {
            store
                .delete(MaterialId(owner.material), UserId(owner.user), RecordId(id))
                .await?;
            println!("deleted record {id}");
            Ok(())
        }
    }
}

async fn replay<S: AnnotationStore>(
    args: ReplayArgs,
    mut config: Config,
    store: Arc<S>,
) -> AppResult<()> {
    if let Some(on_dirty) = args.on_dirty {
        config.navigation.on_dirty = on_dirty;
    }
    let from_stdin = args.script.as_os_str() == "-";
    if from_stdin && config.navigation.on_dirty == OnDirty::Ask {
        return Err(AppError::invalid_argument(
            "the save prompt reads standard input; pass --on-dirty save or discard with a piped script",
        ));
    }

    let text = read_script(&args.script, from_stdin)?;
    let commands = parse_script(&text)?;
    let renderer = open_renderer(&args)?;

    let mut app = App::new(config, args.owner.owner(), store, renderer)?
        .with_start_page(PageNumber(args.page));
    app.run(commands).await?;

    let status = &app.state.status;
    if !status.message.is_empty() {
        println!("{}", status.message);
    }
    Ok(())
}

/// Script grammar listed under `replay --help`.
fn script_help() -> String {
    let mut help = String::from("Script commands, one per line (# starts a comment):\n");
    for line in usage_lines() {
        help.push_str("  ");
        help.push_str(&line);
        help.push('\n');
    }
    help
}

fn read_script(path: &Path, from_stdin: bool) -> AppResult<String> {
    if from_stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| AppError::io_with_context(source, "failed to read script from stdin"))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|source| {
        AppError::io_with_context(source, format!("failed to read script: {}", path.display()))
    })
}

fn open_renderer(args: &ReplayArgs) -> AppResult<Arc<dyn PageRenderer>> {
    match (&args.pdf, args.pages) {
        (Some(path), _) => open_default_renderer(path),
        (None, Some(pages)) => Ok(Arc::new(FixedPageRenderer::letter(pages))),
        (None, None) => Err(AppError::invalid_argument(
            "replay needs a document: pass --pdf <file.pdf> or --pages <count>",
        )),
    }
}
