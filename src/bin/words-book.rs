use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use words_book::client::{normalize_selection, ClientSettings, HttpCollection};
use words_book::controller::{CollectionController, SortOrder, DEFAULT_PAGE_SIZE};
use words_book::models::{EntityKind, Entry};

#[derive(Parser)]
#[command(name = "words-book", about = "Words Book command line companion")]
struct Cli {
    /// words | phrases | sentences
    #[arg(long, default_value = "words")]
    kind: EntityKind,
    /// API base URL (overrides the settings file)
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file
    #[arg(long, default_value = "words-book.settings.json")]
    settings: PathBuf,
    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add one entry
    Add {
        text: String,
        #[arg(long, default_value = "")]
        annotation: String,
    },
    /// Add the word found in a text selection (context-menu behaviour)
    Clip { selection: String },
    /// List entries with search, sort and paging
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "desc")]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Edit one entry in place
    Edit {
        id: i32,
        text: String,
        #[arg(long, default_value = "")]
        annotation: String,
    },
    /// Delete entries by id, or everything with --all
    Delete {
        ids: Vec<i32>,
        #[arg(long)]
        all: bool,
    },
    /// Show random flashcards
    Random {
        #[arg(long)]
        count: Option<usize>,
        /// Let the server draw the sample instead of shuffling locally
        #[arg(long)]
        server: bool,
    },
    /// Export the filtered view as JSON
    Export {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a JSON document
    Import { file: PathBuf },
    /// Save the API base URL / random count to the settings file
    Configure {
        #[arg(long)]
        api_base_url: Option<String>,
        #[arg(long)]
        random_count: Option<String>,
    },
}

fn print_entries(kind: EntityKind, entries: &[&Entry]) {
    for entry in entries {
        if kind.has_annotation() && !entry.annotation.is_empty() {
            println!("{:>6}  {}  ({})", entry.id, entry.text, entry.annotation);
        } else {
            println!("{:>6}  {}", entry.id, entry.text);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    let mut settings = ClientSettings::load(&cli.settings)
        .await
        .with_context(|| format!("Failed to read {}", cli.settings.display()))?;
    let base_url = cli.base_url.clone().unwrap_or_else(|| settings.base_url().to_string());
    let api = HttpCollection::new(&base_url, cli.kind);
    let kind = cli.kind;

    match cli.command {
        Command::Configure { api_base_url, random_count } => {
            if let Some(url) = api_base_url {
                settings.api_base_url = url;
            }
            if let Some(count) = random_count {
                settings.random_count = Some(count);
            }
            settings.save(&cli.settings).await?;
            println!("API base URL: {}", settings.base_url());
            println!("Random count: {}", settings.random_count());
        }
        Command::Random { count, server } => {
            let count = count.unwrap_or_else(|| settings.random_count());
            if server {
                let entries = api.random(count).await?;
                print_entries(kind, &entries.iter().collect::<Vec<_>>());
            } else {
                let mut controller = CollectionController::load(api, kind).await?;
                controller.set_flashcard_count(count);
                print_entries(kind, &controller.flashcards().iter().collect::<Vec<_>>());
            }
        }
        Command::Add { text, annotation } => {
            let mut controller = CollectionController::load(api, kind).await?;
            controller.add(&text, &annotation).await?;
            println!("Saved. {} {} total.", controller.items().len(), kind);
        }
        Command::Clip { selection } => {
            let Some(word) = normalize_selection(&selection) else {
                bail!("selection contains no word");
            };
            let words = HttpCollection::new(&base_url, EntityKind::Word);
            let mut controller = CollectionController::load(words, EntityKind::Word).await?;
            controller.add(&word, "").await?;
            println!("Saved word: {word}");
        }
        Command::List { query, sort, page, page_size } => {
            let mut controller = CollectionController::load(api, kind).await?;
            controller.set_query(query);
            controller.set_sort_order(sort);
            controller.set_page_size(page_size)?;
            controller.go_to_page(page);
            print_entries(kind, &controller.page());
            println!(
                "{} {} total, page {} of {}",
                controller.visible().len(),
                kind,
                controller.current_page(),
                controller.total_pages()
            );
        }
        Command::Edit { id, text, annotation } => {
            let mut controller = CollectionController::load(api, kind).await?;
            controller.begin_edit(id);
            let outcome = controller.save_edit(id, &text, &annotation).await?;
            println!("{outcome:?}");
        }
        Command::Delete { ids, all } => {
            let mut controller = CollectionController::load(api, kind).await?;
            if all {
                controller.delete_all().await?;
            } else if ids.is_empty() {
                bail!("pass ids to delete or --all");
            } else {
                for id in ids {
                    controller.select(id);
                }
                controller.delete_selected().await?;
            }
            println!("{} {} left.", controller.items().len(), kind);
        }
        Command::Export { query, out } => {
            let mut controller = CollectionController::load(api, kind).await?;
            controller.set_query(query);
            let document = controller.export()?;
            let path = out.unwrap_or_else(|| PathBuf::from(kind.export_file_name()));
            tokio::fs::write(&path, document).await?;
            println!("Exported {} {} to {}", controller.visible().len(), kind, path.display());
        }
        Command::Import { file } => {
            let document = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut controller = CollectionController::load(api, kind).await?;
            let count = controller.import(&document).await?;
            println!("Imported {count} new {kind}.");
        }
    }
    Ok(())
}
