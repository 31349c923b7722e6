//! Command-line interface for precis
//!
//! Renders ranked articles, computes overlay segments with the monospace
//! reference layout, and manages notes stored in a JSON file.
//!
//! Usage:
//!   precis show `<article>` [--threshold N] [--keyword K]...    - Print the visible summary
//!   precis overlay `<article>` --range R [--width N]            - Print overlay segments of a range
//!   precis notes `<article>` --store `<file>`                   - List stored notes
//!   precis annotate `<article>` --store `<file>` --range R --comment TEXT [--author A]
//!                                                              - Store a new note

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use precis::document::{self, Article};
use precis::filter::Filter;
use precis::layout::MonospaceLayout;
use precis::notes::store::{AnnotationStore, JsonFileStore};
use precis::notes::{Comment, NoteBook};
use precis::overlay::{OverlayLayer, OverlayRenderer, StyleTag};
use precis::{Range, SentenceRegistry};
use precis_config::{Loader, PrecisConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("precis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summaries, selections and notes for ranked articles")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .subcommand(
            Command::new("show")
                .about("Print the sentences visible at a threshold")
                .arg(article_arg())
                .arg(threshold_arg())
                .arg(
                    Arg::new("keyword")
                        .long("keyword")
                        .short('k')
                        .action(ArgAction::Append)
                        .help("Also reveal sentences mentioning this keyword"),
                ),
        )
        .subcommand(
            Command::new("overlay")
                .about("Print the overlay segments of a serialized range")
                .arg(article_arg())
                .arg(range_arg())
                .arg(threshold_arg())
                .arg(
                    Arg::new("width")
                        .long("width")
                        .short('w')
                        .value_parser(value_parser!(u32))
                        .help("Content width in columns"),
                ),
        )
        .subcommand(
            Command::new("notes")
                .about("List the notes stored for an article")
                .arg(article_arg())
                .arg(store_arg()),
        )
        .subcommand(
            Command::new("annotate")
                .about("Store a note on a serialized range")
                .arg(article_arg())
                .arg(store_arg())
                .arg(range_arg())
                .arg(
                    Arg::new("comment")
                        .long("comment")
                        .required(true)
                        .help("Comment text"),
                )
                .arg(
                    Arg::new("author")
                        .long("author")
                        .default_value("anonymous")
                        .help("Comment author"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("show", sub)) => handle_show_command(sub),
        Some(("overlay", sub)) => handle_overlay_command(sub),
        Some(("notes", sub)) => handle_notes_command(sub),
        Some(("annotate", sub)) => handle_annotate_command(sub),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn article_arg() -> Arg {
    Arg::new("article")
        .help("Article file (.json, .yaml or .yml)")
        .required(true)
        .index(1)
}

fn threshold_arg() -> Arg {
    Arg::new("threshold")
        .long("threshold")
        .short('t')
        .value_parser(value_parser!(u8))
        .help("Minimum rank percentile to show (defaults to the configured threshold)")
}

fn range_arg() -> Arg {
    Arg::new("range")
        .long("range")
        .short('r')
        .required(true)
        .help("Serialized range, e.g. 0/2:0,0/4:3")
}

fn store_arg() -> Arg {
    Arg::new("store")
        .long("store")
        .short('s')
        .required(true)
        .help("JSON file holding stored notes")
}

fn load_config(sub: &ArgMatches, width: Option<u32>) -> precis::Result<PrecisConfig> {
    let mut loader = Loader::new();
    if let Some(path) = sub.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(width) = width {
        loader = loader.set_override("layout.columns", i64::from(width))?;
    }
    Ok(loader.build()?)
}

/// Render an article and apply a threshold to it
fn load_article(sub: &ArgMatches, threshold: u8) -> precis::Result<(Article, SentenceRegistry)> {
    let path = sub
        .get_one::<String>("article")
        .expect("article is a required argument");
    let article = Article::load(path)?;
    let mut registry = document::render(&article);
    Filter::new(threshold).apply_threshold(&mut registry, threshold);
    Ok((article, registry))
}

/// Handle the show command
fn handle_show_command(sub: &ArgMatches) -> precis::Result<()> {
    let config = load_config(sub, None)?;
    let threshold = sub
        .get_one::<u8>("threshold")
        .copied()
        .unwrap_or(config.filter.default_threshold);
    let (article, mut registry) = load_article(sub, threshold)?;

    let mut filter = Filter::new(threshold);
    for keyword in sub.get_many::<String>("keyword").into_iter().flatten() {
        filter.toggle_keyword(&mut registry, keyword);
    }

    if let Some(title) = &article.title {
        println!("# {}", title);
        println!();
    }
    println!("{}", document::visible_text(&registry));
    Ok(())
}

/// Handle the overlay command
fn handle_overlay_command(sub: &ArgMatches) -> precis::Result<()> {
    let config = load_config(sub, sub.get_one::<u32>("width").copied())?;
    let threshold = sub
        .get_one::<u8>("threshold")
        .copied()
        .unwrap_or(config.filter.default_threshold);
    let (_, registry) = load_article(sub, threshold)?;
    let data = sub
        .get_one::<String>("range")
        .expect("range is a required argument");
    let range = Range::deserialize(data, &registry)?;

    let layout = MonospaceLayout::with_registry(config.layout.clone(), &registry);
    let mut renderer = OverlayRenderer::new(
        OverlayLayer::new(),
        StyleTag::new(&config.overlay.control_class),
    );
    let id = renderer.create(
        range,
        StyleTag::new(&config.overlay.selection_class),
        &registry,
        &layout,
    );

    println!("{} {:?}", data, renderer_text(&renderer, id, &registry));
    if let Some(overlay) = renderer.get(id) {
        if overlay.segments().is_empty() {
            println!("(range is not visible at threshold {})", threshold);
        }
        for (index, segment) in overlay.segments().iter().enumerate() {
            println!("segment {}: {}", index, segment);
        }
        if let Some(extent) = overlay.extent() {
            println!("extent: {}", extent);
        }
    }
    Ok(())
}

fn renderer_text(
    renderer: &OverlayRenderer<OverlayLayer>,
    id: precis::overlay::OverlayId,
    registry: &SentenceRegistry,
) -> String {
    renderer
        .get(id)
        .map(|overlay| overlay.range().text(registry))
        .unwrap_or_default()
}

/// Handle the notes command
fn handle_notes_command(sub: &ArgMatches) -> precis::Result<()> {
    let (article, registry) = load_article(sub, 0)?;
    let store = AnnotationStore::new(JsonFileStore::new(store_path(sub)));
    let report = store.load(&article.url, &registry)?;

    if report.notes.is_empty() && report.stale.is_empty() {
        println!("No notes for {}", article.url);
        return Ok(());
    }
    for (index, note) in report.notes.iter().enumerate() {
        let text: Vec<String> = note
            .ranges
            .iter()
            .map(|range| format!("{:?}", range.text(&registry)))
            .collect();
        println!("note {}: {}", index + 1, text.join(" … "));
        for comment in &note.comments {
            println!("  {}: {}", comment.author, comment.text);
        }
    }
    for stale in &report.stale {
        println!("stale #{} ({}): {}", stale.index + 1, stale.range, stale.error);
    }
    Ok(())
}

/// Handle the annotate command
fn handle_annotate_command(sub: &ArgMatches) -> precis::Result<()> {
    let (article, registry) = load_article(sub, 0)?;
    let data = sub
        .get_one::<String>("range")
        .expect("range is a required argument");
    let range = Range::deserialize(data, &registry)?;
    if range.is_empty() {
        println!("Range {} is empty, nothing stored", data);
        return Ok(());
    }
    let text = range.text(&registry);

    let comment = Comment::new(
        sub.get_one::<String>("author")
            .map(String::as_str)
            .unwrap_or("anonymous"),
        sub.get_one::<String>("comment")
            .expect("comment is a required argument")
            .as_str(),
    );
    let mut book = NoteBook::new();
    let id = book.add(vec![range], vec![comment]);

    let mut store = AnnotationStore::new(JsonFileStore::new(store_path(sub)));
    if let Some(note) = book.get(id) {
        store.append(&article.url, note, &registry)?;
    }
    println!("Stored note on {:?}", text);
    Ok(())
}

fn store_path(sub: &ArgMatches) -> String {
    sub.get_one::<String>("store")
        .cloned()
        .unwrap_or_default()
}
