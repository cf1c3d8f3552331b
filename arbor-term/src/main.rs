//! Terminal browser for JSON trees, driven by the `arbor` tree engine.

mod screen;

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use arbor::prelude::*;
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use simplelog::{Config, LevelFilter, WriteLogger};
use thiserror::Error;

use screen::{Frame, Screen};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding one node or an array of root nodes.
    input: PathBuf,

    /// Settings file (JSON) with options and key bindings.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Depth at which nodes start collapsed.
    #[arg(long)]
    level: Option<usize>,

    /// Materialize collapsed subtrees only when first expanded.
    #[arg(long)]
    lazy: bool,

    /// Allow selecting several nodes.
    #[arg(long)]
    multi: bool,

    /// Field holding each node's label.
    #[arg(long)]
    label: Option<String>,

    #[arg(long, default_value = "arbor-term.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("input {0} holds no nodes")]
    Empty(PathBuf),
}

/// Input mode of the browser.
enum Mode {
    Browse,
    Filter(String),
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let log_file = File::create(&cli.log_file)?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)?;

    let mut tree = TreeView::new(options(&cli)?);
    let roots = tree.load_json(&fs::read_to_string(&cli.input)?)?;
    if roots.is_empty() {
        return Err(AppError::Empty(cli.input));
    }
    log::info!("loaded {} with {} roots", cli.input.display(), roots.len());
    tree.first_node();

    let mut screen = Screen::new()?;
    let mut mode = Mode::Browse;
    let mut dirty = true;
    loop {
        dirty |= tree.take_dirty();
        if dirty {
            let lines = tree.visual().lines();
            let status = status_line(&tree);
            let prompt = match &mode {
                Mode::Filter(query) => Some(query.as_str()),
                Mode::Browse => None,
            };
            screen.draw(&Frame {
                lines: &lines,
                status: &status,
                prompt,
            })?;
            dirty = false;
        }

        for event in screen.poll(Duration::from_millis(250))? {
            match event {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    match &mut mode {
                        Mode::Browse => match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                            KeyCode::Char('/') => {
                                mode = Mode::Filter(String::new());
                                dirty = true;
                            }
                            _ => {
                                tree.handle_key(&KeyCombo::from(key));
                            }
                        },
                        Mode::Filter(query) => {
                            match key.code {
                                KeyCode::Esc => {
                                    mode = Mode::Browse;
                                    tree.render();
                                    tree.first_node();
                                }
                                KeyCode::Enter => mode = Mode::Browse,
                                KeyCode::Backspace => {
                                    query.pop();
                                    tree.filter_fuzzy(query, None);
                                    tree.first_node();
                                }
                                KeyCode::Char(c) => {
                                    query.push(c);
                                    tree.filter_fuzzy(query, None);
                                    tree.first_node();
                                }
                                _ => {}
                            }
                            dirty = true;
                        }
                    }
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let lines = tree.visual().lines();
                    let Some(line) = screen
                        .line_at_row(mouse.row, lines.len())
                        .map(|index| &lines[index])
                    else {
                        continue;
                    };
                    let Some(id) = tree.node_at_visual(line.id) else {
                        continue;
                    };
                    let target = if Screen::hits_expander(line, mouse.column) {
                        ClickTarget::Expander
                    } else {
                        ClickTarget::Label
                    };
                    tree.click(id, target, mouse.modifiers.into());
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        for event in tree.drain_events() {
            log::debug!("tree event: {event:?}");
        }
    }
}

fn options(cli: &Cli) -> Result<TreeOptions<Record>, AppError> {
    let mut options = match &cli.settings {
        Some(path) => {
            let settings = TreeSettings::from_json(&fs::read_to_string(path)?)?;
            TreeOptions::from_settings(&settings)?
        }
        None => TreeOptions::new(),
    };
    if let Some(level) = cli.level {
        options = options.initial_expand_level(level);
    }
    if cli.lazy {
        options = options.lazy_render(true);
    }
    if cli.multi {
        options = options.multi_select(true);
    }
    if let Some(label) = &cli.label {
        options = options.label_field(label.as_str());
    }
    Ok(options)
}

fn status_line(tree: &TreeView<Record>) -> String {
    let focused = tree
        .focused_key()
        .and_then(|key| tree.label_of(key))
        .unwrap_or_default();
    format!(
        " {} | {} nodes shown | {} selected | / filter, q quit",
        focused,
        tree.visible_ids().len(),
        tree.selected().len()
    )
}
