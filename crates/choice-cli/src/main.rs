use anyhow::{Context, Result, bail};
use choice_config::Config;
use choice_engine::dom::{Fixture, NodeId, Tree, markup};
use choice_engine::{
    Boundary, Choice, ChoiceError, MemoryHost, RestoreStrategy, Selection, SelectionHost, decode,
    flatten_lists,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Encode and restore text selections in HTML fragments.
///
/// Selection boundaries are written into the markup as `|`, e.g.
/// `<p>Photo|graph</p>` or `<p>|One</p><p>Two|</p>`.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Treat list items as blocks instead of the root's direct children
    #[arg(long, global = true)]
    flatten_lists: bool,

    /// Config file to use instead of ~/.config/choice/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the marked selection as block/offset JSON
    Encode {
        markup: String,
        /// Make the selection run from the last marker to the first
        #[arg(long)]
        backwards: bool,
    },
    /// Resolve a block index and text offset to a node in the markup
    Decode {
        markup: String,
        block: usize,
        offset: usize,
    },
    /// Capture the marked selection, restore it and capture it again
    Roundtrip {
        markup: String,
        #[arg(long)]
        backwards: bool,
    },
}

/// A boundary described so it can be checked against the markup by eye.
#[derive(Debug, PartialEq, Serialize)]
struct BoundaryReport {
    node: String,
    path: Vec<usize>,
    offset: usize,
}

impl BoundaryReport {
    fn new(tree: &Tree, boundary: Boundary<NodeId>) -> Self {
        Self {
            node: tree.describe(boundary.node),
            path: tree.path(boundary.node),
            offset: boundary.offset,
        }
    }
}

/// A decoded boundary together with the markup of the block it was found in.
#[derive(Debug, PartialEq, Serialize)]
struct DecodeReport {
    block: String,
    #[serde(flatten)]
    boundary: BoundaryReport,
}

#[derive(Debug, Serialize)]
struct RoundTripReport {
    content: String,
    selection: Selection,
    strategy: RestoreStrategy,
    anchor: BoundaryReport,
    focus: BoundaryReport,
    recaptured: Option<Selection>,
    stable: bool,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let path = Config::expand_path(path);
            Config::load_from_path(&path)?
                .with_context(|| format!("No config file found at {}", path.display()))
        }
        None => Ok(Config::load()?.unwrap_or_default()),
    }
}

fn parse_markup(input: &str) -> Result<Fixture> {
    markup::parse(input).with_context(|| format!("Cannot parse markup {input:?}"))
}

fn build_choice(
    fixture: &Fixture,
    host: &MemoryHost<NodeId>,
    config: &Config,
) -> Result<Choice<'static, Tree>, ChoiceError> {
    let mut choice =
        Choice::new(&fixture.tree, fixture.root, host)?.with_block_tags(config.block_tags());
    if config.flatten_lists {
        choice = choice.with_blocks(flatten_lists);
    }
    if let Some(strategy) = config.restore_strategy {
        choice = choice.with_strategy(strategy);
    }
    Ok(choice)
}

fn host_for(strategy: RestoreStrategy) -> MemoryHost<NodeId> {
    match strategy {
        RestoreStrategy::ExtendBased => MemoryHost::new(),
        RestoreStrategy::RangeBased => MemoryHost::without_extend(),
    }
}

fn encode_markup(input: &str, backwards: bool, config: &Config) -> Result<Option<Selection>> {
    let fixture = parse_markup(input)?;
    if fixture.markers.is_empty() {
        bail!("No `|` marker in {input:?}");
    }
    let host = fixture.host(backwards);
    let choice = build_choice(&fixture, &host, config)?;
    Ok(choice.capture(&fixture.tree, &host))
}

fn decode_markup(input: &str, block: usize, offset: usize, config: &Config) -> Result<DecodeReport> {
    let fixture = parse_markup(input)?;
    let host = MemoryHost::new();
    let choice = build_choice(&fixture, &host, config)?;

    let blocks = choice.blocks(&fixture.tree);
    let node = blocks
        .get(block)
        .copied()
        .ok_or(ChoiceError::BlockOutOfRange {
            index: block,
            len: blocks.len(),
        })?;
    let boundary = decode(&fixture.tree, node, offset)?;
    Ok(DecodeReport {
        block: fixture.tree.to_markup(node),
        boundary: BoundaryReport::new(&fixture.tree, boundary),
    })
}

fn round_trip_markup(input: &str, backwards: bool, config: &Config) -> Result<RoundTripReport> {
    let fixture = parse_markup(input)?;
    let capture_host = fixture.host(backwards);
    let choice = build_choice(&fixture, &capture_host, config)?;
    let Some(selection) = choice.capture(&fixture.tree, &capture_host) else {
        bail!("The marked selection is outside every block");
    };

    let strategy = choice.strategy();
    let mut host = host_for(strategy);
    choice.restore(&fixture.tree, &mut host, &selection)?;
    let live = host
        .current_selection()
        .context("Host has no selection after restore")?;
    let recaptured = choice.capture(&fixture.tree, &host);
    let stable = Selection::equals(Some(&selection), recaptured.as_ref());
    if !stable {
        log::warn!("{selection:?} came back as {recaptured:?}");
    }

    Ok(RoundTripReport {
        content: fixture.tree.inner_markup(fixture.root),
        selection,
        strategy,
        anchor: BoundaryReport::new(&fixture.tree, live.anchor),
        focus: BoundaryReport::new(&fixture.tree, live.focus),
        recaptured,
        stable,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    config.flatten_lists |= cli.flatten_lists;
    log::debug!("Using {config:?}");

    let output = match cli.command {
        Command::Encode { markup, backwards } => {
            serde_json::to_string_pretty(&encode_markup(&markup, backwards, &config)?)?
        }
        Command::Decode {
            markup,
            block,
            offset,
        } => serde_json::to_string_pretty(&decode_markup(&markup, block, offset, &config)?)?,
        Command::Roundtrip { markup, backwards } => {
            serde_json::to_string_pretty(&round_trip_markup(&markup, backwards, &config)?)?
        }
    };
    println!("{output}");
    Ok(())
}
