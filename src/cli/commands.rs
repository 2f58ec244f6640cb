//! Command dispatch: load the forest and print the requested view.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{ClusterForest, ClusterNode, DomainError, TreeBuilder};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(period) = &cli.period {
        settings.default_period = period.clone();
    }
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Info { file }) => cmd_info(file),
        Some(Commands::Tree { file }) => cmd_tree(file, &settings),
        Some(Commands::Roots { file }) => cmd_roots(file, &settings),
        Some(Commands::Leaves { file }) => cmd_leaves(file, &settings),
        Some(Commands::Node {
            file,
            level,
            level_id,
        }) => cmd_node(file, *level, *level_id, &settings),
        Some(Commands::Config) => cmd_config(&settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

#[instrument(level = "debug")]
fn load_forest(file: &Path) -> CliResult<ClusterForest> {
    let forest = TreeBuilder::new().build_from_path(file)?;
    debug!("loaded {}: {}", file.display(), forest);
    Ok(forest)
}

fn cmd_info(file: &Path) -> CliResult<()> {
    let forest = load_forest(file)?;
    output::header(&forest);
    for (level, nodes) in forest.levels() {
        output::detail(&format!("level {}: {} clusters", level, nodes.len()));
    }
    output::action("roots", &forest.roots().len());
    output::action("leaves", &forest.leaves().len());
    output::action("depth", &forest.depth());
    Ok(())
}

fn cmd_tree(file: &Path, settings: &Settings) -> CliResult<()> {
    let forest = load_forest(file)?;
    let style = settings.render_style();
    for tree in forest.to_tree_strings(&style) {
        output::info(&tree);
    }
    Ok(())
}

fn cmd_roots(file: &Path, settings: &Settings) -> CliResult<()> {
    let forest = load_forest(file)?;
    let style = settings.render_style();
    for idx in forest.roots() {
        if let Some(node) = forest.get(idx) {
            output::info(&style.describe(node));
        }
    }
    Ok(())
}

fn cmd_leaves(file: &Path, settings: &Settings) -> CliResult<()> {
    let forest = load_forest(file)?;
    let style = settings.render_style();
    for idx in forest.leaves() {
        if let Some(node) = forest.get(idx) {
            output::info(&style.describe(node));
        }
    }
    Ok(())
}

fn cmd_node(file: &Path, level: i64, level_id: i64, settings: &Settings) -> CliResult<()> {
    let forest = load_forest(file)?;
    let node = forest
        .node_at(level, level_id)
        .and_then(|idx| forest.get(idx))
        .ok_or(CliError::NodeNotFound { level, level_id })?;
    let period = settings.default_period.as_str();

    output::header(node.name());
    output::detail(node);
    output::action("label", node.label().unwrap_or("-"));
    output::action("description", node.description().unwrap_or("-"));
    match node.weight(period) {
        Some(weight) => output::action(&format!("weight[{}]", period), &weight),
        None => output::warning(&format!("no weight recorded for period '{}'", period)),
    }
    if settings.show_sentiment {
        print_sentiment(node, period);
    }
    output::action(
        "parent",
        forest.parent_of(node).map(ClusterNode::name).unwrap_or("-"),
    );
    match node.child_entries() {
        None => output::action("children", "- (leaf)"),
        Some(entries) => {
            output::action("children", &entries.len());
            for (name, _) in entries {
                output::detail(name);
            }
        }
    }
    Ok(())
}

fn print_sentiment(node: &ClusterNode, period: &str) {
    let label = format!("sentiment[{}]", period);
    match node.sentiment_score(period) {
        Ok(Some(score)) => output::action(&label, &score),
        Ok(None) => output::action(&label, "-"),
        Err(
            e @ (DomainError::EmptySentiment { .. }
            | DomainError::MissingSentimentClass { .. }
            | DomainError::NegativeSentimentCount { .. }),
        ) => output::warning(&e),
        Err(e) => output::error(&e),
    }
}

fn cmd_config(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}
