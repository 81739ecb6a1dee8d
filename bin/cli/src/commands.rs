//! Subcommand implementations. Results go to stdout; logs go to stderr.

use flowdeck_client::{Confirm, EditorSession, RunResult, Workbench};
use flowdeck_core::{FlowId, ParseIdError, TemplateId};
use flowdeck_workflow::{BlockCatalog, ConfigRegistry, GraphModel, Node};
use std::collections::HashSet;
use rootcause::prelude::Report;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

/// A command failure, rendered once for the user.
#[derive(Debug)]
pub struct Failure(String);

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<C> From<Report<C>> for Failure
where
    Report<C>: fmt::Display,
{
    fn from(report: Report<C>) -> Self {
        Self(report.to_string())
    }
}

impl From<ParseIdError> for Failure {
    fn from(e: ParseIdError) -> Self {
        Self(e.to_string())
    }
}

type Outcome = Result<ExitCode, Failure>;

/// Asks on stdin, accepting `y` or `yes`.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn read_graph(file: &Path) -> Result<GraphModel, Failure> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| Failure(format!("cannot read {}: {e}", file.display())))?;
    Ok(GraphModel::from_json(&raw)?)
}

fn print_opened(session: &EditorSession) {
    println!("{}  {}", session.flow_id(), session.name());
    let report = session.import_report();
    for skipped in &report.skipped_nodes {
        println!("  skipped {} (unknown block type {})", skipped.node_id, skipped.block_type);
    }
    for dropped in &report.dropped_edges {
        println!("  dropped edge {} -> {}: {}", dropped.edge.from, dropped.edge.to, dropped.reason);
    }
}

pub async fn blocks(workbench: &mut Workbench) -> Outcome {
    let catalog = workbench.blocks().await;
    if catalog.is_empty() {
        println!("No blocks available");
        return Ok(ExitCode::FAILURE);
    }
    for (category, blocks) in catalog.by_category() {
        println!("{category}");
        for block in blocks {
            println!(
                "  {:<18} {:<18} {} in / {} out",
                block.block_type, block.label, block.inputs, block.outputs
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn list(workbench: &Workbench) -> Outcome {
    let flows = workbench.list().await?;
    if flows.is_empty() {
        println!("No flows yet");
    }
    for flow in flows {
        let updated = flow
            .updated_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:<12} {:<30} {:<16} {}", flow.id, flow.name, updated, flow.description);
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn show(workbench: &mut Workbench, id: &str) -> Outcome {
    let session = workbench.open(&id.parse::<FlowId>()?).await?;
    print_opened(&session);
    if !session.description().is_empty() {
        println!("{}", session.description());
    }

    let graph = session.graph();
    println!("\nNodes ({}):", graph.node_count());
    for node in listing_order(&graph) {
        let config = node.block_config();
        if config.is_opaque() {
            println!("  {:<12} {}", node.id, node.block_type);
        } else {
            println!(
                "  {:<12} {:<18} {}",
                node.id,
                node.block_type,
                serde_json::Value::Object(config.to_record())
            );
        }
    }
    println!("Edges ({}):", graph.edge_count());
    for edge in graph.edges() {
        println!("  {} -> {}", edge.from, edge.to);
    }

    let issues = session.issues();
    if !issues.is_empty() {
        println!("Issues:");
        for issue in &issues {
            println!("  {issue}");
        }
    }
    session.close();
    Ok(ExitCode::SUCCESS)
}

pub async fn create(
    workbench: &mut Workbench,
    name: &str,
    description: &str,
    file: Option<&Path>,
) -> Outcome {
    let Some(file) = file else {
        let session = workbench.create_empty(name, description).await?;
        println!("{}  {}", session.flow_id(), session.name());
        return Ok(ExitCode::SUCCESS);
    };

    let graph = read_graph(file)?;
    let flow = workbench.store().create_flow(name, description, &graph).await?;
    println!("{}  {}", flow.id, flow.name);
    Ok(ExitCode::SUCCESS)
}

pub async fn delete(workbench: &Workbench, id: &str, yes: bool) -> Outcome {
    let id = id.parse::<FlowId>()?;
    let deleted = if yes {
        workbench.delete(&id, &|_: &str| true).await?
    } else {
        workbench.delete(&id, &StdinConfirm).await?
    };
    if deleted {
        println!("Deleted {id}");
    } else {
        println!("Kept {id}");
    }
    Ok(ExitCode::SUCCESS)
}

fn print_run(result: &RunResult) -> ExitCode {
    println!("{}", result.summary(RunResult::SUMMARY_CHARS));
    let mut failed = false;
    for entry in result.failures() {
        failed = true;
        println!(
            "failed: {} ({}): {}",
            entry.node_id,
            entry.block_type,
            entry.error.as_deref().unwrap_or("error")
        );
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

pub async fn run(workbench: &Workbench, id: &str) -> Outcome {
    let result = workbench.quick_run(&id.parse::<FlowId>()?).await?;
    Ok(print_run(&result))
}

pub async fn magic(workbench: &mut Workbench, goal: &str) -> Outcome {
    let session = workbench.magic(goal).await?;
    print_opened(&session);
    println!("{} nodes, {} edges", session.graph().node_count(), session.graph().edge_count());
    Ok(ExitCode::SUCCESS)
}

pub async fn templates(workbench: &Workbench) -> Outcome {
    for template in workbench.templates().await? {
        println!(
            "{:<20} {:<30} {:<12} {}",
            template.id,
            template.name,
            template.category.as_deref().unwrap_or(""),
            template.description
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn import_template(workbench: &mut Workbench, id: &str) -> Outcome {
    let session = workbench.import_template(&id.parse::<TemplateId>()?).await?;
    print_opened(&session);
    Ok(ExitCode::SUCCESS)
}

/// Checks a graph file offline.
pub fn validate(file: &Path) -> Outcome {
    let graph = read_graph(file)?;
    let catalog = BlockCatalog::builtin();
    let registry = ConfigRegistry::builtin();

    let mut problems = 0;
    for issue in graph.validate(&catalog) {
        println!("{issue}");
        problems += 1;
    }
    for (node_id, issue) in registry.validate_graph(&graph) {
        println!("{node_id}: {issue}");
        problems += 1;
    }

    if problems == 0 {
        println!(
            "{} nodes, {} edges, no problems found",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Every node once: execution order first, then nodes held back by a cycle
/// in graph order.
fn listing_order(graph: &GraphModel) -> Vec<&Node> {
    let mut listed = HashSet::new();
    let mut nodes: Vec<&Node> = graph
        .execution_order()
        .iter()
        .filter_map(|id| graph.node(id.as_str()))
        .inspect(|node| {
            listed.insert(node.id.as_str());
        })
        .collect();
    nodes.extend(graph.nodes().filter(|node| !listed.contains(node.id.as_str())));
    nodes
}
