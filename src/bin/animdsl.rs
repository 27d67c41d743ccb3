use std::{
    cell::RefCell,
    collections::BTreeMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use animdsl::{
    AnimDoc, AnimValue, AnimationNode, DocContext, HeadlessEngine, HostRef, NodeKind, NodeState,
    PropertyBag, Target, TypeEvaluator,
};
use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "animdsl", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a document and print its plan summary as JSON.
    Plan(PlanArgs),
    /// Play a document on the headless engine, printing one JSON line per tick.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Clock step per tick, in milliseconds.
    #[arg(long, default_value_t = 100)]
    step: u64,

    /// Stop after this much simulated time even if animations still run.
    #[arg(long, default_value_t = 10_000)]
    max_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Run(args) => cmd_run(args),
    }
}

type Bags = BTreeMap<String, Rc<RefCell<PropertyBag>>>;

#[derive(serde::Serialize)]
struct Tick<'a> {
    t: u64,
    state: NodeState,
    value: Option<AnimValue>,
    targets: BTreeMap<&'a str, PropertyBag>,
}

fn read_doc(path: &Path) -> anyhow::Result<(AnimDoc, DocContext, Bags)> {
    let doc = AnimDoc::from_path(path)
        .with_context(|| format!("load animation document '{}'", path.display()))?;

    let mut ctx = DocContext::new().with_evaluator("json_lerp", TypeEvaluator::json_lerp());
    let mut bags = Bags::new();
    for name in doc.target_names() {
        let bag = PropertyBag::new().shared();
        ctx = ctx.with_target(name.clone(), Target::from_shared(bag.clone()));
        bags.insert(name, bag);
    }
    Ok((doc, ctx, bags))
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (doc, ctx, _bags) = read_doc(&args.in_path)?;
    let plan = doc
        .into_builder(&ctx)?
        .build_plan()
        .with_context(|| "compile animation plan")?;

    let summary = plan.summary(animdsl::DEFAULT_DURATION_MS);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let (doc, ctx, bags) = read_doc(&args.in_path)?;
    let engine = HeadlessEngine::shared();
    let host: HostRef = engine.clone();

    let node = doc
        .into_builder(&ctx)?
        .build(&host)
        .with_context(|| "build animation")?;

    let last_value: Rc<RefCell<Option<AnimValue>>> = Rc::default();
    let sink = last_value.clone();
    if let Some(leaf) = first_leaf(&node) {
        leaf.on_update(move |v| *sink.borrow_mut() = Some(v.clone()));
    }

    node.start()?;
    print_tick(&engine, &node, &bags, &last_value)?;

    let step = args.step.max(1);
    let mut elapsed = 0;
    while engine.has_running() && elapsed < args.max_ms {
        let dt = step.min(args.max_ms - elapsed);
        engine.advance(dt)?;
        elapsed += dt;
        print_tick(&engine, &node, &bags, &last_value)?;
    }
    Ok(())
}

/// Groups never sample, so ticks report the first leaf in declaration order.
fn first_leaf(node: &AnimationNode) -> Option<&AnimationNode> {
    match node.kind() {
        NodeKind::Set { .. } => node.children().iter().find_map(first_leaf),
        _ => Some(node),
    }
}

fn print_tick(
    engine: &HeadlessEngine,
    node: &AnimationNode,
    bags: &Bags,
    last_value: &RefCell<Option<AnimValue>>,
) -> anyhow::Result<()> {
    let targets: BTreeMap<&str, PropertyBag> = bags
        .iter()
        .map(|(name, bag)| (name.as_str(), bag.borrow().clone()))
        .collect();
    let tick = Tick {
        t: engine.now(),
        state: node.state(),
        value: last_value.borrow().clone(),
        targets,
    };
    println!("{}", serde_json::to_string(&tick)?);
    Ok(())
}
