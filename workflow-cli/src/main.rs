mod cli;

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use workflow_engine::{
    ActorNode, ActorPayload, ActorSystem, EngineConfig, Interpreter, InterpreterActor, Scheduler,
};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.verbosity.to_string())),
        )
        .init();

    let mut config = EngineConfig::default().max_iterations(args.max_iterations);
    if let Some(n) = args.max_concurrency {
        config = config.max_concurrency(n);
    }
    if let Some(dir) = &args.base_dir {
        config = config.workflow_base_dir(dir.clone());
    }

    let actor_system = Arc::new(ActorSystem::with_scheduler(Scheduler::new(config.max_concurrency)));

    let mut sub_interpreter = Interpreter::new(actor_system.clone());
    if let Some(dir) = &config.workflow_base_dir {
        sub_interpreter.set_workflow_base_dir(dir.clone());
    }
    actor_system.add_actor(ActorNode::new(
        "interpreter",
        ActorPayload::Plain(Arc::new(InterpreterActor::new(sub_interpreter))),
    ));

    let mut interpreter = Interpreter::new(actor_system);
    if let Some(dir) = &config.workflow_base_dir {
        interpreter.set_workflow_base_dir(dir.clone());
    }

    let file = args.file.to_string_lossy().to_string();
    let load_result = match &args.overlay_dir {
        Some(overlay_dir) => interpreter.load_with_overlay(&file, overlay_dir),
        None => interpreter.load_file(&args.file),
    };

    if let Err(e) = load_result {
        eprintln!("error: failed to load workflow: {e}");
        process::exit(1);
    }

    match interpreter.run_until_end(config.max_iterations).await {
        Ok(result) => {
            println!("{result}");
            if !result.success {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
