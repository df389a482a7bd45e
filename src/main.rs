use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::net::IpAddr;
use std::path::PathBuf;

use branchflow::editor::config::ServerConfig;
use branchflow::editor::loader::WorkflowLoader;
use branchflow::editor::server;
use branchflow::editor::{Editor, SharedEditor};
use branchflow::engine::Tree;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the editor API over HTTP
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Workflow document to start from
        #[arg(short, long)]
        workflow: Option<PathBuf>,
    },
    /// Validate a workflow document and print it as JSON
    Show {
        /// Path to the workflow file
        #[arg(short, long)]
        workflow: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Serve {
            host,
            port,
            workflow,
        } => {
            let config = ServerConfig::from_env()?.with_overrides(host, port, workflow);

            let tree = match &config.workflow {
                Some(path) => WorkflowLoader::new().load_workflow(path)?,
                None => {
                    log::info!("No workflow given, starting from the default workflow");
                    Tree::initial()
                }
            };

            let editor = SharedEditor::new(Editor::with_tree(tree));
            server::serve(&config, editor).await?;
        }
        Commands::Show { workflow } => {
            let tree = WorkflowLoader::new().load_workflow(&workflow)?;
            println!("{}", WorkflowLoader::export_json(&tree)?);
        }
    }

    Ok(())
}
