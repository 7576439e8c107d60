use crate::{
    echo::echo_handler,
    logging::{init_logging_with_config, LogConfig},
    middleware::{CorsMiddleware, LoggingMiddleware},
    runtime_config::RuntimeConfig,
    Dispatcher, RequestContext, RouterError,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

/// Every method the demo echo route answers
pub const ECHO_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Command-line interface for the feather demo application
#[derive(Parser, Debug)]
#[command(name = "feather")]
#[command(about = "Feather HTTP dispatcher demo", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the demo application
    Serve {
        /// Address to bind
        #[arg(long, env = "FEATHER_ADDR", default_value = "0.0.0.0:8080")]
        addr: String,

        /// Log level (overrides FEATHER_LOG_LEVEL)
        #[arg(long)]
        log_level: Option<String>,

        /// Do not install the CORS middleware
        #[arg(long, default_value_t = false)]
        no_cors: bool,
    },
    /// Print the demo route table in matching order
    Routes,
}

/// Build the demo application
///
/// - `GET /` greets
/// - `GET /users/:id|[0-9]+` looks up a numeric user id
/// - `/echo` and `/echo/:tail` echo the request for every common verb
///
/// # Errors
///
/// Returns [`RouterError::InvalidPattern`] if a pattern fails to compile.
pub fn demo_app(cors: bool) -> Result<Dispatcher, RouterError> {
    let mut app = Dispatcher::new();
    app.add_middleware(LoggingMiddleware::new());
    if cors {
        app.add_middleware(CorsMiddleware::default());
    }

    app.get("/", |ctx: &mut RequestContext| {
        ctx.text(200, "Hello from feather\n");
    })?;
    app.get("/users/:id|[0-9]+", |ctx: &mut RequestContext| {
        let id = ctx.param("id").unwrap_or_default().to_string();
        ctx.json(200, &json!({ "id": id, "name": format!("user-{id}") }));
    })?;
    app.handle("/echo", echo_handler, &ECHO_METHODS)?;
    app.handle("/echo/:tail", echo_handler, &ECHO_METHODS)?;
    Ok(app)
}

/// Run a parsed command line
///
/// # Errors
///
/// Fails when logging cannot be initialized, the demo routes do not compile,
/// or the server cannot bind.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            log_level,
            no_cors,
        } => {
            let mut log_config = LogConfig::from_env();
            if let Some(level) = log_level {
                log_config.log_level = level;
            }
            let _log_guard = init_logging_with_config(&log_config)?;
            RuntimeConfig::from_env().apply();

            let app = demo_app(!no_cors).context("demo routes failed to compile")?;
            app.listen(&addr)
                .with_context(|| format!("server on {addr} failed"))?;
        }
        Commands::Routes => {
            let app = demo_app(false).context("demo routes failed to compile")?;
            app.router().dump_routes();
        }
    }
    Ok(())
}
