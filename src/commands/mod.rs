// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line surface: `brokers`, `instances`, `bindings` and `catalog`.

pub mod bindings;
pub mod brokers;
pub mod catalog;
pub mod instances;

use std::future::{pending, Future};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::adapter::HttpAdapter;
use crate::broker_url::{BrokerTarget, BrokerUrlArgs};
use crate::error::{BrokerCliError, Result};
use crate::poller::{wait_on_operation_until, PollOptions};
use crate::types::{JsonObject, Operation, OperationType};

#[derive(Parser, Debug)]
#[command(
    name = "broker-cli",
    version,
    about = "Manage Open Service Brokers, their service instances and bindings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Service account JSON key file. Application default credentials are used when not given.
    #[arg(long, global = true)]
    pub creds: Option<PathBuf>,

    /// Open Service Broker API version sent with every request
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Service Broker registry host
    #[arg(long, global = true, hide = true)]
    pub host: Option<String>,

    /// Increase logging verbosity and show polling progress (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage service brokers
    Brokers {
        #[command(subcommand)]
        command: brokers::BrokersCommand,
    },
    /// Manage service instances
    Instances {
        #[command(subcommand)]
        command: instances::InstancesCommand,
    },
    /// Manage service bindings
    Bindings {
        #[command(subcommand)]
        command: bindings::BindingsCommand,
    },
    /// Get broker catalog
    Catalog {
        #[command(flatten)]
        target: BrokerUrlFlags,
    },
}

/// Broker addressing: either `--server`, or `--project` and `--broker`
#[derive(Args, Debug, Clone, Default)]
pub struct BrokerUrlFlags {
    /// Broker URL to make requests to (https://...). Required if --project and --broker are not given
    #[arg(short, long)]
    pub server: Option<String>,
    /// GCP project of the broker. Required if --server is not given
    #[arg(short, long)]
    pub project: Option<String>,
    /// Broker name. Required if --server is not given
    #[arg(short, long)]
    pub broker: Option<String>,
}

impl BrokerUrlFlags {
    pub fn resolve(&self, host: &str) -> Result<BrokerTarget> {
        BrokerUrlArgs {
            server: self.server.clone(),
            host: host.to_string(),
            project: self.project.clone(),
            broker: self.broker.clone(),
        }
        .resolve()
    }
}

/// Flags of the calls that may run asynchronously
#[derive(Args, Debug, Clone, Default)]
pub struct AsyncFlags {
    /// Allow the broker to execute the request asynchronously
    #[arg(short, long)]
    pub asynchronous: bool,
    /// Wait for an asynchronous operation to finish
    #[arg(short, long)]
    pub wait: bool,
    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Settings shared by every command
pub struct Context {
    pub adapter: HttpAdapter,
    pub host: String,
    pub api_version: String,
    pub show_progress: bool,
}

impl Context {
    pub fn poll_options(&self, timeout: Option<u64>) -> PollOptions {
        PollOptions {
            show_progress: self.show_progress,
            timeout: timeout.map(Duration::from_secs),
        }
    }
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Brokers { command } => brokers::run(ctx, command).await,
        Command::Instances { command } => instances::run(ctx, command).await,
        Command::Bindings { command } => bindings::run(ctx, command).await,
        Command::Catalog { target } => catalog::run(ctx, &target).await,
    }
}

/// Parse a JSON object flag. An absent or empty value yields `None`.
pub fn parse_json_object(flag: &'static str, value: Option<&str>) -> Result<Option<JsonObject>> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => serde_json::from_str(v)
            .map(Some)
            .map_err(|source| BrokerCliError::InvalidJsonArgument { flag, source }),
    }
}

/// Pass a succeeded operation through, turn any other terminal state into an error
pub fn ensure_succeeded(resource: String, operation: Operation) -> Result<Operation> {
    if operation.succeeded() {
        return Ok(operation);
    }
    Err(BrokerCliError::OperationFailed {
        resource,
        state: operation.state.to_string(),
        description: operation.description,
    })
}

fn action(operation_type: OperationType) -> &'static str {
    match operation_type {
        OperationType::Create => "creating",
        OperationType::Update => "updating",
        OperationType::Delete => "deleting",
        OperationType::Unknown => "polling",
    }
}

/// Poll until the operation ends, the timeout expires or the user hits Ctrl-C
pub async fn wait_interruptible<F, Fut>(last_operation: F, options: &PollOptions) -> Result<Operation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Operation>>,
{
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            pending::<()>().await;
        }
    };
    wait_on_operation_until(last_operation, options, interrupted).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::instances::InstancesCommand;

    #[test]
    fn test_parse_json_object() {
        assert_eq!(parse_json_object("parameters", None).unwrap(), None);
        assert_eq!(parse_json_object("parameters", Some("")).unwrap(), None);

        let obj = parse_json_object("parameters", Some(r#"{"tier":"small"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(obj["tier"], "small");
    }

    #[test]
    fn test_parse_json_object_rejects_non_objects() {
        for value in ["[1, 2]", "not json", "\"text\""] {
            let err = parse_json_object("context", Some(value)).unwrap_err();
            assert!(matches!(err, BrokerCliError::InvalidJsonArgument { flag: "context", .. }));
            assert!(err.to_string().contains("--context"));
        }
    }

    #[test]
    fn test_cli_parses_instance_create() {
        let cli = Cli::try_parse_from([
            "broker-cli",
            "-vv",
            "--api-version",
            "2.14",
            "instances",
            "create",
            "--project",
            "p",
            "--broker",
            "b",
            "--instance",
            "i1",
            "--service",
            "svc",
            "--plan",
            "plan",
            "-a",
            "-w",
            "--timeout",
            "60",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_version.as_deref(), Some("2.14"));
        match cli.command {
            Command::Instances {
                command: InstancesCommand::Create(args),
            } => {
                assert_eq!(args.target.project.as_deref(), Some("p"));
                assert_eq!(args.instance, "i1");
                assert!(args.flags.asynchronous);
                assert!(args.flags.wait);
                assert_eq!(args.flags.timeout, Some(60));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_instance() {
        let err = Cli::try_parse_from(["broker-cli", "instances", "delete", "--server", "https://x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_broker_url_flags_resolve() {
        let flags = BrokerUrlFlags {
            project: Some("p".to_string()),
            broker: Some("b".to_string()),
            ..Default::default()
        };

        let target = flags.resolve("https://registry.example.com").unwrap();

        assert_eq!(target.url, "https://registry.example.com/v1beta1/projects/p/brokers/b");
    }

    #[test]
    fn test_ensure_succeeded() {
        let done = Operation {
            state: crate::types::OperationState::Succeeded,
            description: String::new(),
        };
        assert!(ensure_succeeded("creating instance \"i1\"".to_string(), done).is_ok());

        let failed = Operation {
            state: crate::types::OperationState::Failed,
            description: "quota exceeded".to_string(),
        };
        let err = ensure_succeeded("creating instance \"i1\"".to_string(), failed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed creating instance \"i1\": operation ended in state failed: quota exceeded"
        );
        assert_eq!(action(OperationType::Delete), "deleting");
    }

    #[test]
    fn test_poll_options() {
        let ctx = Context {
            adapter: crate::test_utils::MockTransport::new().adapter(),
            host: String::new(),
            api_version: String::new(),
            show_progress: true,
        };

        let options = ctx.poll_options(Some(5));

        assert!(options.show_progress);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(ctx.poll_options(None).timeout, None);
    }
}
