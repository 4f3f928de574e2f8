use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okteto::{OktetoClient, OktetoContext};
use orchestrator::{
    ActionWaitConfig, DeployInputs, PipelineConfig, PreviewDeployment, PreviewError,
    PreviewPipeline, ResourcePollConfig,
};
use vcs::GitVcs;

const DEFAULT_ACTION_ROUNDS: u32 = 4;
const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 5 * 60;
const DEFAULT_RESOURCES_TIMEOUT_SECS: u64 = 15 * 60;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

#[derive(Parser, Debug)]
#[command(name = "deploy-preview")]
#[command(about = "Deploy an Okteto preview environment and wait until it is running", long_about = None)]
#[command(version)]
struct Cli {
    /// Name of the preview environment
    name: String,

    #[arg(long, env = "OKTETO_TOKEN", hide_env_values = true)]
    token: String,

    #[arg(long, env = "OKTETO_URL")]
    url: String,

    /// Repository URL, detected from the `origin` remote when omitted
    #[arg(long, env = "REPOSITORY")]
    repository: Option<String>,

    /// Branch to deploy, detected from the checked out branch when omitted
    #[arg(long, env = "BRANCH")]
    branch: Option<String>,

    /// `global` or `personal`
    #[arg(long, env = "SCOPE")]
    scope: Option<String>,

    #[arg(long, env = "SOURCE_URL")]
    source_url: Option<String>,

    /// Manifest path relative to the repository root
    #[arg(long, env = "FILENAME")]
    filename: Option<String>,

    /// `;`-separated list of `KEY=VALUE` pairs
    #[arg(long, env = "VARIABLES", default_value = "")]
    variables: String,

    #[arg(long, default_value_t = DEFAULT_ACTION_ROUNDS)]
    action_rounds: u32,

    /// Seconds per action wait round
    #[arg(long, default_value_t = DEFAULT_ACTION_TIMEOUT_SECS)]
    action_timeout: u64,

    /// Seconds to wait for every resource to run
    #[arg(long, default_value_t = DEFAULT_RESOURCES_TIMEOUT_SECS)]
    resources_timeout: u64,

    /// Seconds between action status queries
    #[arg(
        long,
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,
}

impl Cli {
    fn deploy_inputs(&self) -> DeployInputs {
        DeployInputs {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            scope: self.scope.clone(),
            source_url: self.source_url.clone(),
            filename: self.filename.clone(),
            variables: self.variables.clone(),
            ..DeployInputs::new(&self.name)
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let action = ActionWaitConfig::default()
            .with_rounds(self.action_rounds)
            .with_round_timeout(Duration::from_secs(self.action_timeout))
            .with_poll_interval(Duration::from_secs(self.poll_interval));
        let resources =
            ResourcePollConfig::default().with_timeout(Duration::from_secs(self.resources_timeout));

        PipelineConfig::default()
            .with_action(action)
            .with_resources(resources)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!(" x {:#}", e);
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<PreviewDeployment> {
    let context = OktetoContext::new(cli.url.as_str(), cli.token.as_str())
        .map_err(|e| PreviewError::Config(e.to_string()))?;
    let client = OktetoClient::new(&context).context("Failed to create Okteto client")?;
    let vcs = GitVcs::default();
    let cwd = std::env::current_dir().context("Failed to read working directory")?;

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let deployment = PreviewPipeline::new(&context, &client, &vcs)
        .with_config(cli.pipeline_config())
        .run(&cli.deploy_inputs(), &cwd, &cancel)
        .await?;

    Ok(deployment)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PreviewError>()
        .map(PreviewError::exit_code)
        .unwrap_or(1)
}

fn cancel_on_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupted, abandoning preview deployment");
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deploy_preview=info,orchestrator=info,okteto=warn".into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_core::CoreError;
    use serde_json::json;
    use vcs::VcsError;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["deploy-preview", "--token", "tok", "--url", "https://okteto.example.com"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_missing_name_is_usage_error() {
        let err = Cli::try_parse_from([
            "deploy-preview",
            "--token",
            "tok",
            "--url",
            "https://okteto.example.com",
        ])
        .unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_tuning_flags_map_to_pipeline_config() {
        let cli = parse(&[
            "pr-42",
            "--action-rounds",
            "2",
            "--action-timeout",
            "60",
            "--resources-timeout",
            "300",
            "--poll-interval",
            "5",
        ]);
        let config = cli.pipeline_config();

        assert_eq!(config.action.rounds, 2);
        assert_eq!(config.action.round_timeout, Duration::from_secs(60));
        assert_eq!(config.action.poll_interval, Duration::from_secs(5));
        assert_eq!(config.action.total_timeout(), Duration::from_secs(120));
        assert_eq!(config.resources.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_default_tuning() {
        let cli = parse(&["pr-42"]);
        let config = cli.pipeline_config();

        assert_eq!(config.action.total_timeout(), Duration::from_secs(20 * 60));
        assert_eq!(config.resources.timeout, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_flags_map_to_deploy_inputs() {
        let cli = parse(&[
            "pr-42",
            "--branch",
            "feature",
            "--scope",
            "personal",
            "--variables",
            "A=1;B=2",
        ]);
        let inputs = cli.deploy_inputs();

        assert_eq!(inputs.name, "pr-42");
        assert_eq!(inputs.branch.as_deref(), Some("feature"));
        assert_eq!(inputs.scope.as_deref(), Some("personal"));
        assert_eq!(inputs.variables, "A=1;B=2");
    }

    #[test]
    fn test_exit_codes() {
        let config: anyhow::Error = PreviewError::Config("missing token".to_string()).into();
        assert_eq!(exit_code(&config), 2);

        let variables: anyhow::Error =
            PreviewError::from(CoreError::InvalidVariableFormat("NOPE".to_string())).into();
        assert_eq!(exit_code(&variables), 2);

        let cancelled: anyhow::Error = PreviewError::Cancelled.into();
        assert_eq!(exit_code(&cancelled), 1);

        let other = anyhow::anyhow!("Failed to read working directory");
        assert_eq!(exit_code(&other), 1);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let err = Cli::try_parse_from([
            "deploy-preview",
            "--token",
            "tok",
            "--url",
            "https://okteto.example.com",
            "--poll-interval",
            "0",
            "pr-42",
        ])
        .unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_error_chain_renders_each_cause_once() {
        let err: anyhow::Error =
            PreviewError::RepositoryResolutionFailed(VcsError::NotInitialized("/w".to_string()))
                .into();

        assert_eq!(
            format!("{:#}", err),
            "failed to resolve repository URL: Not a git repository: /w"
        );
        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_invalid_url_is_config_error() {
        let cli = Cli::try_parse_from([
            "deploy-preview",
            "--token",
            "tok",
            "--url",
            "okteto.example.com",
            "pr-42",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();

        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_run_deploys_preview() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"name": "pr-42"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "deployPreview": {
                        "id": "pr-42",
                        "action": {"id": "a1", "name": "deploy-pr-42", "status": "queued"}
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"name": "deploy-pr-42"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"action": {"id": "a1", "name": "deploy-pr-42", "status": "end"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {"id": "pr-42"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"preview": {"deployments": [{"name": "api", "status": "running"}]}}
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let cli = Cli::try_parse_from([
            "deploy-preview",
            "--token",
            "tok",
            "--url",
            uri.as_str(),
            "--repository",
            "git@host:org/repo.git",
            "--branch",
            "main",
            "pr-42",
        ])
        .unwrap();

        let deployment = run(cli).await.unwrap();

        assert!(deployment.preview_url.contains("pr-42"));
        assert_eq!(deployment.polls, 1);
    }
}
