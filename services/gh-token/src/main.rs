//! Command line frontend for GitHub App installation tokens.

use std::io;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gh_token::{
    AppConfig, GenerateConfig, Generated, GithubClient, InstallationToken, RevokeConfig, Secret,
    DEFAULT_HOST,
};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "gh-token", version, about = "Manage GitHub App installation tokens")]
struct Cli {
    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Console)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Console,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an installation access token
    Generate(GenerateArgs),

    /// List the installations of the App
    Installations(AppArgs),

    /// Revoke an installation access token
    Revoke(RevokeArgs),
}

#[derive(Debug, Args)]
struct AppArgs {
    /// GitHub App ID
    #[arg(short = 'a', long, env = "GH_TOKEN_APP_ID")]
    app_id: String,

    /// Path to the App's PEM private key
    #[arg(short = 'k', long = "key", env = "GH_TOKEN_KEY")]
    key: Option<Utf8PathBuf>,

    /// Base64 encoded PEM private key
    #[arg(
        short = 'b',
        long = "base64-key",
        env = "GH_TOKEN_BASE64_KEY",
        hide_env_values = true
    )]
    base64_key: Option<Secret>,

    /// API hostname, e.g. a GitHub Enterprise Server host
    #[arg(short = 'o', long, env = "GH_TOKEN_HOSTNAME", default_value = DEFAULT_HOST)]
    hostname: String,
}

impl AppArgs {
    fn config(&self) -> AppConfig {
        AppConfig {
            app_id: self.app_id.clone(),
            key_file: self.key.clone(),
            key_base64: self.base64_key.clone(),
            hostname: self.hostname.clone(),
        }
    }
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    app: AppArgs,

    /// Installation ID, defaults to the App's first installation
    #[arg(short = 'i', long, env = "GH_TOKEN_INSTALLATION_ID")]
    installation_id: Option<u64>,

    /// Print only the token instead of the full JSON record
    #[arg(short = 't', long)]
    token_only: bool,

    /// Print the App JWT and stop
    #[arg(short = 'j', long)]
    jwt: bool,

    /// JWT lifetime in minutes (1 to 10)
    #[arg(short = 'e', long, default_value_t = 1, allow_negative_numbers = true)]
    jwt_expiry: i64,

    /// Print nothing on success
    #[arg(short = 's', long)]
    silent: bool,
}

#[derive(Debug, Args)]
struct RevokeArgs {
    /// Installation token to revoke
    #[arg(short = 't', long, env = "GH_TOKEN_TOKEN", hide_env_values = true)]
    token: InstallationToken,

    /// API hostname, e.g. a GitHub Enterprise Server host
    #[arg(short = 'o', long, env = "GH_TOKEN_HOSTNAME", default_value = DEFAULT_HOST)]
    hostname: String,

    /// Print nothing on success
    #[arg(short = 's', long)]
    silent: bool,
}

fn init_tracing(level: &str, format: LogFormat) -> eyre::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
    }

    Ok(())
}

async fn generate(client: &GithubClient, args: GenerateArgs) -> eyre::Result<()> {
    let config = GenerateConfig {
        app: args.app.config(),
        installation_id: args.installation_id,
        jwt_expiry_minutes: args.jwt_expiry,
        jwt_only: args.jwt,
    };

    let generated = client.generate_token(&config).await?;
    if args.silent {
        return Ok(());
    }

    match generated {
        Generated::Jwt(jwt) => println!("{}", jwt.revealed()),
        Generated::Installation(access) if args.token_only => {
            println!("{}", access.token.revealed())
        }
        Generated::Installation(access) => {
            println!("{}", serde_json::to_string_pretty(&access)?)
        }
    }

    Ok(())
}

async fn installations(client: &GithubClient, args: AppArgs) -> eyre::Result<()> {
    let installations = client.list_installations(&args.config()).await?;
    println!("{}", serde_json::to_string_pretty(&installations)?);
    Ok(())
}

async fn revoke(client: &GithubClient, args: RevokeArgs) -> eyre::Result<()> {
    let config = RevokeConfig {
        token: args.token,
        hostname: args.hostname,
    };

    client.revoke_token(&config).await?;
    if !args.silent {
        println!("Successfully revoked installation token");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let client = GithubClient::new();
    match cli.command {
        Command::Generate(args) => generate(&client, args).await,
        Command::Installations(args) => installations(&client, args).await,
        Command::Revoke(args) => revoke(&client, args).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags() {
        let cli = Cli::try_parse_from([
            "gh-token", "generate", "-a", "123456", "-k", "app-key.pem", "-i", "12345", "-e",
            "5", "-t",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.app.app_id, "123456");
        assert_eq!(args.app.key.as_ref().map(|key| key.as_str()), Some("app-key.pem"));
        assert_eq!(args.app.hostname, "api.github.com");
        assert_eq!(args.installation_id, Some(12345));
        assert_eq!(args.jwt_expiry, 5);
        assert!(args.token_only);
        assert!(!args.jwt);
        assert!(!args.silent);
    }

    #[test]
    fn revoke_flags() {
        let cli = Cli::try_parse_from([
            "gh-token",
            "--log-format",
            "json",
            "revoke",
            "--token",
            "ghs_abc",
            "--hostname",
            "ghe.example.com",
            "-s",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Revoke(args) = cli.command else {
            panic!("expected revoke");
        };
        assert_eq!(args.token.revealed(), "ghs_abc");
        assert_eq!(args.hostname, "ghe.example.com");
        assert!(args.silent);
    }
}
