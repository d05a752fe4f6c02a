/// Cadence - local music playback from the command line
use cadence_cli::{Action, Cli, CliConfig, Command, Session, ShellLine};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    tracing::debug!("Database: {}", config.storage.database_url);
    tracing::debug!("Catalog: {}", config.library.catalog_path.display());

    let mut session = Session::open(&config).await?;

    match cli.command {
        Command::Action(action) => run_once(&mut session, action).await?,
        Command::Shell => shell(&mut session).await?,
    }

    Ok(())
}

async fn run_once(session: &mut Session, action: Action) -> anyhow::Result<()> {
    let save = action.mutates_state();
    let output = session.execute(action).await?;
    if save {
        session.save().await?;
    }
    println!("{output}");
    Ok(())
}

async fn shell(session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        let action = match ShellLine::parse_line(&line) {
            None => continue,
            Some(Ok(action)) => action,
            Some(Err(e)) => {
                stdout.write_all(e.render().to_string().as_bytes()).await?;
                continue;
            }
        };

        let save = action.mutates_state();
        let output = match session.execute(action).await {
            Ok(output) => output,
            Err(e) => format!("error: {e}"),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        if save {
            if let Err(e) = session.save().await {
                tracing::error!("Failed to save playback state: {}", e);
            }
        }
    }

    session.save().await?;
    Ok(())
}
