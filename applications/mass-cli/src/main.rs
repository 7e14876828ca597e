//! mass-skill - drive the Music Assistant voice skill from a terminal

use clap::{Parser, Subcommand};
use mass_client::{display, FixtureRecorder, MassClient};
use mass_skill::{update_skill_json, MusicAssistantSkill, MusicBackend, SkillConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mass-skill")]
#[command(about = "Control Music Assistant players with voice commands", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./skill.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Music Assistant server URL
    #[arg(long, env = "MASS_MUSIC_ASSISTANT_URL", global = true)]
    url: Option<String>,

    /// Record every command and response as a JSON fixture in this directory
    #[arg(long, value_name = "DIR", global = true)]
    record_fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List players known to Music Assistant
    Players,
    /// Show the state of a player
    State {
        /// Player name or id (defaults to the configured player)
        #[arg(short, long)]
        player: Option<String>,
    },
    /// Handle a single spoken command
    Say {
        /// The utterance, e.g. "play carbon leaf in the office"
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Handle one command per line from stdin until EOF
    Listen,
    /// Regenerate skill.json from a crate's Cargo.toml
    SkillJson {
        /// Crate directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mass_skill=info,mass_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::SkillJson { dir } = &cli.command {
        return skill_json(dir);
    }

    let config = load_config(&cli)?;
    let client = Arc::new(connect(&config, &cli)?);
    let backend: Arc<dyn MusicBackend> = client.clone();
    let skill = MusicAssistantSkill::new(config, Some(backend))?;

    match cli.command {
        Commands::Players => list_players(&client).await?,
        Commands::State { player } => show_state(&skill, &client, player.as_deref()).await?,
        Commands::Say { words } => say(&skill, &client, &words.join(" ")).await?,
        Commands::Listen => listen(&skill, &client).await?,
        Commands::SkillJson { .. } => {}
    }

    if let Some(recorder) = client.recorder() {
        let stats = recorder.stats();
        tracing::info!(
            dir = %stats.fixture_dir.display(),
            fixtures = stats.fixture_count,
            "Fixture recording finished"
        );
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<SkillConfig> {
    let mut config = SkillConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.music_assistant_url.clone_from(url);
    }
    config.validate()?;
    Ok(config)
}

fn connect(config: &SkillConfig, cli: &Cli) -> anyhow::Result<MassClient> {
    let mut client = MassClient::new(config.client_config())?;
    if let Some(dir) = &cli.record_fixtures {
        let recorder = FixtureRecorder::new(dir.clone())?;
        tracing::info!(dir = %dir.display(), "Recording fixtures");
        client = client.with_recorder(recorder);
    }
    tracing::info!("Using Music Assistant at {}", client.server_url());
    Ok(client)
}

async fn list_players(client: &MassClient) -> anyhow::Result<()> {
    let players = client.get_players().await?;

    println!("Players:");
    for player in players {
        let availability = if player.available { "" } else { " (unavailable)" };
        println!(
            "  {} - {} [{}]{}",
            player.player_id,
            player.name,
            player.current_state(),
            availability
        );
    }

    Ok(())
}

async fn show_state(
    skill: &MusicAssistantSkill,
    client: &MassClient,
    player: Option<&str>,
) -> anyhow::Result<()> {
    let Some(player_id) = skill.resolve_player_id(player).await else {
        anyhow::bail!("No matching player found");
    };
    let Some(state) = client.get_player_state(&player_id).await? else {
        anyhow::bail!("Player {} disappeared", player_id);
    };

    println!("{} ({})", state.player_name, player_id);
    println!("  {}", display::status_line(&state));
    println!("  🎵 {}", state.current_track);

    Ok(())
}

async fn say(skill: &MusicAssistantSkill, client: &MassClient, utterance: &str) -> anyhow::Result<()> {
    let Some(reply) = skill.handle_utterance(utterance).await else {
        anyhow::bail!("No intent matched \"{}\"", utterance);
    };
    println!("{}", reply.text);
    log_state(skill, client, &reply.dialog).await;
    Ok(())
}

async fn listen(skill: &MusicAssistantSkill, client: &MassClient) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        match skill.handle_utterance(utterance).await {
            Some(reply) => {
                println!("{}", reply.text);
                log_state(skill, client, &reply.dialog).await;
            }
            None => println!("Sorry, I didn't understand \"{}\".", utterance),
        }
    }

    Ok(())
}

/// Log the targeted player's state after a command.
async fn log_state(skill: &MusicAssistantSkill, client: &MassClient, action: &str) {
    if let Some(player_id) = skill.last_player().await {
        client.show_current_state(&player_id, action).await;
    }
}

fn skill_json(dir: &Path) -> anyhow::Result<()> {
    if update_skill_json(dir)? {
        println!("Skill updated. Wrote {}", dir.join(mass_skill::MANIFEST_FILE).display());
    } else {
        println!("No changes to skill.json");
    }
    Ok(())
}
