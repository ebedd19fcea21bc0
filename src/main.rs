use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tictactoe_engine::engine::bot_profiles::{load_default_profiles, load_profiles, BotProfilesFile};
use tictactoe_engine::engine::leaderboard::Leaderboard;
use tictactoe_engine::engine::policy::{Difficulty, MoveProbabilities};
use tictactoe_engine::engine::session::GameSession;
use tictactoe_engine::games::tictactoe::{Move, BOARD_SIZE};

#[derive(Parser)]
#[command(name = "tictactoe-engine", about = "Play tic-tac-toe against a minimax bot")]
struct Cli {
    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, global = true, env = "TICTACTOE_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play interactive games in the terminal
    Play {
        /// easy, medium or hard
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,

        /// Name recorded on the leaderboard
        #[arg(short, long, default_value = "Player")]
        name: String,

        /// Seed for the bot's RNG and the first-player coin flip
        #[arg(long)]
        seed: Option<u64>,

        /// Override the bot's thinking pause (ms)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Show the bot's move probabilities before it commits
        #[arg(long)]
        hints: bool,
    },
    /// Show or clear the leaderboard
    Leaderboard {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut profiles = match &cli.profiles {
        Some(path) => load_profiles(path).map_err(|e| format!("Failed to load profiles: {}", e))?,
        None => load_default_profiles(),
    };
    let leaderboard = Leaderboard::open(
        profiles.settings.leaderboard_path.clone(),
        profiles.settings.leaderboard_max,
    );

    match cli.command {
        Command::Leaderboard { clear } => {
            let mut leaderboard = leaderboard;
            if clear {
                leaderboard.clear();
                println!("Leaderboard cleared.");
            } else {
                print_leaderboard(&leaderboard);
            }
        }
        Command::Play { difficulty, name, seed, delay_ms, hints } => {
            if let Some(ms) = delay_ms {
                profiles.settings.thinking_delay_ms = ms;
            }
            play(profiles, leaderboard, difficulty, &name, seed, hints).await?;
        }
    }
    Ok(())
}

async fn play(
    profiles: BotProfilesFile,
    mut leaderboard: Leaderboard,
    difficulty: Difficulty,
    name: &str,
    seed: Option<u64>,
    hints: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = GameSession::new(profiles.policy(difficulty), &profiles.settings, seed);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Difficulty: {}. Enter moves as `row col` (0-2). `q` resigns.", difficulty);
    loop {
        println!(
            "\nYou play {}. {} moves first.",
            session.human_side(),
            if session.is_human_turn() { "You" } else { "The bot" }
        );

        while session.is_running() {
            if session.is_human_turn() {
                println!("\n{}", session.board());
                print_prompt("Your move> ");
                let line = tokio::select! {
                    line = lines.next_line() => line?,
                    _ = tokio::signal::ctrl_c() => {
                        session.resign();
                        continue;
                    }
                };
                let Some(line) = line else {
                    session.resign();
                    break;
                };
                let input = line.trim();
                if matches!(input, "q" | "quit" | "resign") {
                    session.resign();
                    continue;
                }
                match parse_move(input) {
                    Some(mv) => {
                        if let Err(e) = session.human_move(mv) {
                            println!("Rejected: {}", e);
                        }
                    }
                    None => println!("Expected `row col`, e.g. `1 1`."),
                }
            } else {
                let pending = session.prepare_opponent_turn()?;
                if hints {
                    print_hints(&pending.hints);
                }
                println!("Bot is thinking... (Ctrl-C resigns)");

                let handle = session.resign_handle();
                let watcher = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        handle.resign();
                    }
                });
                let delay = session.thinking_delay();
                let result = session.complete_opponent_turn(pending, delay).await;
                watcher.abort();

                if result?.is_some() {
                    println!("Bot played.");
                }
            }
        }

        println!("\n{}", session.board());
        if let Some(summary) = session.summary() {
            println!("\n{}", summary);
            match leaderboard.add_entry(name, summary.session_score) {
                Some(rank) => println!("Leaderboard rank: #{}", rank + 1),
                None => println!("Not enough for the leaderboard this time."),
            }
        }
        let tally = session.tally();
        println!("Wins {} / Draws {} / Losses {}", tally.wins, tally.draws, tally.losses);

        print_prompt("Play again? [y/N] ");
        let again = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        match again.as_deref().map(str::trim) {
            Some("y") | Some("yes") => session.start_game(),
            _ => break,
        }
    }
    Ok(())
}

fn parse_move(input: &str) -> Option<Move> {
    let mut parts = input.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Move::new(row, col))
}

fn print_prompt(prompt: &str) {
    use std::io::Write;
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}

fn print_hints(hints: &MoveProbabilities) {
    println!("Bot move probabilities:");
    for row in 0..BOARD_SIZE {
        let cells: Vec<String> = (0..BOARD_SIZE)
            .map(|col| match hints.probability_at(Move::new(row, col)) {
                Some(p) => format!("{:5.1}%", p * 100.0),
                None => "   -  ".to_string(),
            })
            .collect();
        println!("  {}", cells.join(" "));
    }
}

fn print_leaderboard(leaderboard: &Leaderboard) {
    if leaderboard.is_empty() {
        println!("Leaderboard is empty.");
        return;
    }
    println!("{:>3}  {:<16} {:>6}  {}", "#", "Name", "Score", "Date");
    for (i, entry) in leaderboard.entries().iter().enumerate() {
        println!("{:>3}  {:<16} {:>6.2}  {}", i + 1, entry.name, entry.score, entry.date);
    }
}
