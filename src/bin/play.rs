use anyhow::{Context, Result};
use chrono::Local;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use phonedle_core::assets::{load_dictionary, AssetManifest, FsAssetFetcher};
use phonedle_core::core::game::{GameStatus, Transition};
use phonedle_core::core::phoneme::{Layout, CONSONANTS_LAYOUT, VOWELS_LAYOUT};
use phonedle_core::persistence::{FileCacheStore, ProgressStore};
use phonedle_core::{GameConfig, MatchType, Phoneme, Session};
use std::io::{stdin, stdout, Stdout, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GameConfig::load_or_default(config_path.as_deref()).context("Failed to load config")?;

    let manifest = AssetManifest::load(&config.manifest).context("Failed to load asset manifest")?;
    let asset_root = config.manifest.parent().unwrap_or_else(|| Path::new("."));
    let fetcher = FsAssetFetcher::new(asset_root);
    let mut cache = FileCacheStore::new(config.cache_dir());
    let dictionary = load_dictionary(&fetcher, &mut cache, &manifest).context("Failed to load dictionary")?;

    let progress = ProgressStore::in_dir(&config.data_dir);
    let mut session = Session::start_daily(dictionary, config, Some(progress), Local::now().date_naive())?;
    let mut rng = rand::thread_rng();
    let mut out = stdout();

    loop {
        draw(&mut out, &session)?;

        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "exit" => break,
            ":n" => session.select_next(),
            ":p" => session.select_previous(),
            ":new" => session.new_random(&mut rng)?,
            "" => {
                if let Transition::Committed { status, .. } = session.commit()? {
                    if status.is_over() {
                        draw(&mut out, &session)?;
                        print_result(&mut out, &session)?;
                        break;
                    }
                }
            }
            word => session.type_word(word),
        }
    }
    Ok(())
}

fn cell_color(status: MatchType) -> Color {
    match status {
        MatchType::Match => Color::DarkGreen,
        MatchType::SomeMatch => Color::DarkYellow,
        MatchType::NoMatch => Color::DarkGrey,
        MatchType::Unknown => Color::Reset,
    }
}

fn print_cell(out: &mut Stdout, phoneme: Phoneme, status: MatchType) -> Result<()> {
    queue!(
        out,
        SetForegroundColor(Color::White),
        SetBackgroundColor(cell_color(status)),
        Print(format!(" {:^4}", phoneme.key())),
        ResetColor,
        Print(" ")
    )?;
    Ok(())
}

fn print_layout(out: &mut Stdout, session: &Session, layout: Layout) -> Result<()> {
    for row in layout.iter() {
        for &phoneme in row.iter() {
            print_cell(out, phoneme, session.keyboard_status(phoneme))?;
        }
        queue!(out, Print("\n"))?;
    }
    Ok(())
}

fn draw(out: &mut Stdout, session: &Session) -> Result<()> {
    let game = session.game();
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(out, Print("Phonedle. Type a word, [Enter] to guess, ':n'/':p' to switch pronunciation, ':new' for a random puzzle, 'exit' to quit.\n\n"))?;

    for (entry, row) in game.history().iter().zip(game.matcher().all_matches()) {
        for (&phoneme, &status) in entry.transcript.iter().zip(row) {
            print_cell(out, phoneme, status)?;
        }
        queue!(out, Print(format!("  {}\n", entry.word)))?;
    }

    if !game.status().is_over() {
        for cell in session.preview() {
            let status = if cell.invalid { MatchType::Unknown } else { cell.status };
            print_cell(out, cell.phoneme, status)?;
        }
        queue!(out, Print(format!("  [{}]\n", session.typed())))?;

        if session.choices().len() > 1 {
            let listed: Vec<String> = session
                .choices()
                .iter()
                .map(|t| match session.selected() {
                    Some(selected) if selected == t => format!("<{t}>"),
                    _ => t.to_string(),
                })
                .collect();
            queue!(out, Print(format!("Pronunciations: {}\n", listed.join(" | "))))?;
        }
        if !session.typed().is_empty() {
            if let Err(reason) = session.validity() {
                queue!(out, Print(format!("Can't guess: {reason:?}\n")))?;
            }
        }
        queue!(out, Print(format!("\n{} tries left\n\n", game.tries_left())))?;
    }

    print_layout(out, session, CONSONANTS_LAYOUT)?;
    queue!(out, Print("\n"))?;
    print_layout(out, session, VOWELS_LAYOUT)?;
    execute!(out, Print("\n> "))?;
    out.flush()?;
    Ok(())
}

fn print_result(out: &mut Stdout, session: &Session) -> Result<()> {
    let answer = session.game().answer();
    let message = match session.game().status() {
        GameStatus::Won => format!("\nSolved in {} tries!", session.game().history().len()),
        _ => "\nOut of tries.".to_string(),
    };
    execute!(
        out,
        Print(message),
        Print(format!("\nThe answer was /{}/ ({})\n", answer.transcript, answer.words.join(", ")))
    )?;
    Ok(())
}
