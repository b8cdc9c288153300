// File: src/core/session.rs
use crate::config::GameConfig;
use crate::core::answer::{answer_for_date, answer_for_random_draw, Answer};
use crate::core::dictionary::{normalize_word, Dictionary};
use crate::core::game::{Action, Game, InvalidInputReason, Transition};
use crate::core::matcher::{MatchType, PreviewCell};
use crate::core::phoneme::Phoneme;
use crate::core::transcript::Transcript;
use crate::error::SessionResult;
use crate::persistence::{ProgressCache, ProgressStore};
use chrono::NaiveDate;
use rand::Rng;
use tracing::{info, warn};

/// What a front-end talks to: the dictionary, the running game and the
/// pronunciation picker for the word being typed.
pub struct Session {
    config: GameConfig,
    dictionary: Dictionary,
    game: Game,
    progress: Option<ProgressStore>,
    typed: String,
    /// Pronunciations of `typed`, those of the puzzle length first.
    choices: Vec<Transcript>,
    selected: usize,
}

impl Session {
    fn with_game(config: GameConfig, dictionary: Dictionary, game: Game, progress: Option<ProgressStore>) -> Self {
        Self {
            config,
            dictionary,
            game,
            progress,
            typed: String::new(),
            choices: Vec::new(),
            selected: 0,
        }
    }

    /// Starts the puzzle of `date`, resuming saved progress for that same day
    /// when a progress store is given. Progress is saved after every guess.
    pub fn start_daily(
        dictionary: Dictionary,
        config: GameConfig,
        progress: Option<ProgressStore>,
        date: NaiveDate,
    ) -> SessionResult<Self> {
        let answer = answer_for_date(&dictionary, config.columns, date)?;
        let game = Self::daily_game(answer, config.max_tries, progress.as_ref())?;
        info!(%date, index = ?game.answer().index, restored = game.history().len(), "Daily session started");
        Ok(Self::with_game(config, dictionary, game, progress))
    }

    /// Starts a random puzzle. Random puzzles are never saved.
    pub fn start_random<R: Rng + ?Sized>(
        dictionary: Dictionary,
        config: GameConfig,
        rng: &mut R,
    ) -> SessionResult<Self> {
        let answer = answer_for_random_draw(&dictionary, config.columns, rng)?;
        let game = Game::new(answer, config.max_tries)?;
        Ok(Self::with_game(config, dictionary, game, None))
    }

    fn daily_game(answer: Answer, max_tries: usize, progress: Option<&ProgressStore>) -> SessionResult<Game> {
        let Some(store) = progress else {
            return Ok(Game::new(answer, max_tries)?);
        };
        let history = store.restore_daily(&answer);
        let mut game = match Game::resume(answer.clone(), max_tries, history) {
            Ok(game) => game,
            Err(e) => {
                warn!(error = %e, index = ?answer.index, "Saved guesses do not fit today's puzzle, starting over");
                store.reset_daily(&answer);
                Game::new(answer, max_tries)?
            }
        };
        game.set_observer(Box::new(ProgressCache::new(store.clone())));
        Ok(game)
    }

    /// Replaces the current puzzle with a random one of the configured length.
    pub fn new_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SessionResult<()> {
        let answer = answer_for_random_draw(&self.dictionary, self.config.columns, rng)?;
        if self.progress.take().is_some() {
            // Keep the saved daily record intact.
            self.game = Game::new(answer, self.config.max_tries)?;
        } else {
            self.game.dispatch(Action::Reset {
                answer,
                max_tries: self.config.max_tries,
            })?;
        }
        self.clear_typed();
        Ok(())
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn choices(&self) -> &[Transcript] {
        &self.choices
    }

    pub fn selected(&self) -> Option<&Transcript> {
        self.choices.get(self.selected)
    }

    /// Replaces the word being typed and picks its first pronunciation.
    pub fn type_word(&mut self, word: &str) {
        self.typed = word.to_string();
        let length = self.game.answer().len();
        let mut choices = self.dictionary.transcripts_for_word(word).to_vec();
        choices.sort_by_key(|t| t.len() != length);
        self.choices = choices;
        self.selected = 0;
        self.sync_input();
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.choices.len() {
            self.selected += 1;
            self.sync_input();
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.sync_input();
        }
    }

    fn sync_input(&mut self) {
        match self.choices.get(self.selected) {
            Some(transcript) => {
                // A finished game ignores input.
                self.game.set_input(normalize_word(&self.typed), transcript.clone());
            }
            None => self.game.clear_input(),
        }
    }

    fn clear_typed(&mut self) {
        self.typed.clear();
        self.choices.clear();
        self.selected = 0;
        self.game.clear_input();
    }

    pub fn validity(&self) -> Result<(), InvalidInputReason> {
        self.game.check_input(&self.dictionary, &self.typed, self.selected())
    }

    /// Commits the typed word if it is a valid guess.
    pub fn commit(&mut self) -> SessionResult<Transition> {
        if self.validity().is_err() {
            return Ok(Transition::Ignored);
        }
        let transition = self.game.dispatch(Action::Commit)?;
        if matches!(transition, Transition::Committed { .. }) {
            self.clear_typed();
        }
        Ok(transition)
    }

    pub fn preview(&self) -> Vec<PreviewCell> {
        self.selected()
            .map(|t| self.game.matcher().preview(t))
            .unwrap_or_default()
    }

    /// Best known status of `phoneme`, for keyboard hints.
    pub fn keyboard_status(&self, phoneme: Phoneme) -> MatchType {
        self.game.matcher().best_for_phoneme(phoneme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::answer::day_index;
    use crate::core::game::{GameStatus, HistoryEntry};
    use crate::persistence::SavedProgress;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DICT: &str = r#"{
        "cat": ["k aa t"],
        "bat": ["b aa t"],
        "either": ["ee dh er", "eye dh er", "ee dh uh r"],
        "cats": ["k aa t s"]
    }"#;

    fn config() -> GameConfig {
        GameConfig {
            columns: 3,
            ..GameConfig::default()
        }
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_json(DICT, Some(r#"[["cat", ["k aa t"]]]"#)).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn puzzle_length_pronunciations_come_first() {
        let mut session = Session::start_daily(dictionary(), config(), None, today()).unwrap();
        session.type_word("either");
        let choices: Vec<String> = session.choices().iter().map(ToString::to_string).collect();
        assert_eq!(choices, vec!["ee dh er", "eye dh er", "ee dh uh r"]);
        assert_eq!(session.validity(), Ok(()));
    }

    #[test]
    fn selection_is_clamped() {
        let mut session = Session::start_daily(dictionary(), config(), None, today()).unwrap();
        session.type_word("either");
        session.select_previous();
        assert_eq!(session.selected().unwrap().to_string(), "ee dh er");
        session.select_next();
        session.select_next();
        session.select_next();
        assert_eq!(session.selected().unwrap().to_string(), "ee dh uh r");
        assert_eq!(session.validity(), Err(InvalidInputReason::TooLong));
        assert_eq!(session.commit().unwrap(), Transition::Ignored);
        session.select_previous();
        assert_eq!(session.game().input().unwrap().transcript.to_string(), "eye dh er");
    }

    #[test]
    fn unknown_words_cannot_be_committed() {
        let mut session = Session::start_daily(dictionary(), config(), None, today()).unwrap();
        session.type_word("dog");
        assert!(session.choices().is_empty());
        assert_eq!(session.validity(), Err(InvalidInputReason::NotInWordList));
        assert_eq!(session.commit().unwrap(), Transition::Ignored);
        assert!(session.preview().is_empty());
    }

    #[test]
    fn commit_scores_and_clears_the_input() {
        let mut session = Session::start_daily(dictionary(), config(), None, today()).unwrap();
        assert_eq!(session.game().answer().index, Some(day_index(today())));
        session.type_word("bat");
        let transition = session.commit().unwrap();
        assert!(matches!(transition, Transition::Committed { status: GameStatus::InProgress, .. }));
        assert!(session.typed().is_empty());
        assert_eq!(session.keyboard_status(Phoneme::B), MatchType::NoMatch);
        assert_eq!(session.keyboard_status(Phoneme::T), MatchType::Match);

        session.type_word("CAT");
        session.commit().unwrap();
        assert_eq!(session.game().status(), GameStatus::Won);
        assert_eq!(session.game().history()[1].word, "cat");
    }

    #[test]
    fn unplayable_saved_guesses_start_the_day_over() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        let answer = answer_for_date(&dictionary(), 3, today()).unwrap();
        store
            .save(&SavedProgress {
                answer: answer.clone(),
                history: vec![HistoryEntry {
                    transcript: Transcript::parse("uh").unwrap(),
                    word: "a".into(),
                }],
            })
            .unwrap();

        let session = Session::start_daily(dictionary(), config(), Some(store.clone()), today()).unwrap();
        assert!(session.game().history().is_empty());
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.answer, answer);
        assert!(saved.history.is_empty());
    }

    #[test]
    fn random_puzzles_restart_in_place() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = Session::start_random(dictionary(), config(), &mut rng).unwrap();
        session.type_word("bat");
        session.commit().unwrap();
        session.new_random(&mut rng).unwrap();
        assert!(session.game().history().is_empty());
        assert_eq!(session.game().answer().words, vec!["cat".to_string()]);
    }
}
