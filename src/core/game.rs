// File: src/core/game.rs
use crate::core::answer::Answer;
use crate::core::dictionary::Dictionary;
use crate::core::matcher::{MatchType, Matcher};
use crate::core::transcript::{Transcript, Word};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_TRIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// A committed guess: the transcript that was scored and the word typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transcript: Transcript,
    pub word: Word,
}

/// Why the current input cannot be submitted. Recomputed on every keystroke
/// and shown as a hint, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInputReason {
    Empty,
    TooShort,
    TooLong,
    GameOver,
    NotInWordList,
}

/// Everything a front-end may ask the game to do.
#[derive(Debug, Clone)]
pub enum Action {
    /// Starts over with a new answer.
    Reset { answer: Answer, max_tries: usize },
    /// Replaces the uncommitted candidate.
    Input { word: Word, transcript: Transcript },
    /// Commits the current candidate as a guess.
    Commit,
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Reset,
    InputChanged,
    Committed { row: Vec<MatchType>, status: GameStatus },
    /// The action had no effect (terminal state or wrong input length).
    Ignored,
}

/// Receives the whole history after every committed guess, e.g. to cache
/// the progress of a daily puzzle.
pub trait ProgressObserver {
    fn history_changed(&mut self, answer: &Answer, history: &[HistoryEntry]);
}

/// Turn-by-turn state of one puzzle.
pub struct Game {
    answer: Answer,
    max_tries: usize,
    history: Vec<HistoryEntry>,
    input: Option<HistoryEntry>,
    status: GameStatus,
    matcher: Matcher,
    observer: Option<Box<dyn ProgressObserver>>,
}

impl Game {
    pub fn new(answer: Answer, max_tries: usize) -> Result<Self, GameError> {
        if max_tries == 0 {
            return Err(GameError::NoTries);
        }
        let matcher = Matcher::new(answer.transcript.clone());
        Ok(Self {
            answer,
            max_tries,
            history: Vec::new(),
            input: None,
            status: GameStatus::InProgress,
            matcher,
            observer: None,
        })
    }

    /// Rebuilds a game from a previously saved history.
    pub fn resume(answer: Answer, max_tries: usize, history: Vec<HistoryEntry>) -> Result<Self, GameError> {
        let mut game = Self::new(answer, max_tries)?;
        for entry in history {
            game.record(entry)?;
            if game.status.is_over() {
                break;
            }
        }
        Ok(game)
    }

    pub fn set_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observer = Some(observer);
    }

    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    pub fn max_tries(&self) -> usize {
        self.max_tries
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn input(&self) -> Option<&HistoryEntry> {
        self.input.as_ref()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn tries_left(&self) -> usize {
        self.max_tries.saturating_sub(self.history.len())
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Transition, GameError> {
        match action {
            Action::Reset { answer, max_tries } => {
                self.reset(answer, max_tries)?;
                Ok(Transition::Reset)
            }
            Action::Input { word, transcript } => Ok(self.set_input(word, transcript)),
            Action::Commit => self.commit(),
        }
    }

    /// Clears the history and starts a new puzzle, whatever the prior state.
    pub fn reset(&mut self, answer: Answer, max_tries: usize) -> Result<(), GameError> {
        if max_tries == 0 {
            return Err(GameError::NoTries);
        }
        info!(kind = ?answer.kind, length = answer.len(), max_tries, "New puzzle");
        self.matcher = Matcher::new(answer.transcript.clone());
        self.answer = answer;
        self.max_tries = max_tries;
        self.history.clear();
        self.input = None;
        self.status = GameStatus::InProgress;
        Ok(())
    }

    pub fn set_input(&mut self, word: Word, transcript: Transcript) -> Transition {
        if self.status.is_over() {
            return Transition::Ignored;
        }
        self.input = Some(HistoryEntry { transcript, word });
        Transition::InputChanged
    }

    pub fn clear_input(&mut self) {
        self.input = None;
    }

    /// Commits the current input if the game is running and the input has
    /// exactly the answer's length; otherwise does nothing.
    pub fn commit(&mut self) -> Result<Transition, GameError> {
        if self.status.is_over() {
            return Ok(Transition::Ignored);
        }
        let expected = self.answer.len();
        match &self.input {
            Some(entry) if entry.transcript.len() == expected => {}
            Some(entry) => {
                warn!(
                    length = entry.transcript.len(),
                    expected, "Ignoring commit of input with the wrong length"
                );
                return Ok(Transition::Ignored);
            }
            None => return Ok(Transition::Ignored),
        }
        let Some(entry) = self.input.take() else {
            return Ok(Transition::Ignored);
        };

        let row = self.record(entry)?;
        debug!(tries = self.history.len(), status = ?self.status, "Guess committed");

        if let Some(observer) = self.observer.as_mut() {
            observer.history_changed(&self.answer, &self.history);
        }

        Ok(Transition::Committed {
            row,
            status: self.status,
        })
    }

    fn record(&mut self, entry: HistoryEntry) -> Result<Vec<MatchType>, GameError> {
        let row = self.matcher.push(&entry.transcript)?.to_vec();
        self.history.push(entry);
        if Matcher::is_all_match(&row) {
            self.status = GameStatus::Won;
        } else if self.history.len() >= self.max_tries {
            self.status = GameStatus::Lost;
        }
        Ok(row)
    }

    /// Classifies a candidate guess. `transcript` is the pronunciation the
    /// player picked for `word`, if the word has any.
    pub fn check_input(
        &self,
        dictionary: &Dictionary,
        word: &str,
        transcript: Option<&Transcript>,
    ) -> Result<(), InvalidInputReason> {
        if word.trim().is_empty() {
            return Err(InvalidInputReason::Empty);
        }
        if self.status.is_over() {
            return Err(InvalidInputReason::GameOver);
        }
        let transcript = match transcript {
            Some(t) if dictionary.has_word(word) => t,
            _ => return Err(InvalidInputReason::NotInWordList),
        };
        let expected = self.answer.len();
        if transcript.len() < expected {
            Err(InvalidInputReason::TooShort)
        } else if transcript.len() > expected {
            Err(InvalidInputReason::TooLong)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::answer::AnswerKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn t(raw: &str) -> Transcript {
        Transcript::parse(raw).unwrap()
    }

    fn cat_game(max_tries: usize) -> Game {
        Game::new(Answer::custom(t("k aa t"), vec!["cat".into()]), max_tries).unwrap()
    }

    fn guess(game: &mut Game, word: &str, raw: &str) -> Transition {
        game.dispatch(Action::Input {
            word: word.into(),
            transcript: t(raw),
        })
        .unwrap();
        game.dispatch(Action::Commit).unwrap()
    }

    #[test]
    fn winning_guess_ends_the_game() {
        let mut game = cat_game(6);
        let first = guess(&mut game, "bat", "b aa t");
        assert_eq!(
            first,
            Transition::Committed {
                row: vec![MatchType::NoMatch, MatchType::Match, MatchType::Match],
                status: GameStatus::InProgress,
            }
        );
        let second = guess(&mut game, "cat", "k aa t");
        assert!(matches!(second, Transition::Committed { status: GameStatus::Won, .. }));
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.history().len(), 2);
        assert!(game.input().is_none());
    }

    #[test]
    fn running_out_of_tries_loses() {
        let mut game = cat_game(6);
        for _ in 0..5 {
            guess(&mut game, "bat", "b aa t");
            assert_eq!(game.status(), GameStatus::InProgress);
        }
        guess(&mut game, "bat", "b aa t");
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.tries_left(), 0);
    }

    #[test]
    fn terminal_state_ignores_further_actions() {
        let mut game = cat_game(1);
        guess(&mut game, "cat", "k aa t");
        assert_eq!(game.status(), GameStatus::Won);
        let transition = game
            .dispatch(Action::Input {
                word: "bat".into(),
                transcript: t("b aa t"),
            })
            .unwrap();
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(game.dispatch(Action::Commit).unwrap(), Transition::Ignored);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn wrong_length_commit_is_a_no_op() {
        let mut game = cat_game(6);
        assert_eq!(guess(&mut game, "cats", "k aa t s"), Transition::Ignored);
        assert_eq!(game.dispatch(Action::Commit).unwrap(), Transition::Ignored);
        assert!(game.history().is_empty());
        assert!(game.input().is_some());
    }

    #[test]
    fn reset_clears_everything() {
        let mut game = cat_game(1);
        guess(&mut game, "bat", "b aa t");
        assert_eq!(game.status(), GameStatus::Lost);
        let answer = Answer::custom(t("d awe g"), vec!["dog".into()]);
        game.dispatch(Action::Reset { answer, max_tries: 3 }).unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.history().is_empty());
        assert!(game.matcher().all_matches().is_empty());
        assert_eq!(game.max_tries(), 3);
        assert_eq!(game.answer().kind, AnswerKind::Custom);
    }

    #[test]
    fn zero_tries_is_rejected() {
        let answer = Answer::custom(t("k aa t"), vec![]);
        assert_eq!(Game::new(answer, 0).err(), Some(GameError::NoTries));
    }

    #[test]
    fn resume_replays_history() {
        let history = vec![
            HistoryEntry { transcript: t("b aa t"), word: "bat".into() },
            HistoryEntry { transcript: t("k aa t"), word: "cat".into() },
        ];
        let game = Game::resume(Answer::custom(t("k aa t"), vec![]), 6, history).unwrap();
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.matcher().all_matches().len(), 2);
    }

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl ProgressObserver for Recorder {
        fn history_changed(&mut self, _answer: &Answer, history: &[HistoryEntry]) {
            self.0.borrow_mut().push(history.len());
        }
    }

    #[test]
    fn observer_sees_every_commit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut game = cat_game(6);
        game.set_observer(Box::new(Recorder(Rc::clone(&seen))));
        guess(&mut game, "bat", "b aa t");
        guess(&mut game, "cats", "k aa t s");
        guess(&mut game, "cat", "k aa t");
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn input_validation() {
        let dict = Dictionary::from_json(
            r#"{"cat": ["k aa t"], "cats": ["k aa t s"], "a": ["uh"]}"#,
            None,
        )
        .unwrap();
        let game = cat_game(6);
        let cat = t("k aa t");
        let cats = t("k aa t s");
        let a = t("uh");
        assert_eq!(game.check_input(&dict, "  ", None), Err(InvalidInputReason::Empty));
        assert_eq!(game.check_input(&dict, "dog", None), Err(InvalidInputReason::NotInWordList));
        assert_eq!(game.check_input(&dict, "a", Some(&a)), Err(InvalidInputReason::TooShort));
        assert_eq!(game.check_input(&dict, "cats", Some(&cats)), Err(InvalidInputReason::TooLong));
        assert_eq!(game.check_input(&dict, "Cat", Some(&cat)), Ok(()));

        let mut over = cat_game(1);
        guess(&mut over, "cat", "k aa t");
        assert_eq!(over.check_input(&dict, "cat", Some(&cat)), Err(InvalidInputReason::GameOver));
    }
}
