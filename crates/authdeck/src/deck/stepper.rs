//! Generic step engine shared by every slide, and the controller the
//! presenter drives it through.

use std::time::Duration;

use super::{Action, Deck, Slide, StepDef, StepView};
use crate::tokens::TokenWallet;

/// Cursor over a slide's ordered steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepper {
    index: usize,
    len: usize,
}

impl Stepper {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump to `index`, clamped to the last step.
    pub fn jump(&mut self, index: usize) -> bool {
        let target = index.min(self.len.saturating_sub(1));
        let moved = target != self.index;
        self.index = target;
        moved
    }
}

fn apply(actions: &[Action], wallet: &mut TokenWallet, mut toasts: Option<&mut Vec<String>>) {
    for action in actions {
        match action {
            Action::IssueToken(kind) => {
                wallet.issue(*kind);
            }
            Action::RevokeTokens => wallet.revoke_all(),
            Action::Toast(text) => {
                if let Some(out) = toasts.as_deref_mut() {
                    out.push(text.clone());
                }
            }
        }
    }
}

/// Token state after walking `slide` from its first step to `index`.
///
/// Each earlier step is entered and left in order, then `index` is entered.
/// Toasts from the walk are not collected.
pub fn replay(slide: &Slide, index: usize) -> TokenWallet {
    let mut wallet = TokenWallet::new();
    for (i, step) in slide.steps.iter().enumerate().take(index + 1) {
        apply(&step.on_enter, &mut wallet, None);
        if i < index {
            apply(&step.on_exit, &mut wallet, None);
        }
    }
    wallet
}

/// Toasts raised by leaving `from` (if any) and entering `to`.
pub fn transition_toasts(slide: &Slide, from: Option<usize>, to: usize) -> Vec<String> {
    let mut toasts = Vec::new();
    let mut scratch = TokenWallet::new();
    if let Some(step) = from.and_then(|i| slide.steps.get(i)) {
        apply(&step.on_exit, &mut scratch, Some(&mut toasts));
    }
    if let Some(step) = slide.steps.get(to) {
        apply(&step.on_enter, &mut scratch, Some(&mut toasts));
    }
    toasts
}

/// Commands the presenter (or the file watcher) sends to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckCommand {
    Next,
    Previous,
    First,
    Last,
    /// Zero-based slide and step.
    GoTo { slide: usize, step: usize },
    Reload(Box<Deck>),
}

/// What a command did to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moved {
    No,
    /// Same slide, different step.
    Step,
    /// A different slide: the stage must be torn down and remounted.
    Slide,
}

pub struct DeckController {
    deck: Deck,
    slide: usize,
    stepper: Stepper,
    wallet: TokenWallet,
    toasts: Vec<String>,
}

impl DeckController {
    pub fn new(deck: Deck) -> Self {
        let len = deck.slides.first().map_or(0, |s| s.steps.len());
        let mut controller = Self {
            deck,
            slide: 0,
            stepper: Stepper::new(len),
            wallet: TokenWallet::new(),
            toasts: Vec::new(),
        };
        controller.enter(None);
        controller
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn slide_index(&self) -> usize {
        self.slide
    }

    pub fn step_index(&self) -> usize {
        self.stepper.index()
    }

    pub fn current_slide(&self) -> &Slide {
        &self.deck.slides[self.slide]
    }

    pub fn current_step(&self) -> &StepDef {
        &self.current_slide().steps[self.stepper.index()]
    }

    pub fn step_view(&self) -> StepView {
        self.current_slide().step_view(self.stepper.index())
    }

    pub fn wallet(&self) -> &TokenWallet {
        &self.wallet
    }

    /// Toasts raised since the last call.
    pub fn take_toasts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.toasts)
    }

    /// Delay before the current step advances on its own. Never set on the
    /// very last step of the deck.
    pub fn auto_advance(&self) -> Option<Duration> {
        if self.is_at_end() {
            return None;
        }
        self.current_step()
            .advance_after_ms
            .map(Duration::from_millis)
    }

    pub fn is_at_end(&self) -> bool {
        self.slide + 1 >= self.deck.slides.len() && self.stepper.is_last()
    }

    /// Position as `slide/step`, 1-based, for the chrome.
    pub fn position_label(&self) -> String {
        format!(
            "{}/{} \u{00b7} step {}/{}",
            self.slide + 1,
            self.deck.slides.len(),
            self.stepper.index() + 1,
            self.stepper.len()
        )
    }

    pub fn dispatch(&mut self, command: DeckCommand) -> Moved {
        let from = (self.slide, self.stepper.index());
        match command {
            DeckCommand::Next => {
                if !self.stepper.advance() && self.slide + 1 < self.deck.slides.len() {
                    let leaving = transition_toasts(self.current_slide(), Some(from.1), usize::MAX);
                    self.toasts.extend(leaving);
                    self.set_slide(self.slide + 1, 0);
                }
            }
            DeckCommand::Previous => {
                if !self.stepper.retreat() && self.slide > 0 {
                    let last = self.deck.slides[self.slide - 1].steps.len().saturating_sub(1);
                    self.set_slide(self.slide - 1, last);
                }
            }
            DeckCommand::First => self.set_slide(0, 0),
            DeckCommand::Last => {
                let slide = self.deck.slides.len() - 1;
                let step = self.deck.slides[slide].steps.len().saturating_sub(1);
                self.set_slide(slide, step);
            }
            DeckCommand::GoTo { slide, step } => {
                let slide = slide.min(self.deck.slides.len() - 1);
                self.set_slide(slide, step);
            }
            DeckCommand::Reload(deck) => {
                log::info!("deck reloaded: {}", deck.title);
                self.deck = *deck;
                self.slide = from.0.min(self.deck.slides.len() - 1);
                self.stepper = Stepper::new(self.current_slide().steps.len());
                self.stepper.jump(from.1);
                self.wallet = replay(self.current_slide(), self.stepper.index());
                // Geometry may have changed even if the position did not.
                return Moved::Slide;
            }
        }

        let to = (self.slide, self.stepper.index());
        if to == from {
            return Moved::No;
        }
        if to.0 == from.0 && to.1 == from.1 + 1 {
            self.enter(Some(from.1));
        } else {
            self.enter(None);
        }
        log::debug!("slide {} step {} -> slide {} step {}", from.0, from.1, to.0, to.1);
        if to.0 == from.0 { Moved::Step } else { Moved::Slide }
    }

    fn set_slide(&mut self, slide: usize, step: usize) {
        if slide != self.slide {
            self.slide = slide;
            self.stepper = Stepper::new(self.deck.slides[slide].steps.len());
        }
        self.stepper.jump(step);
    }

    /// Rebuild token state for the current step. `prev` is the step just
    /// left when moving forward by one, so its exit toasts are shown too.
    fn enter(&mut self, prev: Option<usize>) {
        let index = self.stepper.index();
        let (toasts, wallet) = {
            let slide = self.current_slide();
            (transition_toasts(slide, prev, index), replay(slide, index))
        };
        self.wallet = wallet;
        self.toasts.extend(toasts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    const DECK: &str = r#"
title: Test
slides:
  - title: One
    nodes:
      - { id: a, label: A, x: 0, y: 0 }
    steps:
      - name: start
      - name: code
        on_enter:
          - issue_token: authorization_code
          - toast: Code issued
      - name: tokens
        on_enter:
          - issue_token: access_token
        on_exit:
          - revoke_tokens
          - toast: Logged out
  - title: Two
    steps:
      - name: only
        advance_after_ms: 500
      - name: end
        advance_after_ms: 500
"#;

    fn controller() -> DeckController {
        DeckController::new(Deck::parse(DECK).expect("valid deck"))
    }

    #[test]
    fn stepper_clamps() {
        let mut s = Stepper::new(3);
        assert!(!s.retreat());
        assert!(s.advance());
        assert!(s.advance());
        assert!(!s.advance());
        assert!(s.jump(0));
        assert!(!s.jump(0));
        s.jump(99);
        assert_eq!(s.index(), 2);
    }

    #[test]
    fn forward_runs_entry_actions() {
        let mut c = controller();
        assert_eq!(c.dispatch(DeckCommand::Next), Moved::Step);
        assert_eq!(c.take_toasts(), vec!["Code issued".to_string()]);
        assert_eq!(c.wallet().tokens().len(), 1);

        c.dispatch(DeckCommand::Next);
        let kinds: Vec<TokenKind> = c.wallet().tokens().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::AuthorizationCode, TokenKind::AccessToken]);
    }

    #[test]
    fn crossing_slides_reports_slide_move() {
        let mut c = controller();
        c.dispatch(DeckCommand::Next);
        c.dispatch(DeckCommand::Next);
        c.take_toasts();
        assert_eq!(c.dispatch(DeckCommand::Next), Moved::Slide);
        assert_eq!((c.slide_index(), c.step_index()), (1, 0));
        assert_eq!(c.take_toasts(), vec!["Logged out".to_string()]);
        assert!(c.wallet().is_empty());

        assert_eq!(c.dispatch(DeckCommand::Previous), Moved::Slide);
        assert_eq!((c.slide_index(), c.step_index()), (0, 2));
    }

    #[test]
    fn backward_replays_same_state() {
        let mut c = controller();
        c.dispatch(DeckCommand::Next);
        c.dispatch(DeckCommand::Next);
        let forward = c.wallet().clone();

        c.dispatch(DeckCommand::Next);
        c.dispatch(DeckCommand::Previous);
        assert_eq!(c.wallet(), &forward);
    }

    #[test]
    fn jump_replays_without_walk_toasts() {
        let mut c = controller();
        c.dispatch(DeckCommand::GoTo { slide: 0, step: 2 });
        assert!(c.take_toasts().is_empty());
        assert_eq!(c.wallet().tokens().len(), 2);
    }

    #[test]
    fn exit_actions_run_when_leaving() {
        let slide = &Deck::parse(DECK).expect("valid deck").slides[0];
        assert_eq!(
            transition_toasts(slide, Some(2), 2),
            vec!["Logged out".to_string()]
        );
        assert_eq!(replay(slide, 2).tokens().len(), 2);
    }

    #[test]
    fn first_last_and_auto_advance() {
        let mut c = controller();
        assert_eq!(c.auto_advance(), None);
        c.dispatch(DeckCommand::Last);
        assert!(c.is_at_end());
        assert_eq!(c.auto_advance(), None);
        c.dispatch(DeckCommand::Previous);
        assert_eq!(c.auto_advance(), Some(Duration::from_millis(500)));
        assert_eq!(c.dispatch(DeckCommand::First), Moved::Slide);
        assert_eq!(c.dispatch(DeckCommand::First), Moved::No);
    }

    #[test]
    fn reload_keeps_position_when_possible() {
        let mut c = controller();
        c.dispatch(DeckCommand::Next);
        let deck = Deck::parse(DECK).expect("valid deck");
        assert_eq!(c.dispatch(DeckCommand::Reload(Box::new(deck))), Moved::Slide);
        assert_eq!((c.slide_index(), c.step_index()), (0, 1));
        assert_eq!(c.wallet().tokens().len(), 1);
    }

    #[test]
    fn position_label_is_one_based() {
        assert_eq!(controller().position_label(), "1/2 \u{00b7} step 1/3");
    }
}
